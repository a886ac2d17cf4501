mod cached;
pub mod keys;
mod store;

pub use cached::CachedContentApi;
pub use store::ResponseCache;
