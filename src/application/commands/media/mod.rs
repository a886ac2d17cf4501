mod manage;
mod service;

pub use manage::{AttachMediaCommand, DeleteMediaCommand, UploadMediaCommand};
pub use service::MediaCommandService;
