mod create;
mod delete;
mod resolve;
mod service;
mod update;

pub use create::CreateTagCommand;
pub use delete::DeleteTagCommand;
pub(crate) use resolve::resolve_tags;
pub use service::TagCommandService;
pub use update::UpdateTagCommand;
