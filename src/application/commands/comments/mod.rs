mod delete;
mod moderate;
mod service;
mod submit;

pub use delete::DeleteCommentCommand;
pub use moderate::ModerateCommentCommand;
pub use service::CommentCommandService;
pub use submit::SubmitCommentCommand;
