pub mod entity;
pub mod value_objects;

pub use crate::domain::ids::CommentId;
pub use entity::{
    Comment, CommentColumn, CommentParts, CommentStatus, ModerationAction, NewComment,
};
pub use value_objects::{AuthorEmail, AuthorName, CommentBody};
