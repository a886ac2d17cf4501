pub mod article;
pub mod comment;
pub mod errors;
pub mod ids;
pub mod media;
pub mod persistence;
pub mod project;
pub mod slug;
pub mod tag;
