pub mod articles;
pub mod comments;
pub mod media;
pub mod projects;
pub mod tags;
