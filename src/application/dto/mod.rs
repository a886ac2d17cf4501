pub mod articles;
pub mod audience;
pub mod comments;
pub mod media;
pub mod pagination;
pub mod projects;
pub mod tags;

pub use articles::{ArticleDto, ArticleSort};
pub use audience::Audience;
pub use comments::CommentDto;
pub use media::MediaFileDto;
pub use pagination::Page;
pub use projects::ProjectDto;
pub use tags::{TagDto, TagWithCountDto};
