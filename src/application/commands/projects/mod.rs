mod manage;
mod service;

pub use manage::{CreateProjectCommand, DeleteProjectCommand, UpdateProjectCommand};
pub use service::ProjectCommandService;
