pub mod articles;
pub mod comments;
pub mod media;
pub mod projects;
pub mod tags;

mod access;

pub(crate) use access::{ensure_staff, report_failure};
