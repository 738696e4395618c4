pub mod delete;
pub mod get;
pub mod post;

pub const COMMENTS: &str = "comments";
