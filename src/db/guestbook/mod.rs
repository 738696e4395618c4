pub mod get;
pub mod post;

pub const GUESTBOOK: &str = "guestbook";
