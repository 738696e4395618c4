pub mod comment;
pub mod guestbook;
pub mod rating;
pub mod timestamp;

pub use comment::Comment;
pub use guestbook::GuestbookEntry;
pub use rating::{AggregateStats, Rating};
