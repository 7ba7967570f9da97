pub mod auth;
pub mod comment;
pub mod contest;
pub mod entry;
pub mod reaction;
pub mod user;
