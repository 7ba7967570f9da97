pub mod comment;
pub mod contest;
pub mod contest_winner;
pub mod entry;
pub mod reaction;
pub mod user;
pub mod xp_transaction;
