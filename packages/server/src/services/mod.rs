pub mod finalize;
pub mod vote;

pub use finalize::{FinalizeOutcome, FinalizeService};
pub use vote::{VoteOutcome, VoteService};
