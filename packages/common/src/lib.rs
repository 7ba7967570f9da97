pub mod contest_status;
pub mod entry_status;
pub mod error;
pub mod prize;
pub mod role;

pub use contest_status::{ContestStatus, VotingPolicy, derive_status};
pub use entry_status::EntryStatus;
pub use error::ParseEnumError;
pub use role::Role;
