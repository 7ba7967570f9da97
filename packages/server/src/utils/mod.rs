pub mod contest;
pub mod hash;
pub mod image;
pub mod jwt;
