//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&DbPool` as the first argument.

pub mod generation_repo;
pub mod user_repo;

pub use generation_repo::GenerationRepo;
pub use user_repo::UserRepo;
