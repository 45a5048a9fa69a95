//! Row types and creation DTOs, one module per table.

pub mod generation;
pub mod user;
