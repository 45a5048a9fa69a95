//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource. Handlers
//! delegate persistence to the repositories in `genstudio_db` and map errors
//! via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod generation;
pub mod health;
