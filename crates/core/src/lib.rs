//! Domain types, constants, and validation rules shared by the genstudio
//! server and client.

pub mod credentials;
pub mod error;
pub mod generation;
pub mod overload;
pub mod types;
