//! Client side of genstudio: the retrying, cancellable generation
//! coordinator plus the HTTP bindings and credential storage it runs on.
//!
//! The coordinator never talks to the network directly. It drives a
//! [`GenerationApi`](api::GenerationApi) implementation, which is the HTTP
//! client in production and a scripted stub in tests.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod events;
pub mod history;
pub mod http;
pub mod model;
pub mod retry;
