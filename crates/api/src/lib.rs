//! Keyholder API server library.
//!
//! Exposes the building blocks (config, state, error handling, commands,
//! routes) so integration tests and the binary entrypoint can both use them.

pub mod access;
pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod routes;
pub mod state;
