//! Authentication primitives.
//!
//! - [`jwt`] -- access-token validation, plus token minting for tooling and tests.
//!
//! Sign-in and session management live with the external identity provider;
//! this service only verifies the tokens it issues.

pub mod jwt;
