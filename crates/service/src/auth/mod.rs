//! Auth module: one fixed credential and an in-process token store.
//!
//! Credentials are compared in plaintext and tokens never expire. Both are
//! acceptable only for a demo deployment.

pub mod domain;
pub mod errors;
pub mod service;
pub mod token_store;

pub use service::AuthService;
pub use token_store::TokenStore;
