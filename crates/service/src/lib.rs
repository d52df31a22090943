//! Service layer for the bank API.
//! - Domain records and their DTO projections.
//! - Storage capabilities with in-memory and SeaORM implementations.
//! - Generic CRUD, owner-scoped and ledger services, plus token auth.

pub mod auth;
pub mod bank;
pub mod crud;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod owner;
pub mod pagination;
pub mod repository;
#[cfg(test)]
pub mod test_support;

pub use bank::Bank;
pub use errors::ServiceError;
