//! Relational row shapes (SeaORM entities) for the bank store, plus the
//! field validators the HTTP boundary runs before anything reaches a service.

pub mod errors;
pub mod db;
pub mod money;
pub mod account;
pub mod account_transaction;
pub mod credit_card;
pub mod card_transaction;
pub mod message;
