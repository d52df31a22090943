//! Records the bank API exposes, independent of where they are stored.

pub mod account;
pub mod credit_card;
pub mod dto;
pub mod entity;
pub mod message;
pub mod transaction;

pub use account::Account;
pub use credit_card::CreditCard;
pub use dto::{CreditCardDto, TransactionDto};
pub use entity::{Entity, Owned};
pub use message::Message;
pub use transaction::{
    AccountTransaction, CardTransaction, Ledger, Posting, TransactionDetails, TransactionKind, TransactionType,
};
