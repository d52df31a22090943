//! Read-only projections returned by the "dto" endpoints.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{
    credit_card::CreditCard,
    transaction::{Posting, TransactionType},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransactionDto {
    pub id: Option<i64>,
    pub date: NaiveDateTime,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl TransactionDto {
    pub fn of(entry: &impl Posting) -> Self {
        let details = entry.details();
        Self {
            id: entry.id(),
            date: details.transaction_date,
            amount: details.amount,
            description: details.description.clone(),
            kind: details.kind,
        }
    }
}

/// A card without its transaction history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreditCardDto {
    pub id: Option<i64>,
    pub last_four_digits: String,
    pub card_name: String,
    pub valid_until: String,
    pub card_type: String,
    pub status: bool,
    pub limit: Decimal,
    pub balance: Decimal,
    pub owner_id: String,
}

impl From<&CreditCard> for CreditCardDto {
    fn from(card: &CreditCard) -> Self {
        Self {
            id: card.id,
            last_four_digits: card.last_four_digits.clone(),
            card_name: card.card_name.clone(),
            valid_until: card.valid_until.clone(),
            card_type: card.card_type.clone(),
            status: card.status,
            limit: card.limit,
            balance: card.balance,
            owner_id: card.owner_id.clone(),
        }
    }
}
