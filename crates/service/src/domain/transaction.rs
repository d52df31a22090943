use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use models::errors::ModelError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::Entity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Charge,
    Credit,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Charge => "CHARGE",
            TransactionType::Credit => "CREDIT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for TransactionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHARGE" => Ok(TransactionType::Charge),
            "CREDIT" => Ok(TransactionType::Credit),
            other => Err(ModelError::Validation(format!("unknown transaction type: {other}"))),
        }
    }
}

/// Which parent a posting hangs off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    AccountTransaction,
    CardTransaction,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::AccountTransaction => "ACCOUNT_TRANSACTION",
            TransactionKind::CardTransaction => "CARD_TRANSACTION",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Fields shared by both transaction flavours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub transaction_date: NaiveDateTime,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountTransaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(flatten)]
    pub details: TransactionDetails,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardTransaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub credit_card_id: Option<i64>,
    #[serde(flatten)]
    pub details: TransactionDetails,
}

/// A transaction row owned by exactly one parent.
pub trait Posting: Entity<Id = i64> {
    const KIND: TransactionKind;

    fn from_details(details: TransactionDetails) -> Self;
    fn parent_id(&self) -> Option<i64>;
    fn set_parent_id(&mut self, parent_id: Option<i64>);
    fn details(&self) -> &TransactionDetails;
}

impl Entity for AccountTransaction {
    type Id = i64;
    const NAME: &'static str = "account_transaction";

    fn id(&self) -> Option<i64> { self.id }
    fn set_id(&mut self, id: i64) { self.id = Some(id); }
}

impl Posting for AccountTransaction {
    const KIND: TransactionKind = TransactionKind::AccountTransaction;

    fn from_details(details: TransactionDetails) -> Self { Self { id: None, account_id: None, details } }
    fn parent_id(&self) -> Option<i64> { self.account_id }
    fn set_parent_id(&mut self, parent_id: Option<i64>) { self.account_id = parent_id; }
    fn details(&self) -> &TransactionDetails { &self.details }
}

impl Entity for CardTransaction {
    type Id = i64;
    const NAME: &'static str = "card_transaction";

    fn id(&self) -> Option<i64> { self.id }
    fn set_id(&mut self, id: i64) { self.id = Some(id); }
}

impl Posting for CardTransaction {
    const KIND: TransactionKind = TransactionKind::CardTransaction;

    fn from_details(details: TransactionDetails) -> Self { Self { id: None, credit_card_id: None, details } }
    fn parent_id(&self) -> Option<i64> { self.credit_card_id }
    fn set_parent_id(&mut self, parent_id: Option<i64>) { self.credit_card_id = parent_id; }
    fn details(&self) -> &TransactionDetails { &self.details }
}

/// A parent that carries an ordered list of postings.
///
/// The reference from entry to parent is the entry's `parent_id`; the
/// collection is the only place entries live in the domain model.
pub trait Ledger: Entity<Id = i64> {
    type Entry: Posting;

    fn entries(&self) -> &[Self::Entry];
    fn entries_mut(&mut self) -> &mut Vec<Self::Entry>;

    /// Append `entry`, pointing its back-reference at this parent.
    fn attach(&mut self, mut entry: Self::Entry) {
        entry.set_parent_id(self.id());
        self.entries_mut().push(entry);
    }

    /// Remove the entry with `entry_id` and clear its back-reference.
    fn detach(&mut self, entry_id: i64) -> Option<Self::Entry> {
        let pos = self.entries().iter().position(|e| e.id() == Some(entry_id))?;
        let mut entry = self.entries_mut().remove(pos);
        entry.set_parent_id(None);
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_parses_only_exact_upper_case() {
        assert_eq!("CHARGE".parse::<TransactionType>().unwrap(), TransactionType::Charge);
        assert_eq!("CREDIT".parse::<TransactionType>().unwrap(), TransactionType::Credit);
        assert!("charge".parse::<TransactionType>().is_err());
    }

    #[test]
    fn each_posting_carries_its_own_kind() {
        assert_eq!(AccountTransaction::KIND.to_string(), "ACCOUNT_TRANSACTION");
        assert_eq!(CardTransaction::KIND.as_str(), "CARD_TRANSACTION");
        assert_ne!(AccountTransaction::KIND, CardTransaction::KIND);
    }

    #[test]
    fn wire_form_uses_type_key() {
        let entry = CardTransaction::from_details(TransactionDetails {
            transaction_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            amount: Decimal::new(1250, 2),
            description: "coffee".into(),
            kind: TransactionType::Charge,
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "CHARGE");
        assert_eq!(json["amount"], "12.50");
        assert!(json["credit_card_id"].is_null());
    }
}
