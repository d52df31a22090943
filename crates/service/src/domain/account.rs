use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    entity::{Entity, Owned},
    transaction::{AccountTransaction, Ledger},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: Option<i64>,
    pub account_number: String,
    pub account_type: String,
    pub balance: Decimal,
    pub owner_id: String,
    pub creation_date: NaiveDateTime,
    #[serde(default)]
    pub transactions: Vec<AccountTransaction>,
}

impl Account {
    pub fn new(
        account_number: impl Into<String>,
        account_type: impl Into<String>,
        balance: Decimal,
        owner_id: impl Into<String>,
        creation_date: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            account_number: account_number.into(),
            account_type: account_type.into(),
            balance,
            owner_id: owner_id.into(),
            creation_date,
            transactions: Vec::new(),
        }
    }
}

impl Entity for Account {
    type Id = i64;
    const NAME: &'static str = "account";

    fn id(&self) -> Option<i64> { self.id }
    fn set_id(&mut self, id: i64) { self.id = Some(id); }
}

impl Owned for Account {
    fn owner_id(&self) -> &str { &self.owner_id }
}

impl Ledger for Account {
    type Entry = AccountTransaction;

    fn entries(&self) -> &[AccountTransaction] { &self.transactions }
    fn entries_mut(&mut self) -> &mut Vec<AccountTransaction> { &mut self.transactions }
}
