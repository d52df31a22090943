use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    entity::{Entity, Owned},
    transaction::{CardTransaction, Ledger},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    #[serde(default)]
    pub id: Option<i64>,
    pub last_four_digits: String,
    pub card_name: String,
    /// Obfuscated expiry, e.g. `**/27`.
    pub valid_until: String,
    pub card_type: String,
    /// Active flag.
    pub status: bool,
    pub limit: Decimal,
    pub balance: Decimal,
    pub owner_id: String,
    #[serde(default)]
    pub transactions: Vec<CardTransaction>,
}

impl Entity for CreditCard {
    type Id = i64;
    const NAME: &'static str = "credit_card";

    fn id(&self) -> Option<i64> { self.id }
    fn set_id(&mut self, id: i64) { self.id = Some(id); }
}

impl Owned for CreditCard {
    fn owner_id(&self) -> &str { &self.owner_id }
}

impl Ledger for CreditCard {
    type Entry = CardTransaction;

    fn entries(&self) -> &[CardTransaction] { &self.transactions }
    fn entries_mut(&mut self) -> &mut Vec<CardTransaction> { &mut self.transactions }
}
