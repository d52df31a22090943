use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{card_transaction, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub last_four_digits: String,
    pub card_name: String,
    pub valid_until: String,
    pub card_type: String,
    pub status: bool,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub limit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub balance: Decimal,
    pub owner_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Transactions,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Transactions => Entity::has_many(card_transaction::Entity).into(),
        }
    }
}

impl Related<card_transaction::Entity> for Entity {
    fn to() -> RelationDef { Relation::Transactions.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_last_four_digits(digits: &str) -> Result<(), errors::ModelError> {
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(errors::ModelError::Validation("last_four_digits must be exactly 4 digits".into()));
    }
    Ok(())
}

pub fn validate_card_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("card_name required".into()));
    }
    Ok(())
}
