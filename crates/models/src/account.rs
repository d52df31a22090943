use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{account_transaction, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub account_number: String,
    pub account_type: String,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub balance: Decimal,
    pub owner_id: String,
    pub creation_date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Transactions,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Transactions => Entity::has_many(account_transaction::Entity).into(),
        }
    }
}

impl Related<account_transaction::Entity> for Entity {
    fn to() -> RelationDef { Relation::Transactions.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_account_number(number: &str) -> Result<(), errors::ModelError> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err(errors::ModelError::Validation("account_number required".into()));
    }
    if trimmed.len() > 64 {
        return Err(errors::ModelError::Validation("account_number too long (<=64)".into()));
    }
    Ok(())
}

pub fn validate_owner_id(owner_id: &str) -> Result<(), errors::ModelError> {
    if owner_id.trim().is_empty() {
        return Err(errors::ModelError::Validation("owner_id required".into()));
    }
    Ok(())
}
