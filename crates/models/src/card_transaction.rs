use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::credit_card;

/// Card transactions live in the `transactions` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub credit_card_id: i64,
    pub transaction_date: DateTime,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub amount: Decimal,
    pub description: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    CreditCard,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::CreditCard => Entity::belongs_to(credit_card::Entity)
                .from(Column::CreditCardId)
                .to(credit_card::Column::Id)
                .into(),
        }
    }
}

impl Related<credit_card::Entity> for Entity {
    fn to() -> RelationDef { Relation::CreditCard.def() }
}

impl ActiveModelBehavior for ActiveModel {}
