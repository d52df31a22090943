//! Create `credit_cards` table.
//!
//! Only the last four digits and an obfuscated expiry are stored.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CreditCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditCards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(CreditCards::LastFourDigits, 4).not_null())
                    .col(string_len(CreditCards::CardName, 128).not_null())
                    .col(string_len(CreditCards::ValidUntil, 16).not_null())
                    .col(string_len(CreditCards::CardType, 32).not_null())
                    .col(boolean(CreditCards::Status).not_null())
                    .col(decimal_len(CreditCards::Limit, 19, 2).not_null())
                    .col(decimal_len(CreditCards::Balance, 19, 2).not_null())
                    .col(string_len(CreditCards::OwnerId, 64).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credit_cards_owner_id")
                    .table(CreditCards::Table)
                    .col(CreditCards::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CreditCards::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CreditCards {
    Table,
    Id,
    LastFourDigits,
    CardName,
    ValidUntil,
    CardType,
    Status,
    Limit,
    Balance,
    OwnerId,
}
