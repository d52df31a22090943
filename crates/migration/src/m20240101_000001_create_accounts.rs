//! Create `accounts` table.
//!
//! `account_number` is unique across all owners.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Accounts::AccountNumber, 64).unique_key().not_null())
                    .col(string_len(Accounts::AccountType, 32).not_null())
                    .col(decimal_len(Accounts::Balance, 19, 2).not_null())
                    .col(string_len(Accounts::OwnerId, 64).not_null())
                    .col(timestamp(Accounts::CreationDate).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_owner_id")
                    .table(Accounts::Table)
                    .col(Accounts::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Accounts::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Accounts { Table, Id, AccountNumber, AccountType, Balance, OwnerId, CreationDate }
