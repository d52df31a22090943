//! Create `account_transactions` table with FK to `accounts`.
//!
//! Rows never outlive their account; the service layer deletes them
//! explicitly and the FK cascades as a backstop.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccountTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer(AccountTransactions::AccountId).not_null())
                    .col(timestamp(AccountTransactions::TransactionDate).not_null())
                    .col(decimal_len(AccountTransactions::Amount, 19, 2).not_null())
                    .col(string_len(AccountTransactions::Description, 255).not_null())
                    .col(string_len(Alias::new("type"), 16).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_transactions_account")
                            .from(AccountTransactions::Table, AccountTransactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_account_transactions_account_date")
                    .table(AccountTransactions::Table)
                    .col(AccountTransactions::AccountId)
                    .col(AccountTransactions::TransactionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AccountTransactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AccountTransactions { Table, Id, AccountId, TransactionDate, Amount, Description }

#[derive(DeriveIden)]
enum Accounts { Table, Id }
