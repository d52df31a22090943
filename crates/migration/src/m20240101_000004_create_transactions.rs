//! Create `transactions` table (card transactions) with FK to `credit_cards`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer(Transactions::CreditCardId).not_null())
                    .col(timestamp(Transactions::TransactionDate).not_null())
                    .col(decimal_len(Transactions::Amount, 19, 2).not_null())
                    .col(string_len(Transactions::Description, 255).not_null())
                    .col(string_len(Alias::new("type"), 16).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_credit_card")
                            .from(Transactions::Table, Transactions::CreditCardId)
                            .to(CreditCards::Table, CreditCards::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_card_date")
                    .table(Transactions::Table)
                    .col(Transactions::CreditCardId)
                    .col(Transactions::TransactionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transactions { Table, Id, CreditCardId, TransactionDate, Amount, Description }

#[derive(DeriveIden)]
enum CreditCards { Table, Id }
