//! Migrator registering the banking tables in dependency order.
//! Parents come before the transaction tables that reference them.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_accounts;
mod m20240101_000002_create_account_transactions;
mod m20240101_000003_create_credit_cards;
mod m20240101_000004_create_transactions;
mod m20240101_000005_create_messages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_accounts::Migration),
            Box::new(m20240101_000002_create_account_transactions::Migration),
            Box::new(m20240101_000003_create_credit_cards::Migration),
            Box::new(m20240101_000004_create_transactions::Migration),
            Box::new(m20240101_000005_create_messages::Migration),
        ]
    }
}
