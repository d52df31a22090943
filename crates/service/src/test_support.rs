#![cfg(test)]
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use crate::domain::{Account, AccountTransaction, CardTransaction, CreditCard, Posting, TransactionDetails, TransactionType};

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

pub fn money(s: &str) -> Decimal { Decimal::from_str(s).unwrap() }

pub fn account(owner: &str, number: &str) -> Account {
    Account::new(number, "CHECKING", money("100.00"), owner, at(2024, 1, 1))
}

pub fn card(owner: &str) -> CreditCard {
    CreditCard {
        id: None,
        last_four_digits: "4242".into(),
        card_name: "Visa Gold".into(),
        valid_until: "**/27".into(),
        card_type: "VISA".into(),
        status: true,
        limit: money("5000.00"),
        balance: money("0.00"),
        owner_id: owner.into(),
        transactions: Vec::new(),
    }
}

fn details(y: i32, m: u32, d: u32, amount: &str) -> TransactionDetails {
    TransactionDetails {
        transaction_date: at(y, m, d),
        amount: money(amount),
        description: format!("entry {y}-{m:02}-{d:02}"),
        kind: TransactionType::Charge,
    }
}

pub fn entry_at(y: i32, m: u32, d: u32, amount: &str) -> AccountTransaction {
    AccountTransaction::from_details(details(y, m, d, amount))
}

pub fn card_entry_at(y: i32, m: u32, d: u32, amount: &str) -> CardTransaction {
    CardTransaction::from_details(details(y, m, d, amount))
}

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// A migrated Postgres connection, or `None` when no database is configured.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let url = std::env::var("DATABASE_URL").ok()?;
    let cfg = configs::DatabaseConfig { url, ..Default::default() };

    MIGRATED
        .get_or_init(|| async {
            let db = models::db::connect_with_config(&cfg).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
        })
        .await;

    models::db::connect_with_config(&cfg).await.ok()
}
