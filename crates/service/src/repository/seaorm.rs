//! Postgres-backed store over the `models` entities.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use models::{account, account_transaction, card_transaction, credit_card, message};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, TransactionTrait,
};
use tracing::debug;

use super::{
    attached_entry, distinct_entries, known_entry_id, CrudRepository, LedgerRepository, ListRepository, OwnerRepository,
    PostingRepository,
};
use crate::{
    domain::{
        Account, AccountTransaction, CardTransaction, CreditCard, Entity, Ledger, Message, TransactionDetails,
        TransactionType,
    },
    errors::ServiceError,
};

#[derive(Clone)]
pub struct SeaOrmStore {
    pub db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn db_err(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            ServiceError::Conflict(msg)
        }
        _ => ServiceError::Db(e.to_string()),
    }
}

/// A stored type string the domain does not know is a corrupt row, not bad input.
fn stored_kind(table: &str, id: i64, kind: &str) -> Result<TransactionType, ServiceError> {
    kind.parse().map_err(|e| ServiceError::Db(format!("{table} row {id}: {e}")))
}

fn account_entry(row: account_transaction::Model) -> Result<AccountTransaction, ServiceError> {
    Ok(AccountTransaction {
        id: Some(row.id),
        account_id: Some(row.account_id),
        details: TransactionDetails {
            transaction_date: row.transaction_date,
            amount: row.amount,
            description: row.description,
            kind: stored_kind("account_transactions", row.id, &row.kind)?,
        },
    })
}

fn card_entry(row: card_transaction::Model) -> Result<CardTransaction, ServiceError> {
    Ok(CardTransaction {
        id: Some(row.id),
        credit_card_id: Some(row.credit_card_id),
        details: TransactionDetails {
            transaction_date: row.transaction_date,
            amount: row.amount,
            description: row.description,
            kind: stored_kind("transactions", row.id, &row.kind)?,
        },
    })
}

fn account_from(row: account::Model, entries: Vec<AccountTransaction>) -> Account {
    Account {
        id: Some(row.id),
        account_number: row.account_number,
        account_type: row.account_type,
        balance: row.balance,
        owner_id: row.owner_id,
        creation_date: row.creation_date,
        transactions: entries,
    }
}

fn card_from(row: credit_card::Model, entries: Vec<CardTransaction>) -> CreditCard {
    CreditCard {
        id: Some(row.id),
        last_four_digits: row.last_four_digits,
        card_name: row.card_name,
        valid_until: row.valid_until,
        card_type: row.card_type,
        status: row.status,
        limit: row.limit,
        balance: row.balance,
        owner_id: row.owner_id,
        transactions: entries,
    }
}

fn message_from(row: message::Model) -> Message {
    Message { id: Some(row.id), content: row.content, timestamp: row.timestamp }
}

async fn account_entries<C: ConnectionTrait>(conn: &C, account_id: i64) -> Result<Vec<AccountTransaction>, ServiceError> {
    account_transaction::Entity::find()
        .filter(account_transaction::Column::AccountId.eq(account_id))
        .order_by_asc(account_transaction::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(account_entry)
        .collect()
}

async fn card_entries<C: ConnectionTrait>(conn: &C, card_id: i64) -> Result<Vec<CardTransaction>, ServiceError> {
    card_transaction::Entity::find()
        .filter(card_transaction::Column::CreditCardId.eq(card_id))
        .order_by_asc(card_transaction::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(card_entry)
        .collect()
}

/// Upsert `entries` under `account_id` and delete the account's rows that are
/// no longer in the collection.
async fn sync_account_entries<C: ConnectionTrait>(
    conn: &C,
    account_id: i64,
    entries: Vec<AccountTransaction>,
) -> Result<Vec<AccountTransaction>, ServiceError> {
    let entries = distinct_entries(entries);
    let mut saved = Vec::with_capacity(entries.len());
    for entry in entries {
        let known = match entry.id {
            Some(id) => account_transaction::Entity::find_by_id(id)
                .filter(account_transaction::Column::AccountId.eq(account_id))
                .one(conn)
                .await
                .map_err(db_err)?
                .map(|row| row.id),
            None => None,
        };
        let mut am = account_transaction::ActiveModel {
            id: NotSet,
            account_id: Set(account_id),
            transaction_date: Set(entry.details.transaction_date),
            amount: Set(entry.details.amount),
            description: Set(entry.details.description),
            kind: Set(entry.details.kind.as_str().to_string()),
        };
        let row = match known {
            Some(id) => {
                am.id = Set(id);
                am.update(conn).await
            }
            None => am.insert(conn).await,
        }
        .map_err(db_err)?;
        saved.push(account_entry(row)?);
    }
    let kept: Vec<i64> = saved.iter().filter_map(|e| e.id).collect();
    let removed = account_transaction::Entity::delete_many()
        .filter(account_transaction::Column::AccountId.eq(account_id))
        .filter(account_transaction::Column::Id.is_not_in(kept))
        .exec(conn)
        .await
        .map_err(db_err)?;
    if removed.rows_affected > 0 {
        debug!(account_id, removed = removed.rows_affected, "orphaned account transactions deleted");
    }
    Ok(saved)
}

async fn sync_card_entries<C: ConnectionTrait>(
    conn: &C,
    card_id: i64,
    entries: Vec<CardTransaction>,
) -> Result<Vec<CardTransaction>, ServiceError> {
    let entries = distinct_entries(entries);
    let mut saved = Vec::with_capacity(entries.len());
    for entry in entries {
        let known = match entry.id {
            Some(id) => card_transaction::Entity::find_by_id(id)
                .filter(card_transaction::Column::CreditCardId.eq(card_id))
                .one(conn)
                .await
                .map_err(db_err)?
                .map(|row| row.id),
            None => None,
        };
        let mut am = card_transaction::ActiveModel {
            id: NotSet,
            credit_card_id: Set(card_id),
            transaction_date: Set(entry.details.transaction_date),
            amount: Set(entry.details.amount),
            description: Set(entry.details.description),
            kind: Set(entry.details.kind.as_str().to_string()),
        };
        let row = match known {
            Some(id) => {
                am.id = Set(id);
                am.update(conn).await
            }
            None => am.insert(conn).await,
        }
        .map_err(db_err)?;
        saved.push(card_entry(row)?);
    }
    let kept: Vec<i64> = saved.iter().filter_map(|e| e.id).collect();
    let removed = card_transaction::Entity::delete_many()
        .filter(card_transaction::Column::CreditCardId.eq(card_id))
        .filter(card_transaction::Column::Id.is_not_in(kept))
        .exec(conn)
        .await
        .map_err(db_err)?;
    if removed.rows_affected > 0 {
        debug!(card_id, removed = removed.rows_affected, "orphaned card transactions deleted");
    }
    Ok(saved)
}

async fn upsert_account<C: ConnectionTrait>(conn: &C, account: Account) -> Result<Account, ServiceError> {
    let known = match account.id {
        Some(id) => account::Entity::find_by_id(id).one(conn).await.map_err(db_err)?.map(|row| row.id),
        None => None,
    };
    let mut am = account::ActiveModel {
        id: NotSet,
        account_number: Set(account.account_number),
        account_type: Set(account.account_type),
        balance: Set(account.balance),
        owner_id: Set(account.owner_id),
        creation_date: Set(account.creation_date),
    };
    let row = match known {
        Some(id) => {
            am.id = Set(id);
            am.update(conn).await
        }
        None => am.insert(conn).await,
    }
    .map_err(db_err)?;
    let entries = sync_account_entries(conn, row.id, account.transactions).await?;
    Ok(account_from(row, entries))
}

async fn upsert_card<C: ConnectionTrait>(conn: &C, card: CreditCard) -> Result<CreditCard, ServiceError> {
    let known = match card.id {
        Some(id) => credit_card::Entity::find_by_id(id).one(conn).await.map_err(db_err)?.map(|row| row.id),
        None => None,
    };
    let mut am = credit_card::ActiveModel {
        id: NotSet,
        last_four_digits: Set(card.last_four_digits),
        card_name: Set(card.card_name),
        valid_until: Set(card.valid_until),
        card_type: Set(card.card_type),
        status: Set(card.status),
        limit: Set(card.limit),
        balance: Set(card.balance),
        owner_id: Set(card.owner_id),
    };
    let row = match known {
        Some(id) => {
            am.id = Set(id);
            am.update(conn).await
        }
        None => am.insert(conn).await,
    }
    .map_err(db_err)?;
    let entries = sync_card_entries(conn, row.id, card.transactions).await?;
    Ok(card_from(row, entries))
}

#[async_trait]
impl CrudRepository<Account> for SeaOrmStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, ServiceError> {
        let Some(row) = account::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)? else {
            return Ok(None);
        };
        let entries = account_entries(&self.db, id).await?;
        Ok(Some(account_from(row, entries)))
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let n = account::Entity::find_by_id(id).count(&self.db).await.map_err(db_err)?;
        Ok(n > 0)
    }

    async fn save(&self, account: Account) -> Result<Account, ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let saved = upsert_account(&txn, account).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        account_transaction::Entity::delete_many()
            .filter(account_transaction::Column::AccountId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        account::Entity::delete_by_id(id).exec(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)
    }
}

#[async_trait]
impl OwnerRepository<Account> for SeaOrmStore {
    async fn find_by_owner_id(&self, owner_id: &str) -> Result<Vec<Account>, ServiceError> {
        let rows = account::Entity::find()
            .filter(account::Column::OwnerId.eq(owner_id))
            .order_by_asc(account::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let entries = account_entries(&self.db, row.id).await?;
            out.push(account_from(row, entries));
        }
        Ok(out)
    }
}

/// The parent row is read `FOR UPDATE`, so concurrent attaches to one
/// account queue behind each other until commit.
#[async_trait]
impl LedgerRepository<Account> for SeaOrmStore {
    async fn attach_entry(&self, parent_id: i64, entry: AccountTransaction) -> Result<Option<AccountTransaction>, ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let Some(row) = account::Entity::find_by_id(parent_id).lock_exclusive().one(&txn).await.map_err(db_err)? else {
            txn.rollback().await.map_err(db_err)?;
            return Ok(None);
        };
        let mut parent = account_from(row, account_entries(&txn, parent_id).await?);
        let known = known_entry_id(&parent, &entry);
        parent.attach(entry);
        let saved = upsert_account(&txn, parent).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(attached_entry(saved.entries(), known))
    }
}

#[async_trait]
impl CrudRepository<CreditCard> for SeaOrmStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<CreditCard>, ServiceError> {
        let Some(row) = credit_card::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)? else {
            return Ok(None);
        };
        let entries = card_entries(&self.db, id).await?;
        Ok(Some(card_from(row, entries)))
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let n = credit_card::Entity::find_by_id(id).count(&self.db).await.map_err(db_err)?;
        Ok(n > 0)
    }

    async fn save(&self, card: CreditCard) -> Result<CreditCard, ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let saved = upsert_card(&txn, card).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        card_transaction::Entity::delete_many()
            .filter(card_transaction::Column::CreditCardId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        credit_card::Entity::delete_by_id(id).exec(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)
    }
}

#[async_trait]
impl OwnerRepository<CreditCard> for SeaOrmStore {
    async fn find_by_owner_id(&self, owner_id: &str) -> Result<Vec<CreditCard>, ServiceError> {
        let rows = credit_card::Entity::find()
            .filter(credit_card::Column::OwnerId.eq(owner_id))
            .order_by_asc(credit_card::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let entries = card_entries(&self.db, row.id).await?;
            out.push(card_from(row, entries));
        }
        Ok(out)
    }
}

#[async_trait]
impl LedgerRepository<CreditCard> for SeaOrmStore {
    async fn attach_entry(&self, parent_id: i64, entry: CardTransaction) -> Result<Option<CardTransaction>, ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let Some(row) = credit_card::Entity::find_by_id(parent_id).lock_exclusive().one(&txn).await.map_err(db_err)? else {
            txn.rollback().await.map_err(db_err)?;
            return Ok(None);
        };
        let mut parent = card_from(row, card_entries(&txn, parent_id).await?);
        let known = known_entry_id(&parent, &entry);
        parent.attach(entry);
        let saved = upsert_card(&txn, parent).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(attached_entry(saved.entries(), known))
    }
}

#[async_trait]
impl CrudRepository<AccountTransaction> for SeaOrmStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<AccountTransaction>, ServiceError> {
        account_transaction::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(account_entry)
            .transpose()
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let n = account_transaction::Entity::find_by_id(id).count(&self.db).await.map_err(db_err)?;
        Ok(n > 0)
    }

    async fn save(&self, entry: AccountTransaction) -> Result<AccountTransaction, ServiceError> {
        let Some(account_id) = entry.account_id else {
            return Err(ServiceError::missing_parent(AccountTransaction::NAME));
        };
        let mut am = account_transaction::ActiveModel {
            id: NotSet,
            account_id: Set(account_id),
            transaction_date: Set(entry.details.transaction_date),
            amount: Set(entry.details.amount),
            description: Set(entry.details.description),
            kind: Set(entry.details.kind.as_str().to_string()),
        };
        let known = match entry.id {
            Some(id) => account_transaction::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?.map(|row| row.id),
            None => None,
        };
        let row = match known {
            Some(id) => {
                am.id = Set(id);
                am.update(&self.db).await
            }
            None => am.insert(&self.db).await,
        }
        .map_err(db_err)?;
        account_entry(row)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        account_transaction::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl PostingRepository<AccountTransaction> for SeaOrmStore {
    async fn find_by_parent_id(&self, parent_id: i64) -> Result<Vec<AccountTransaction>, ServiceError> {
        account_entries(&self.db, parent_id).await
    }

    async fn find_by_parent_id_and_date_range(
        &self,
        parent_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AccountTransaction>, ServiceError> {
        account_transaction::Entity::find()
            .filter(account_transaction::Column::AccountId.eq(parent_id))
            .filter(account_transaction::Column::TransactionDate.between(start, end))
            .order_by_asc(account_transaction::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(account_entry)
            .collect()
    }

    async fn find_by_parent_id_and_type(&self, parent_id: i64, kind: &str) -> Result<Vec<AccountTransaction>, ServiceError> {
        account_transaction::Entity::find()
            .filter(account_transaction::Column::AccountId.eq(parent_id))
            .filter(account_transaction::Column::Kind.eq(kind))
            .order_by_asc(account_transaction::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(account_entry)
            .collect()
    }

    async fn find_latest_by_parent_id(&self, parent_id: i64, limit: u64) -> Result<Vec<AccountTransaction>, ServiceError> {
        account_transaction::Entity::find()
            .filter(account_transaction::Column::AccountId.eq(parent_id))
            .order_by_desc(account_transaction::Column::TransactionDate)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(account_entry)
            .collect()
    }
}

#[async_trait]
impl CrudRepository<CardTransaction> for SeaOrmStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<CardTransaction>, ServiceError> {
        card_transaction::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(card_entry)
            .transpose()
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let n = card_transaction::Entity::find_by_id(id).count(&self.db).await.map_err(db_err)?;
        Ok(n > 0)
    }

    async fn save(&self, entry: CardTransaction) -> Result<CardTransaction, ServiceError> {
        let Some(card_id) = entry.credit_card_id else {
            return Err(ServiceError::missing_parent(CardTransaction::NAME));
        };
        let mut am = card_transaction::ActiveModel {
            id: NotSet,
            credit_card_id: Set(card_id),
            transaction_date: Set(entry.details.transaction_date),
            amount: Set(entry.details.amount),
            description: Set(entry.details.description),
            kind: Set(entry.details.kind.as_str().to_string()),
        };
        let known = match entry.id {
            Some(id) => card_transaction::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?.map(|row| row.id),
            None => None,
        };
        let row = match known {
            Some(id) => {
                am.id = Set(id);
                am.update(&self.db).await
            }
            None => am.insert(&self.db).await,
        }
        .map_err(db_err)?;
        card_entry(row)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        card_transaction::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl PostingRepository<CardTransaction> for SeaOrmStore {
    async fn find_by_parent_id(&self, parent_id: i64) -> Result<Vec<CardTransaction>, ServiceError> {
        card_entries(&self.db, parent_id).await
    }

    async fn find_by_parent_id_and_date_range(
        &self,
        parent_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CardTransaction>, ServiceError> {
        card_transaction::Entity::find()
            .filter(card_transaction::Column::CreditCardId.eq(parent_id))
            .filter(card_transaction::Column::TransactionDate.between(start, end))
            .order_by_asc(card_transaction::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(card_entry)
            .collect()
    }

    async fn find_by_parent_id_and_type(&self, parent_id: i64, kind: &str) -> Result<Vec<CardTransaction>, ServiceError> {
        card_transaction::Entity::find()
            .filter(card_transaction::Column::CreditCardId.eq(parent_id))
            .filter(card_transaction::Column::Kind.eq(kind))
            .order_by_asc(card_transaction::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(card_entry)
            .collect()
    }

    async fn find_latest_by_parent_id(&self, parent_id: i64, limit: u64) -> Result<Vec<CardTransaction>, ServiceError> {
        card_transaction::Entity::find()
            .filter(card_transaction::Column::CreditCardId.eq(parent_id))
            .order_by_desc(card_transaction::Column::TransactionDate)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(card_entry)
            .collect()
    }
}

#[async_trait]
impl CrudRepository<Message> for SeaOrmStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, ServiceError> {
        let row = message::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?;
        Ok(row.map(message_from))
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let n = message::Entity::find_by_id(id).count(&self.db).await.map_err(db_err)?;
        Ok(n > 0)
    }

    async fn save(&self, msg: Message) -> Result<Message, ServiceError> {
        let known = match msg.id {
            Some(id) => message::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?.map(|row| row.id),
            None => None,
        };
        let mut am = message::ActiveModel { id: NotSet, content: Set(msg.content), timestamp: Set(msg.timestamp) };
        let row = match known {
            Some(id) => {
                am.id = Set(id);
                am.update(&self.db).await
            }
            None => am.insert(&self.db).await,
        }
        .map_err(db_err)?;
        Ok(message_from(row))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        message::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl ListRepository<Message> for SeaOrmStore {
    async fn find_all(&self) -> Result<Vec<Message>, ServiceError> {
        let rows = message::Entity::find()
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(message_from).collect())
    }
}
