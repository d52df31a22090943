//! Storage capabilities the services are written against.
//!
//! Each trait is generic over the record type so one store value can serve
//! every table. `BankStore` bundles the full set and is what the server
//! holds as `Arc<dyn BankStore>`.

pub mod memory;
pub mod seaorm;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    domain::{Account, AccountTransaction, CardTransaction, CreditCard, Entity, Ledger, Message, Owned, Posting},
    errors::ServiceError,
};

pub use memory::MemoryStore;
pub use seaorm::SeaOrmStore;

#[async_trait]
pub trait CrudRepository<T: Entity>: Send + Sync {
    async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, ServiceError>;

    async fn exists_by_id(&self, id: T::Id) -> Result<bool, ServiceError>;

    /// Insert when the id is absent or unknown, overwrite otherwise.
    ///
    /// Parents persist their entries in the same call: new entries get ids
    /// and a back-reference, entries missing from the collection are removed.
    async fn save(&self, entity: T) -> Result<T, ServiceError>;

    async fn delete_by_id(&self, id: T::Id) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait ListRepository<T: Entity>: CrudRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>, ServiceError>;
}

#[async_trait]
pub trait OwnerRepository<T: Owned>: CrudRepository<T> {
    async fn find_by_owner_id(&self, owner_id: &str) -> Result<Vec<T>, ServiceError>;
}

#[async_trait]
pub trait PostingRepository<E: Posting>: CrudRepository<E> {
    async fn find_by_parent_id(&self, parent_id: i64) -> Result<Vec<E>, ServiceError>;

    /// Both bounds inclusive.
    async fn find_by_parent_id_and_date_range(
        &self,
        parent_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<E>, ServiceError>;

    async fn find_by_parent_id_and_type(&self, parent_id: i64, kind: &str) -> Result<Vec<E>, ServiceError>;

    /// Newest `transaction_date` first, at most `limit` rows.
    async fn find_latest_by_parent_id(&self, parent_id: i64, limit: u64) -> Result<Vec<E>, ServiceError>;
}

#[async_trait]
pub trait LedgerRepository<P: Ledger>: CrudRepository<P> {
    /// Load the parent, attach `entry` and persist the parent as one step.
    ///
    /// The parent stays exclusively held from lookup to write, so concurrent
    /// attaches to the same parent never drop each other's entries. `None`
    /// when the parent does not exist; nothing is written then.
    async fn attach_entry(&self, parent_id: i64, entry: P::Entry) -> Result<Option<P::Entry>, ServiceError>;
}

pub trait BankStore:
    OwnerRepository<Account>
    + LedgerRepository<Account>
    + PostingRepository<AccountTransaction>
    + OwnerRepository<CreditCard>
    + LedgerRepository<CreditCard>
    + PostingRepository<CardTransaction>
    + ListRepository<Message>
{
}

impl<S> BankStore for S where
    S: OwnerRepository<Account>
        + LedgerRepository<Account>
        + PostingRepository<AccountTransaction>
        + OwnerRepository<CreditCard>
        + LedgerRepository<CreditCard>
        + PostingRepository<CardTransaction>
        + ListRepository<Message>
{
}

/// Collapse entries that share an id: the last submission wins and takes the
/// position of the first. Entries without an id are all kept.
pub(crate) fn distinct_entries<E: Posting>(entries: Vec<E>) -> Vec<E> {
    let mut out: Vec<E> = Vec::with_capacity(entries.len());
    let mut seen: HashMap<i64, usize> = HashMap::new();
    for entry in entries {
        match entry.id() {
            Some(id) => match seen.get(&id) {
                Some(&pos) => out[pos] = entry,
                None => {
                    seen.insert(id, out.len());
                    out.push(entry);
                }
            },
            None => out.push(entry),
        }
    }
    out
}

/// The entry `attach_entry` just persisted. `known` is the id it already had
/// under this parent; otherwise it is the newest (last) entry.
pub(crate) fn attached_entry<E: Posting>(saved: &[E], known: Option<i64>) -> Option<E> {
    match known {
        Some(id) => saved.iter().find(|e| e.id() == Some(id)).cloned(),
        None => saved.last().cloned(),
    }
}

/// Id of `entry` if it already belongs to `parent`.
pub(crate) fn known_entry_id<P: Ledger>(parent: &P, entry: &P::Entry) -> Option<i64> {
    entry.id().filter(|id| parent.entries().iter().any(|e| e.id() == Some(*id)))
}
