use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use super::{
    attached_entry, distinct_entries, known_entry_id, CrudRepository, LedgerRepository, ListRepository, OwnerRepository,
    PostingRepository,
};
use crate::{
    domain::{Account, AccountTransaction, CardTransaction, CreditCard, Entity, Ledger, Message, Posting},
    errors::ServiceError,
};

/// Process-local store. Every table sits behind a single lock so a parent
/// save and its entry changes are applied together.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    accounts: Table<Account>,
    account_entries: Table<AccountTransaction>,
    cards: Table<CreditCard>,
    card_entries: Table<CardTransaction>,
    messages: Table<Message>,
}

struct Table<T> {
    rows: BTreeMap<i64, T>,
    seq: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self { Self { rows: BTreeMap::new(), seq: 0 } }
}

impl<T> Table<T> {
    /// Keep a known id, otherwise allocate the next one.
    fn claim(&mut self, id: Option<i64>) -> i64 {
        match id {
            Some(id) if self.rows.contains_key(&id) => id,
            _ => {
                self.seq += 1;
                self.seq
            }
        }
    }
}

impl<T: Entity<Id = i64>> Table<T> {
    fn upsert(&mut self, mut row: T) -> T {
        let id = self.claim(row.id());
        row.set_id(id);
        self.rows.insert(id, row.clone());
        row
    }
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

fn entries_of<E: Posting>(entries: &Table<E>, parent_id: i64) -> Vec<E> {
    entries.rows.values().filter(|e| e.parent_id() == Some(parent_id)).cloned().collect()
}

fn load_parent<P: Ledger>(parents: &Table<P>, entries: &Table<P::Entry>, id: i64) -> Option<P> {
    let mut parent = parents.rows.get(&id)?.clone();
    *parent.entries_mut() = entries_of(entries, id);
    Some(parent)
}

fn save_parent<P: Ledger>(parents: &mut Table<P>, entries: &mut Table<P::Entry>, mut parent: P) -> P {
    let id = parents.claim(parent.id());
    parent.set_id(id);

    let submitted = distinct_entries(std::mem::take(parent.entries_mut()));
    let mut kept = Vec::with_capacity(submitted.len());
    for mut entry in submitted {
        // an entry id that belongs to another parent is treated as new
        let known = entry.id().filter(|eid| entries.rows.get(eid).is_some_and(|e| e.parent_id() == Some(id)));
        entry.set_parent_id(Some(id));
        let eid = entries.claim(known);
        entry.set_id(eid);
        entries.rows.insert(eid, entry.clone());
        kept.push(entry);
    }
    let kept_ids: HashSet<i64> = kept.iter().filter_map(|k| k.id()).collect();
    entries.rows.retain(|eid, e| e.parent_id() != Some(id) || kept_ids.contains(eid));

    parents.rows.insert(id, parent.clone());
    *parent.entries_mut() = kept;
    parent
}

/// Caller holds the write guard across lookup and save.
fn attach_to<P: Ledger>(parents: &mut Table<P>, entries: &mut Table<P::Entry>, parent_id: i64, entry: P::Entry) -> Option<P::Entry> {
    let mut parent = load_parent(parents, entries, parent_id)?;
    let known = known_entry_id(&parent, &entry);
    parent.attach(entry);
    let saved = save_parent(parents, entries, parent);
    attached_entry(saved.entries(), known)
}

fn delete_parent<P: Ledger>(parents: &mut Table<P>, entries: &mut Table<P::Entry>, id: i64) {
    entries.rows.retain(|_, e| e.parent_id() != Some(id));
    parents.rows.remove(&id);
}

fn save_entry<P: Ledger>(parents: &Table<P>, entries: &mut Table<P::Entry>, entry: P::Entry) -> Result<P::Entry, ServiceError> {
    match entry.parent_id() {
        Some(pid) if parents.rows.contains_key(&pid) => Ok(entries.upsert(entry)),
        _ => Err(ServiceError::missing_parent(<P::Entry as Entity>::NAME)),
    }
}

fn in_range<E: Posting>(entries: &Table<E>, parent_id: i64, start: NaiveDateTime, end: NaiveDateTime) -> Vec<E> {
    entries_of(entries, parent_id)
        .into_iter()
        .filter(|e| {
            let at = e.details().transaction_date;
            start <= at && at <= end
        })
        .collect()
}

fn of_type<E: Posting>(entries: &Table<E>, parent_id: i64, kind: &str) -> Vec<E> {
    entries_of(entries, parent_id).into_iter().filter(|e| e.details().kind.as_str() == kind).collect()
}

fn latest<E: Posting>(entries: &Table<E>, parent_id: i64, limit: u64) -> Vec<E> {
    let mut rows = entries_of(entries, parent_id);
    rows.sort_by(|a, b| b.details().transaction_date.cmp(&a.details().transaction_date));
    rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    rows
}

fn ensure_unique_number(accounts: &Table<Account>, account: &Account) -> Result<(), ServiceError> {
    let clash = accounts
        .rows
        .values()
        .any(|row| row.account_number == account.account_number && row.id != account.id);
    if clash {
        return Err(ServiceError::Conflict(format!("account_number {} already exists", account.account_number)));
    }
    Ok(())
}

#[async_trait]
impl CrudRepository<Account> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, ServiceError> {
        let t = self.tables.read().await;
        Ok(load_parent(&t.accounts, &t.account_entries, id))
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.tables.read().await.accounts.rows.contains_key(&id))
    }

    async fn save(&self, account: Account) -> Result<Account, ServiceError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        ensure_unique_number(&t.accounts, &account)?;
        Ok(save_parent(&mut t.accounts, &mut t.account_entries, account))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        delete_parent(&mut t.accounts, &mut t.account_entries, id);
        Ok(())
    }
}

#[async_trait]
impl OwnerRepository<Account> for MemoryStore {
    async fn find_by_owner_id(&self, owner_id: &str) -> Result<Vec<Account>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.accounts
            .rows
            .values()
            .filter(|a| a.owner_id == owner_id)
            .filter_map(|a| a.id.and_then(|id| load_parent(&t.accounts, &t.account_entries, id)))
            .collect())
    }
}

#[async_trait]
impl LedgerRepository<Account> for MemoryStore {
    async fn attach_entry(&self, parent_id: i64, entry: AccountTransaction) -> Result<Option<AccountTransaction>, ServiceError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        Ok(attach_to(&mut t.accounts, &mut t.account_entries, parent_id, entry))
    }
}

#[async_trait]
impl CrudRepository<CreditCard> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<CreditCard>, ServiceError> {
        let t = self.tables.read().await;
        Ok(load_parent(&t.cards, &t.card_entries, id))
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.tables.read().await.cards.rows.contains_key(&id))
    }

    async fn save(&self, card: CreditCard) -> Result<CreditCard, ServiceError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        Ok(save_parent(&mut t.cards, &mut t.card_entries, card))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        delete_parent(&mut t.cards, &mut t.card_entries, id);
        Ok(())
    }
}

#[async_trait]
impl OwnerRepository<CreditCard> for MemoryStore {
    async fn find_by_owner_id(&self, owner_id: &str) -> Result<Vec<CreditCard>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.cards
            .rows
            .values()
            .filter(|c| c.owner_id == owner_id)
            .filter_map(|c| c.id.and_then(|id| load_parent(&t.cards, &t.card_entries, id)))
            .collect())
    }
}

#[async_trait]
impl LedgerRepository<CreditCard> for MemoryStore {
    async fn attach_entry(&self, parent_id: i64, entry: CardTransaction) -> Result<Option<CardTransaction>, ServiceError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        Ok(attach_to(&mut t.cards, &mut t.card_entries, parent_id, entry))
    }
}

#[async_trait]
impl CrudRepository<AccountTransaction> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<AccountTransaction>, ServiceError> {
        Ok(self.tables.read().await.account_entries.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.tables.read().await.account_entries.rows.contains_key(&id))
    }

    async fn save(&self, entry: AccountTransaction) -> Result<AccountTransaction, ServiceError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        save_entry(&t.accounts, &mut t.account_entries, entry)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        self.tables.write().await.account_entries.rows.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl PostingRepository<AccountTransaction> for MemoryStore {
    async fn find_by_parent_id(&self, parent_id: i64) -> Result<Vec<AccountTransaction>, ServiceError> {
        Ok(entries_of(&self.tables.read().await.account_entries, parent_id))
    }

    async fn find_by_parent_id_and_date_range(
        &self,
        parent_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AccountTransaction>, ServiceError> {
        Ok(in_range(&self.tables.read().await.account_entries, parent_id, start, end))
    }

    async fn find_by_parent_id_and_type(&self, parent_id: i64, kind: &str) -> Result<Vec<AccountTransaction>, ServiceError> {
        Ok(of_type(&self.tables.read().await.account_entries, parent_id, kind))
    }

    async fn find_latest_by_parent_id(&self, parent_id: i64, limit: u64) -> Result<Vec<AccountTransaction>, ServiceError> {
        Ok(latest(&self.tables.read().await.account_entries, parent_id, limit))
    }
}

#[async_trait]
impl CrudRepository<CardTransaction> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<CardTransaction>, ServiceError> {
        Ok(self.tables.read().await.card_entries.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.tables.read().await.card_entries.rows.contains_key(&id))
    }

    async fn save(&self, entry: CardTransaction) -> Result<CardTransaction, ServiceError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        save_entry(&t.cards, &mut t.card_entries, entry)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        self.tables.write().await.card_entries.rows.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl PostingRepository<CardTransaction> for MemoryStore {
    async fn find_by_parent_id(&self, parent_id: i64) -> Result<Vec<CardTransaction>, ServiceError> {
        Ok(entries_of(&self.tables.read().await.card_entries, parent_id))
    }

    async fn find_by_parent_id_and_date_range(
        &self,
        parent_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CardTransaction>, ServiceError> {
        Ok(in_range(&self.tables.read().await.card_entries, parent_id, start, end))
    }

    async fn find_by_parent_id_and_type(&self, parent_id: i64, kind: &str) -> Result<Vec<CardTransaction>, ServiceError> {
        Ok(of_type(&self.tables.read().await.card_entries, parent_id, kind))
    }

    async fn find_latest_by_parent_id(&self, parent_id: i64, limit: u64) -> Result<Vec<CardTransaction>, ServiceError> {
        Ok(latest(&self.tables.read().await.card_entries, parent_id, limit))
    }
}

#[async_trait]
impl CrudRepository<Message> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, ServiceError> {
        Ok(self.tables.read().await.messages.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.tables.read().await.messages.rows.contains_key(&id))
    }

    async fn save(&self, message: Message) -> Result<Message, ServiceError> {
        Ok(self.tables.write().await.messages.upsert(message))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        self.tables.write().await.messages.rows.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ListRepository<Message> for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Message>, ServiceError> {
        Ok(self.tables.read().await.messages.rows.values().cloned().collect())
    }
}
