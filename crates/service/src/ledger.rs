use std::{marker::PhantomData, sync::Arc};

use chrono::NaiveDateTime;
use tracing::{debug, info, instrument};

use crate::{
    domain::{CardTransaction, CreditCard, Entity, Ledger, Posting, TransactionDto},
    errors::ServiceError,
    pagination::LastN,
    repository::{CrudRepository, LedgerRepository, OwnerRepository, PostingRepository},
};

/// Transactions scoped to one parent type.
///
/// New entries are never inserted directly: `save` attaches the entry to its
/// parent and persists the parent in one store step, so the back-reference is
/// always set and concurrent attaches to one parent all survive.
pub struct LedgerService<P, PR: ?Sized, ER: ?Sized> {
    parents: Arc<PR>,
    entries: Arc<ER>,
    _ledger: PhantomData<fn() -> P>,
}

impl<P, PR: ?Sized, ER: ?Sized> Clone for LedgerService<P, PR, ER> {
    fn clone(&self) -> Self {
        Self { parents: self.parents.clone(), entries: self.entries.clone(), _ledger: PhantomData }
    }
}

fn dtos<E: Posting>(entries: Vec<E>) -> Vec<TransactionDto> { entries.iter().map(TransactionDto::of).collect() }

impl<P, PR, ER> LedgerService<P, PR, ER>
where
    P: Ledger,
    PR: LedgerRepository<P> + ?Sized,
    ER: PostingRepository<P::Entry> + ?Sized,
{
    pub fn new(parents: Arc<PR>, entries: Arc<ER>) -> Self { Self { parents, entries, _ledger: PhantomData } }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<P::Entry>, ServiceError> {
        self.entries.find_by_id(id).await
    }

    pub async fn get_by_parent_id(&self, parent_id: i64) -> Result<Vec<P::Entry>, ServiceError> {
        self.entries.find_by_parent_id(parent_id).await
    }

    /// Inclusive on both ends. `start > end` yields nothing.
    pub async fn get_by_parent_id_and_date_range(
        &self,
        parent_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<P::Entry>, ServiceError> {
        self.entries.find_by_parent_id_and_date_range(parent_id, start, end).await
    }

    /// `kind` must match the stored type string exactly (`CHARGE`, `CREDIT`).
    pub async fn get_by_parent_id_and_type(&self, parent_id: i64, kind: &str) -> Result<Vec<P::Entry>, ServiceError> {
        self.entries.find_by_parent_id_and_type(parent_id, kind).await
    }

    pub async fn get_last(&self, parent_id: i64, window: LastN) -> Result<Vec<P::Entry>, ServiceError> {
        self.entries.find_latest_by_parent_id(parent_id, window.limit()).await
    }

    /// Attach `entry` to the parent and persist the parent.
    ///
    /// Returns `None` without writing anything when the parent does not exist.
    #[instrument(skip_all, fields(ledger = <P::Entry as Posting>::KIND.as_str(), parent_id = parent_id))]
    pub async fn save(&self, entry: P::Entry, parent_id: i64) -> Result<Option<P::Entry>, ServiceError> {
        let Some(attached) = self.parents.attach_entry(parent_id, entry).await? else {
            debug!(parent = P::NAME, "parent missing, nothing attached");
            return Ok(None);
        };
        if let Some(id) = attached.id() {
            info!(entry_id = id, "transaction attached");
        }
        Ok(Some(attached))
    }

    #[instrument(skip_all, fields(ledger = <P::Entry as Posting>::KIND.as_str(), id = id))]
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        if !self.entries.exists_by_id(id).await? {
            return Ok(false);
        }
        self.entries.delete_by_id(id).await?;
        info!("transaction deleted");
        Ok(true)
    }

    pub async fn get_dto_by_id(&self, id: i64) -> Result<Option<TransactionDto>, ServiceError> {
        Ok(self.get_by_id(id).await?.as_ref().map(TransactionDto::of))
    }

    pub async fn get_dtos_by_parent_id(&self, parent_id: i64) -> Result<Vec<TransactionDto>, ServiceError> {
        self.get_by_parent_id(parent_id).await.map(dtos)
    }

    pub async fn get_dtos_by_parent_id_and_date_range(
        &self,
        parent_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<TransactionDto>, ServiceError> {
        self.get_by_parent_id_and_date_range(parent_id, start, end).await.map(dtos)
    }

    pub async fn get_dtos_by_parent_id_and_type(&self, parent_id: i64, kind: &str) -> Result<Vec<TransactionDto>, ServiceError> {
        self.get_by_parent_id_and_type(parent_id, kind).await.map(dtos)
    }

    pub async fn get_last_dtos(&self, parent_id: i64, window: LastN) -> Result<Vec<TransactionDto>, ServiceError> {
        self.get_last(parent_id, window).await.map(dtos)
    }
}

impl<PR, ER> LedgerService<CreditCard, PR, ER>
where
    PR: OwnerRepository<CreditCard> + ?Sized,
    ER: PostingRepository<CardTransaction> + ?Sized,
{
    /// Every transaction on every card held by `owner_id`, card by card.
    pub async fn get_dtos_by_owner_id(&self, owner_id: &str) -> Result<Vec<TransactionDto>, ServiceError> {
        let cards = self.parents.find_by_owner_id(owner_id).await?;
        Ok(cards.iter().flat_map(|card| card.transactions.iter().map(TransactionDto::of)).collect())
    }
}
