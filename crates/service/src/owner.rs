use std::sync::Arc;

use tracing::debug;

use crate::{
    crud::CrudService,
    domain::{CreditCard, CreditCardDto, Owned},
    errors::ServiceError,
    repository::OwnerRepository,
};

/// CRUD plus lookup by owner id, for accounts and cards.
pub struct OwnerService<T, R: ?Sized> {
    crud: CrudService<T, R>,
}

impl<T, R: ?Sized> Clone for OwnerService<T, R> {
    fn clone(&self) -> Self { Self { crud: self.crud.clone() } }
}

impl<T: Owned, R: OwnerRepository<T> + ?Sized> OwnerService<T, R> {
    pub fn new(repo: Arc<R>) -> Self { Self { crud: CrudService::new(repo) } }

    pub fn crud(&self) -> &CrudService<T, R> { &self.crud }

    pub async fn get_by_id(&self, id: T::Id) -> Result<Option<T>, ServiceError> { self.crud.get_by_id(id).await }

    pub async fn save(&self, entity: T) -> Result<T, ServiceError> { self.crud.save(entity).await }

    pub async fn update(&self, id: T::Id, entity: T) -> Result<Option<T>, ServiceError> {
        self.crud.update(id, entity).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<bool, ServiceError> { self.crud.delete(id).await }

    /// Empty when the owner has nothing.
    pub async fn get_by_owner_id(&self, owner_id: &str) -> Result<Vec<T>, ServiceError> {
        let found = self.crud.repository().find_by_owner_id(owner_id).await?;
        debug!(entity = T::NAME, owner_id, count = found.len(), "owner lookup");
        Ok(found)
    }
}

impl<R: OwnerRepository<CreditCard> + ?Sized> OwnerService<CreditCard, R> {
    pub async fn get_card_dtos_by_owner_id(&self, owner_id: &str) -> Result<Vec<CreditCardDto>, ServiceError> {
        let cards = self.get_by_owner_id(owner_id).await?;
        Ok(cards.iter().map(CreditCardDto::from).collect())
    }

    pub async fn get_card_dto_by_id(&self, id: i64) -> Result<Option<CreditCardDto>, ServiceError> {
        Ok(self.get_by_id(id).await?.as_ref().map(CreditCardDto::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Account,
        repository::MemoryStore,
        test_support::{account, card},
    };

    #[tokio::test]
    async fn unknown_owner_gets_empty_lists() {
        let store = Arc::new(MemoryStore::new());
        let accounts = OwnerService::<Account, _>::new(store.clone());
        let cards = OwnerService::<CreditCard, _>::new(store);
        accounts.save(account("u1", "ACC-1")).await.unwrap();
        cards.save(card("u1")).await.unwrap();

        assert!(accounts.get_by_owner_id("nonexistent").await.unwrap().is_empty());
        assert!(cards.get_by_owner_id("nonexistent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_filter_is_exact() {
        let store = Arc::new(MemoryStore::new());
        let accounts = OwnerService::<Account, _>::new(store);
        accounts.save(account("u1", "ACC-1")).await.unwrap();
        accounts.save(account("u1", "ACC-2")).await.unwrap();
        accounts.save(account("u10", "ACC-3")).await.unwrap();

        let numbers: Vec<String> =
            accounts.get_by_owner_id("u1").await.unwrap().into_iter().map(|a| a.account_number).collect();
        assert_eq!(numbers, vec!["ACC-1", "ACC-2"]);
    }

    #[tokio::test]
    async fn card_dto_drops_transactions() {
        let store = Arc::new(MemoryStore::new());
        let cards = OwnerService::<CreditCard, _>::new(store);
        let saved = cards.save(card("u1")).await.unwrap();

        let dto = cards.get_card_dto_by_id(saved.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(dto.last_four_digits, saved.last_four_digits);
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("transactions").is_none());

        assert!(cards.get_card_dto_by_id(404).await.unwrap().is_none());
        assert_eq!(cards.get_card_dtos_by_owner_id("u1").await.unwrap().len(), 1);
    }
}
