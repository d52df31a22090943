use std::{marker::PhantomData, sync::Arc};

use tracing::{debug, info, instrument};

use crate::{
    domain::Entity,
    errors::ServiceError,
    repository::{CrudRepository, ListRepository},
};

/// Uniform get/save/update/delete over any `CrudRepository`.
///
/// Absent ids are reported as `None` or `false`; only store failures are errors.
pub struct CrudService<T, R: ?Sized> {
    repo: Arc<R>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, R: ?Sized> Clone for CrudService<T, R> {
    fn clone(&self) -> Self { Self { repo: self.repo.clone(), _entity: PhantomData } }
}

impl<T: Entity, R: CrudRepository<T> + ?Sized> CrudService<T, R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo, _entity: PhantomData } }

    pub fn repository(&self) -> &Arc<R> { &self.repo }

    pub async fn get_by_id(&self, id: T::Id) -> Result<Option<T>, ServiceError> { self.repo.find_by_id(id).await }

    #[instrument(skip_all, fields(record = T::NAME))]
    pub async fn save(&self, entity: T) -> Result<T, ServiceError> {
        let saved = self.repo.save(entity).await?;
        if let Some(id) = saved.id() {
            info!(%id, "saved");
        }
        Ok(saved)
    }

    /// Full replace of the record at `id`. Fields left unset on `entity`
    /// overwrite the stored ones.
    #[instrument(skip_all, fields(record = T::NAME, %id))]
    pub async fn update(&self, id: T::Id, mut entity: T) -> Result<Option<T>, ServiceError> {
        if !self.repo.exists_by_id(id).await? {
            debug!("update target missing");
            return Ok(None);
        }
        entity.set_id(id);
        let saved = self.repo.save(entity).await?;
        info!("updated");
        Ok(Some(saved))
    }

    #[instrument(skip_all, fields(record = T::NAME, %id))]
    pub async fn delete(&self, id: T::Id) -> Result<bool, ServiceError> {
        if !self.repo.exists_by_id(id).await? {
            return Ok(false);
        }
        self.repo.delete_by_id(id).await?;
        info!("deleted");
        Ok(true)
    }
}

impl<T: Entity, R: ListRepository<T> + ?Sized> CrudService<T, R> {
    pub async fn get_all(&self) -> Result<Vec<T>, ServiceError> { self.repo.find_all().await }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::{domain::Message, repository::MemoryStore};

    /// Wraps the memory store and counts `save` calls.
    #[derive(Default)]
    struct CountingRepo {
        inner: MemoryStore,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl CrudRepository<Message> for CountingRepo {
        async fn find_by_id(&self, id: i64) -> Result<Option<Message>, ServiceError> {
            CrudRepository::<Message>::find_by_id(&self.inner, id).await
        }

        async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
            CrudRepository::<Message>::exists_by_id(&self.inner, id).await
        }

        async fn save(&self, entity: Message) -> Result<Message, ServiceError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            CrudRepository::<Message>::save(&self.inner, entity).await
        }

        async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
            CrudRepository::<Message>::delete_by_id(&self.inner, id).await
        }
    }

    #[tokio::test]
    async fn update_of_missing_id_never_saves() {
        let repo = Arc::new(CountingRepo::default());
        let svc = CrudService::<Message, _>::new(repo.clone());

        let out = svc.update(7, Message::new("ghost")).await.unwrap();
        assert!(out.is_none());
        assert_eq!(repo.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_forces_path_id() {
        let repo = Arc::new(CountingRepo::default());
        let svc = CrudService::<Message, _>::new(repo.clone());
        let first = svc.save(Message::new("v1")).await.unwrap();
        let id = first.id.unwrap();

        let mut body = Message::new("v2");
        body.id = Some(999);
        let updated = svc.update(id, body).await.unwrap().unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(svc.get_by_id(id).await.unwrap().unwrap().content, "v2");
        assert_eq!(repo.saves.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn delete_is_true_exactly_once() {
        let svc = CrudService::<Message, _>::new(Arc::new(MemoryStore::new()));
        let id = svc.save(Message::new("bye")).await.unwrap().id.unwrap();

        assert!(svc.delete(id).await.unwrap());
        assert!(!svc.delete(id).await.unwrap());
        assert!(svc.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_all_lists_saved_messages() {
        let svc = CrudService::<Message, _>::new(Arc::new(MemoryStore::new()));
        svc.save(Message::new("a")).await.unwrap();
        svc.save(Message::new("b")).await.unwrap();
        let all: Vec<String> = svc.get_all().await.unwrap().into_iter().map(|m| m.content).collect();
        assert_eq!(all, vec!["a", "b"]);
    }
}
