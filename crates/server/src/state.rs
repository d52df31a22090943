use std::sync::Arc;

use service::{
    auth::{domain::User, AuthService},
    repository::{BankStore, MemoryStore},
    Bank,
};

/// Shared by every handler.
#[derive(Clone)]
pub struct ServerState {
    pub bank: Arc<Bank>,
    pub auth: Arc<AuthService>,
}

impl ServerState {
    pub fn new(store: Arc<dyn BankStore>, user: User) -> Self {
        Self { bank: Arc::new(Bank::new(store)), auth: Arc::new(AuthService::new(user)) }
    }

    /// Fresh in-memory store with the given login.
    pub fn in_memory(user: User) -> Self { Self::new(Arc::new(MemoryStore::new()), user) }
}
