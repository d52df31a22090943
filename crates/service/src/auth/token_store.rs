use dashmap::DashMap;
use uuid::Uuid;

/// Opaque bearer token to owner id, shared across requests.
///
/// Nothing is persisted: a restart drops every session.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: DashMap<String, String>,
}

impl TokenStore {
    pub fn new() -> Self { Self::default() }

    /// Mint a fresh token for `owner_id`. Earlier tokens stay valid.
    pub fn issue(&self, owner_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), owner_id.to_string());
        token
    }

    pub fn resolve(&self, token: &str) -> Option<String> { self.tokens.get(token).map(|e| e.value().clone()) }

    /// Returns whether the token was live.
    pub fn revoke(&self, token: &str) -> bool { self.tokens.remove(token).is_some() }

    pub fn len(&self) -> usize { self.tokens.len() }

    pub fn is_empty(&self) -> bool { self.tokens.is_empty() }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn tokens_are_unique_per_issue() {
        let store = TokenStore::new();
        let a = store.issue("o1");
        let b = store.issue("o1");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn revoke_is_idempotent() {
        let store = TokenStore::new();
        let t = store.issue("o1");
        assert!(store.revoke(&t));
        assert!(!store.revoke(&t));
        assert!(store.resolve(&t).is_none());
    }

    #[test]
    fn concurrent_issue_and_resolve() {
        let store = Arc::new(TokenStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    let owner = format!("owner-{i}");
                    for _ in 0..100 {
                        let t = store.issue(&owner);
                        assert_eq!(store.resolve(&t).as_deref(), Some(owner.as_str()));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }
}
