use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::{
    domain::{AuthSession, LoginInput, User},
    errors::AuthError,
    token_store::TokenStore,
};

/// Token lifecycle: issued, validated any number of times, revoked.
pub struct AuthService {
    user: User,
    tokens: Arc<TokenStore>,
}

impl AuthService {
    pub fn new(user: User) -> Self { Self::with_store(user, Arc::new(TokenStore::new())) }

    pub fn with_store(user: User, tokens: Arc<TokenStore>) -> Self { Self { user, tokens } }

    pub fn tokens(&self) -> &Arc<TokenStore> { &self.tokens }

    /// Exact match against the configured credential.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<User> {
        (self.user.username == username && self.user.password == password).then(|| self.user.clone())
    }

    #[instrument(skip_all, fields(owner_id = %user.owner_id))]
    pub fn generate_token(&self, user: &User) -> String {
        let token = self.tokens.issue(&user.owner_id);
        info!("token issued");
        token
    }

    pub fn validate_token(&self, token: &str) -> Option<String> { self.tokens.resolve(token) }

    /// No-op for unknown tokens.
    pub fn invalidate_token(&self, token: &str) {
        if self.tokens.revoke(token) {
            info!("token revoked");
        } else {
            debug!("revoke of unknown token ignored");
        }
    }

    /// Authenticate and issue a token in one step.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, domain::{LoginInput, User}};
    /// let auth = AuthService::new(User::new("alice", "correct", "alice-owner-id"));
    /// let session = auth.login(LoginInput { username: "alice".into(), password: "correct".into() }).unwrap();
    /// assert_eq!(auth.validate_token(&session.token).as_deref(), Some("alice-owner-id"));
    /// ```
    pub fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.authenticate(&input.username, &input.password).ok_or(AuthError::Unauthorized)?;
        let token = self.generate_token(&user);
        Ok(AuthSession { user, token })
    }

    /// Owner id behind a live token.
    pub fn require_owner(&self, token: &str) -> Result<String, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.validate_token(token).ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AuthService { AuthService::new(User::new("alice", "correct", "alice-owner-id")) }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = alice();
        assert!(auth.authenticate("alice", "wrong-password").is_none());
        assert!(auth.authenticate("bob", "correct").is_none());
    }

    #[test]
    fn token_round_trip_then_revoke() {
        let auth = alice();
        let user = auth.authenticate("alice", "correct").unwrap();
        let token = auth.generate_token(&user);
        assert!(!token.is_empty());

        assert_eq!(auth.validate_token(&token).as_deref(), Some("alice-owner-id"));
        // validation does not consume the token
        assert_eq!(auth.validate_token(&token).as_deref(), Some("alice-owner-id"));

        auth.invalidate_token(&token);
        assert!(auth.validate_token(&token).is_none());
        auth.invalidate_token(&token);
    }

    #[test]
    fn sessions_are_independent() {
        let auth = alice();
        let user = auth.authenticate("alice", "correct").unwrap();
        let first = auth.generate_token(&user);
        let second = auth.generate_token(&user);
        auth.invalidate_token(&first);
        assert_eq!(auth.validate_token(&second).as_deref(), Some("alice-owner-id"));
    }

    #[test]
    fn login_maps_failures() {
        let auth = alice();
        let err = auth.login(LoginInput { username: "alice".into(), password: "nope".into() }).unwrap_err();
        assert_eq!(err, AuthError::Unauthorized);
        assert_eq!(auth.require_owner("").unwrap_err(), AuthError::MissingToken);
        assert_eq!(auth.require_owner("tok-123").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn password_is_not_debug_printed() {
        let printed = format!("{:?}", User::new("alice", "correct", "o"));
        assert!(!printed.contains("correct"));
    }
}
