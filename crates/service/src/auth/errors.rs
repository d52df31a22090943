use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    Unauthorized,
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or revoked token")]
    InvalidToken,
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Unauthorized => 1004,
            AuthError::MissingToken => 1101,
            AuthError::InvalidToken => 1102,
        }
    }
}
