use thiserror::Error;

/// Failures of the store behind a service. Absent records are not errors:
/// services report them as `None` / `false`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn missing_parent(entity: &str) -> Self {
        Self::Conflict(format!("{entity} requires an existing parent"))
    }
}
