//! Card transactions addressed by transaction id or card id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use service::domain::{CardTransaction, TransactionDto};
use tracing::debug;

use super::{
    auth::AuthOwner,
    cards,
    query::{found, non_empty},
};
use crate::{errors::JsonApiError, state::ServerState};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/transactions/:id", get(get_transaction).delete(delete_transaction))
        .route("/api/transactions/card/:card_id", get(cards::list_transactions).post(cards::add_transaction))
        .route("/api/transactions/card/:card_id/daterange", get(cards::transactions_in_range))
        .route("/api/transactions/card/:card_id/type/:type", get(cards::transactions_by_type))
        .route("/api/transactions/owner/:owner_id", get(transactions_by_owner))
}

pub async fn get_transaction(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<CardTransaction>, JsonApiError> {
    found(state.bank.card_transactions.get_by_id(id).await?, "transaction")
}

pub async fn delete_transaction(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<StatusCode, JsonApiError> {
    match state.bank.card_transactions.delete(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::not_found("transaction not found")),
    }
}

/// Every card transaction of `owner_id`, across all their cards.
pub async fn transactions_by_owner(
    State(state): State<ServerState>,
    Extension(AuthOwner(caller)): Extension<AuthOwner>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    debug!(%caller, %owner_id, "owner transaction listing");
    non_empty(state.bank.card_transactions.get_dtos_by_owner_id(&owner_id).await?, "transactions")
}

