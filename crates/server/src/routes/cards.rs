use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use models::{
    account::validate_owner_id,
    credit_card::{validate_card_name, validate_last_four_digits},
    money::validate_money,
};
use service::domain::{CardTransaction, CreditCard, CreditCardDto, TransactionDto};

use super::query::{found, non_empty, validate_details, DateRangeQuery, LastQuery};
use crate::{errors::JsonApiError, state::ServerState};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/cards", post(create_card))
        .route("/api/cards/:id", get(get_card).put(update_card).delete(delete_card))
        .route("/api/cards/:id/dto", get(get_card_dto))
        .route("/api/cards/owner/:owner_id", get(cards_by_owner))
        .route("/api/cards/:id/transactions", get(list_transactions).post(add_transaction))
        .route("/api/cards/:id/transactions/last", get(last_transactions))
        .route("/api/cards/:id/transactions/daterange", get(transactions_in_range))
        .route("/api/cards/:id/transactions/type/:type", get(transactions_by_type))
}

fn validate_card(card: &CreditCard) -> Result<(), JsonApiError> {
    validate_last_four_digits(&card.last_four_digits)?;
    validate_card_name(&card.card_name)?;
    validate_owner_id(&card.owner_id)?;
    validate_money("limit", card.limit)?;
    validate_money("balance", card.balance)?;
    for entry in &card.transactions {
        validate_details(&entry.details)?;
    }
    Ok(())
}

pub async fn create_card(State(state): State<ServerState>, Json(input): Json<CreditCard>) -> Result<Json<CreditCard>, JsonApiError> {
    validate_card(&input)?;
    Ok(Json(state.bank.cards.save(input).await?))
}

pub async fn get_card(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<CreditCard>, JsonApiError> {
    found(state.bank.cards.get_by_id(id).await?, "card")
}

pub async fn get_card_dto(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<CreditCardDto>, JsonApiError> {
    found(state.bank.cards.get_card_dto_by_id(id).await?, "card")
}

pub async fn update_card(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<CreditCard>,
) -> Result<Json<CreditCard>, JsonApiError> {
    validate_card(&input)?;
    found(state.bank.cards.update(id, input).await?, "card")
}

pub async fn delete_card(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<StatusCode, JsonApiError> {
    match state.bank.cards.delete(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::not_found("card not found")),
    }
}

/// Cards without their transaction history.
pub async fn cards_by_owner(
    State(state): State<ServerState>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<CreditCardDto>>, JsonApiError> {
    non_empty(state.bank.cards.get_card_dtos_by_owner_id(&owner_id).await?, "cards")
}

pub async fn list_transactions(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    non_empty(state.bank.card_transactions.get_dtos_by_parent_id(id).await?, "transactions")
}

pub async fn add_transaction(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<CardTransaction>,
) -> Result<Json<CardTransaction>, JsonApiError> {
    validate_details(&input.details)?;
    found(state.bank.card_transactions.save(input, id).await?, "card")
}

pub async fn last_transactions(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(q): Query<LastQuery>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    let window = q.window()?;
    non_empty(state.bank.card_transactions.get_last_dtos(id, window).await?, "transactions")
}

pub async fn transactions_in_range(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(q): Query<DateRangeQuery>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    let (start, end) = q.bounds()?;
    non_empty(state.bank.card_transactions.get_dtos_by_parent_id_and_date_range(id, start, end).await?, "transactions")
}

pub async fn transactions_by_type(
    State(state): State<ServerState>,
    Path((id, kind)): Path<(i64, String)>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    non_empty(state.bank.card_transactions.get_dtos_by_parent_id_and_type(id, &kind).await?, "transactions")
}
