use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use models::{
    account::{validate_account_number, validate_owner_id},
    money::validate_money,
};
use service::domain::{Account, AccountTransaction, TransactionDto};

use super::query::{found, non_empty, validate_details, DateRangeQuery, LastQuery};
use crate::{errors::JsonApiError, state::ServerState};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/accounts", post(create_account))
        .route("/api/accounts/:id", get(get_account).put(update_account).delete(delete_account))
        .route("/api/accounts/owner/:owner_id", get(accounts_by_owner))
        .route("/api/accounts/:id/transactions", get(list_transactions).post(add_transaction))
        .route("/api/accounts/:id/transactions/last", get(last_transactions))
        .route("/api/accounts/:id/transactions/daterange", get(transactions_in_range))
        .route("/api/accounts/:id/transactions/type/:type", get(transactions_by_type))
        .route("/api/account-transactions/:id", get(get_transaction).delete(delete_transaction))
}

fn validate_account(account: &Account) -> Result<(), JsonApiError> {
    validate_account_number(&account.account_number)?;
    validate_owner_id(&account.owner_id)?;
    validate_money("balance", account.balance)?;
    for entry in &account.transactions {
        validate_details(&entry.details)?;
    }
    Ok(())
}

pub async fn create_account(State(state): State<ServerState>, Json(input): Json<Account>) -> Result<Json<Account>, JsonApiError> {
    validate_account(&input)?;
    Ok(Json(state.bank.accounts.save(input).await?))
}

pub async fn get_account(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<Account>, JsonApiError> {
    found(state.bank.accounts.get_by_id(id).await?, "account")
}

/// Full replace: omitted transactions are dropped.
pub async fn update_account(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<Account>,
) -> Result<Json<Account>, JsonApiError> {
    validate_account(&input)?;
    found(state.bank.accounts.update(id, input).await?, "account")
}

pub async fn delete_account(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<StatusCode, JsonApiError> {
    match state.bank.accounts.delete(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::not_found("account not found")),
    }
}

pub async fn accounts_by_owner(
    State(state): State<ServerState>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<Account>>, JsonApiError> {
    non_empty(state.bank.accounts.get_by_owner_id(&owner_id).await?, "accounts")
}

pub async fn list_transactions(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    non_empty(state.bank.account_transactions.get_dtos_by_parent_id(id).await?, "transactions")
}

pub async fn add_transaction(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<AccountTransaction>,
) -> Result<Json<AccountTransaction>, JsonApiError> {
    validate_details(&input.details)?;
    found(state.bank.account_transactions.save(input, id).await?, "account")
}

pub async fn last_transactions(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(q): Query<LastQuery>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    let window = q.window()?;
    non_empty(state.bank.account_transactions.get_last_dtos(id, window).await?, "transactions")
}

pub async fn transactions_in_range(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(q): Query<DateRangeQuery>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    let (start, end) = q.bounds()?;
    non_empty(
        state.bank.account_transactions.get_dtos_by_parent_id_and_date_range(id, start, end).await?,
        "transactions",
    )
}

pub async fn transactions_by_type(
    State(state): State<ServerState>,
    Path((id, kind)): Path<(i64, String)>,
) -> Result<Json<Vec<TransactionDto>>, JsonApiError> {
    non_empty(state.bank.account_transactions.get_dtos_by_parent_id_and_type(id, &kind).await?, "transactions")
}

pub async fn get_transaction(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionDto>, JsonApiError> {
    found(state.bank.account_transactions.get_dto_by_id(id).await?, "transaction")
}

pub async fn delete_transaction(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<StatusCode, JsonApiError> {
    match state.bank.account_transactions.delete(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::not_found("transaction not found")),
    }
}
