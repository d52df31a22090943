use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use service::domain::Message;

use super::query::found;
use crate::{errors::JsonApiError, state::ServerState};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/messages", get(list_messages).post(create_message))
        .route("/api/messages/:id", get(get_message).put(update_message).delete(delete_message))
}

fn validate_message(msg: &Message) -> Result<(), JsonApiError> {
    if msg.content.trim().is_empty() {
        return Err(JsonApiError::bad_request("content required"));
    }
    Ok(())
}

pub async fn list_messages(State(state): State<ServerState>) -> Result<Json<Vec<Message>>, JsonApiError> {
    Ok(Json(state.bank.messages.get_all().await?))
}

pub async fn get_message(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<Message>, JsonApiError> {
    found(state.bank.messages.get_by_id(id).await?, "message")
}

pub async fn create_message(
    State(state): State<ServerState>,
    Json(input): Json<Message>,
) -> Result<(StatusCode, Json<Message>), JsonApiError> {
    validate_message(&input)?;
    let saved = state.bank.messages.save(input).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_message(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<Message>,
) -> Result<Json<Message>, JsonApiError> {
    validate_message(&input)?;
    found(state.bank.messages.update(id, input).await?, "message")
}

pub async fn delete_message(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<StatusCode, JsonApiError> {
    match state.bank.messages.delete(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::not_found("message not found")),
    }
}
