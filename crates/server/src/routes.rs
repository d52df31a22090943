use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::{Greeting, Health};

use crate::state::ServerState;

pub mod accounts;
pub mod auth;
pub mod cards;
pub mod messages;
pub mod query;
pub mod transactions;

pub async fn health() -> Json<Health> { Json(Health::ok()) }

pub async fn hello() -> Json<Greeting> { Json(Greeting::default()) }

/// Build the full application router: public routes plus the bearer-protected API.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/hello", get(hello))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/validate", get(auth::validate))
        .route("/api/auth/logout", post(auth::logout));

    let api = Router::new()
        .merge(accounts::router())
        .merge(cards::router())
        .merge(transactions::router())
        .merge(messages::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
