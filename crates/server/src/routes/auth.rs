use axum::{
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use service::auth::{
    domain::{AuthResponse, LoginInput},
    errors::AuthError,
};

use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

/// Owner id resolved from the bearer token, available to protected handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthOwner(pub String);

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Response {
    match state.auth.login(input) {
        Ok(session) => {
            let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
            cookie.set_path("/");
            cookie.set_http_only(true);
            cookie.set_secure(false);
            cookie.set_same_site(SameSite::Lax);
            (jar.add(cookie), Json(AuthResponse::from(session))).into_response()
        }
        Err(e) => {
            tracing::warn!(code = e.code(), "login rejected");
            (StatusCode::UNAUTHORIZED, Json(AuthResponse::rejected())).into_response()
        }
    }
}

pub async fn validate(State(state): State<ServerState>, Query(q): Query<TokenQuery>) -> (StatusCode, Json<ValidateOutput>) {
    match state.auth.validate_token(&q.token) {
        Some(owner_id) => (StatusCode::OK, Json(ValidateOutput { valid: true, owner_id: Some(owner_id) })),
        None => (StatusCode::UNAUTHORIZED, Json(ValidateOutput { valid: false, owner_id: None })),
    }
}

/// Always 200, also for unknown tokens.
pub async fn logout(State(state): State<ServerState>, jar: CookieJar, Query(q): Query<TokenQuery>) -> (CookieJar, StatusCode) {
    state.auth.invalidate_token(&q.token);
    (jar.remove(Cookie::from(AUTH_COOKIE)), StatusCode::OK)
}

fn auth_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::MissingToken => StatusCode::BAD_REQUEST,
        AuthError::Unauthorized | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
    }
}

/// Reads `Authorization: Bearer <token>`, falling back to the `auth_token` cookie.
/// Missing token is 400, unknown or revoked token is 401.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();

    let token = match req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) => t.trim().to_string(),
            None => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(StatusCode::UNAUTHORIZED);
            }
        },
        None => CookieJar::from_headers(req.headers())
            .get(AUTH_COOKIE)
            .map(|c| c.value().to_string())
            .unwrap_or_default(),
    };

    match state.auth.require_owner(&token) {
        Ok(owner_id) => {
            req.extensions_mut().insert(AuthOwner(owner_id));
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, code = e.code(), err = %e, "bearer check failed");
            Err(auth_status(&e))
        }
    }
}
