use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::{routes, ServerState};
use service::auth::domain::User;

fn build_app() -> Router {
    let state = ServerState::in_memory(User::new("alice", "correct", "alice-owner-id"));
    routes::build_router(state, tower_http::cors::CorsLayer::very_permissive())
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

fn get(uri: &str, token: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?)
}

fn with_json(method: &str, uri: &str, token: &str, body: &Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

fn delete(uri: &str, token: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?)
}

async fn login(app: &Router) -> anyhow::Result<String> {
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": "alice", "password": "correct"}))?))?;
    let (status, body) = send(app, req).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

fn account_body(number: &str, owner: &str) -> Value {
    json!({
        "account_number": number,
        "account_type": "CHECKING",
        "balance": "100.00",
        "owner_id": owner,
        "creation_date": "2024-01-01T00:00:00"
    })
}

fn card_body(owner: &str) -> Value {
    json!({
        "last_four_digits": "4242",
        "card_name": "Visa Gold",
        "valid_until": "**/27",
        "card_type": "VISA",
        "status": true,
        "limit": "5000.00",
        "balance": "0.00",
        "owner_id": owner
    })
}

fn tx_body(date: &str, amount: &str, kind: &str) -> Value {
    json!({"transaction_date": date, "amount": amount, "description": "coffee", "type": kind})
}

#[tokio::test]
async fn public_routes_need_no_token() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = send(&app, Request::builder().uri("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Request::builder().uri("/api/hello").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap_or_default().starts_with("Hello"));
    Ok(())
}

#[tokio::test]
async fn bearer_check_statuses() -> anyhow::Result<()> {
    let app = build_app();

    let missing = Request::builder().uri("/api/accounts/1").body(Body::empty())?;
    assert_eq!(send(&app, missing).await?.0, StatusCode::BAD_REQUEST);

    assert_eq!(send(&app, get("/api/accounts/1", "tok-123")?).await?.0, StatusCode::UNAUTHORIZED);

    let basic = Request::builder()
        .uri("/api/accounts/1")
        .header(header::AUTHORIZATION, "Basic abc")
        .body(Body::empty())?;
    assert_eq!(send(&app, basic).await?.0, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_validate_logout_cycle() -> anyhow::Result<()> {
    let app = build_app();

    let wrong = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": "alice", "password": "wrong-password"}))?))?;
    let (status, body) = send(&app, wrong).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["authenticated"], false);

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": "alice", "password": "correct"}))?))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    assert!(cookie.starts_with("auth_token="));
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["owner_id"], "alice-owner-id");
    assert_eq!(body["authenticated"], true);
    let token = body["token"].as_str().unwrap_or_default().to_string();

    let validate = Request::builder().uri(format!("/api/auth/validate?token={token}")).body(Body::empty())?;
    assert_eq!(send(&app, validate).await?.0, StatusCode::OK);

    // cookie works in place of the header
    let via_cookie = Request::builder()
        .uri("/api/accounts/owner/alice-owner-id")
        .header(header::COOKIE, format!("auth_token={token}"))
        .body(Body::empty())?;
    assert_eq!(send(&app, via_cookie).await?.0, StatusCode::NOT_FOUND);

    let logout = Request::builder().method("POST").uri(format!("/api/auth/logout?token={token}")).body(Body::empty())?;
    assert_eq!(send(&app, logout).await?.0, StatusCode::OK);
    let again = Request::builder().method("POST").uri(format!("/api/auth/logout?token={token}")).body(Body::empty())?;
    assert_eq!(send(&app, again).await?.0, StatusCode::OK);

    let validate = Request::builder().uri(format!("/api/auth/validate?token={token}")).body(Body::empty())?;
    assert_eq!(send(&app, validate).await?.0, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, get("/api/accounts/1", &token)?).await?.0, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn account_and_transactions_flow() -> anyhow::Result<()> {
    let app = build_app();
    let token = login(&app).await?;

    let (status, acc) = send(&app, with_json("POST", "/api/accounts", &token, &account_body("ACC-1", "u1"))?).await?;
    assert_eq!(status, StatusCode::OK);
    let id = acc["id"].as_i64().unwrap_or_default();
    assert!(id > 0);

    let (status, _) = send(&app, with_json("POST", "/api/accounts", &token, &account_body("ACC-1", "u2"))?).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let tx_uri = format!("/api/accounts/{id}/transactions");
    assert_eq!(send(&app, get(&tx_uri, &token)?).await?.0, StatusCode::NOT_FOUND);

    let (status, tx) = send(&app, with_json("POST", &tx_uri, &token, &tx_body("2024-03-05T10:00:00", "12.50", "CHARGE"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tx["account_id"], id);
    send(&app, with_json("POST", &tx_uri, &token, &tx_body("2024-03-07T09:00:00", "40.00", "CREDIT"))?).await?;

    let (status, list) = send(&app, get(&tx_uri, &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(2));
    assert_eq!(list[0]["type"], "CHARGE");
    assert_eq!(list[0]["amount"], "12.50");

    let (status, last) = send(&app, get(&format!("{tx_uri}/last?count=1"), &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(last.as_array().map(Vec::len), Some(1));
    assert_eq!(last[0]["date"], "2024-03-07T09:00:00");
    assert_eq!(send(&app, get(&format!("{tx_uri}/last?count=0"), &token)?).await?.0, StatusCode::BAD_REQUEST);

    let (status, ranged) = send(&app, get(&format!("{tx_uri}/daterange?start_date=2024-03-05&end_date=2024-03-05"), &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ranged.as_array().map(Vec::len), Some(1));
    let inverted = get(&format!("{tx_uri}/daterange?start_date=2024-03-07&end_date=2024-03-05"), &token)?;
    assert_eq!(send(&app, inverted).await?.0, StatusCode::BAD_REQUEST);

    let (status, credits) = send(&app, get(&format!("{tx_uri}/type/CREDIT"), &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(credits.as_array().map(Vec::len), Some(1));

    let (status, owned) = send(&app, get("/api/accounts/owner/u1", &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(owned[0]["transactions"].as_array().map(Vec::len), Some(2));
    assert_eq!(send(&app, get("/api/accounts/owner/nonexistent", &token)?).await?.0, StatusCode::NOT_FOUND);

    let tx_id = tx["id"].as_i64().unwrap_or_default();
    let single = format!("/api/account-transactions/{tx_id}");
    assert_eq!(send(&app, get(&single, &token)?).await?.0, StatusCode::OK);
    assert_eq!(send(&app, delete(&single, &token)?).await?.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, delete(&single, &token)?).await?.0, StatusCode::NOT_FOUND);

    let orphan = with_json("POST", "/api/accounts/9999/transactions", &token, &tx_body("2024-03-05T10:00:00", "1.00", "CHARGE"))?;
    assert_eq!(send(&app, orphan).await?.0, StatusCode::NOT_FOUND);

    assert_eq!(send(&app, delete(&format!("/api/accounts/{id}"), &token)?).await?.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, get(&format!("/api/accounts/{id}"), &token)?).await?.0, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_of_missing_account_is_404() -> anyhow::Result<()> {
    let app = build_app();
    let token = login(&app).await?;
    let req = with_json("PUT", "/api/accounts/41", &token, &account_body("ACC-41", "u1"))?;
    assert_eq!(send(&app, req).await?.0, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn card_routes_and_owner_projection() -> anyhow::Result<()> {
    let app = build_app();
    let token = login(&app).await?;

    let (status, card) = send(&app, with_json("POST", "/api/cards", &token, &card_body("u7"))?).await?;
    assert_eq!(status, StatusCode::OK);
    let id = card["id"].as_i64().unwrap_or_default();

    let uri = format!("/api/transactions/card/{id}");
    let (status, tx) = send(&app, with_json("POST", &uri, &token, &tx_body("2024-04-01T12:00:00", "9.99", "CHARGE"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tx["credit_card_id"], id);

    let (status, dto) = send(&app, get(&format!("/api/cards/{id}/dto"), &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(dto.get("transactions").is_none());

    let (status, owned) = send(&app, get("/api/cards/owner/u7", &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(owned[0].get("transactions").is_none());

    let (status, all) = send(&app, get("/api/transactions/owner/u7", &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(1));

    let (status, last) = send(&app, get(&format!("/api/cards/{id}/transactions/last"), &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(last[0]["description"], "coffee");

    let tx_id = tx["id"].as_i64().unwrap_or_default();
    assert_eq!(send(&app, delete(&format!("/api/transactions/{tx_id}"), &token)?).await?.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, get(&uri, &token)?).await?.0, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn boundary_validation_rejects_bad_input() -> anyhow::Result<()> {
    let app = build_app();
    let token = login(&app).await?;

    let mut bad_card = card_body("u1");
    bad_card["last_four_digits"] = json!("42");
    assert_eq!(send(&app, with_json("POST", "/api/cards", &token, &bad_card)?).await?.0, StatusCode::BAD_REQUEST);

    let (_, acc) = send(&app, with_json("POST", "/api/accounts", &token, &account_body("ACC-9", "u1"))?).await?;
    let id = acc["id"].as_i64().unwrap_or_default();
    let fractional = tx_body("2024-03-05T10:00:00", "1.005", "CHARGE");
    let req = with_json("POST", &format!("/api/accounts/{id}/transactions"), &token, &fractional)?;
    assert_eq!(send(&app, req).await?.0, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn message_crud() -> anyhow::Result<()> {
    let app = build_app();
    let token = login(&app).await?;

    let (status, msg) = send(&app, with_json("POST", "/api/messages", &token, &json!({"content": "hi"}))?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(msg["timestamp"].is_string());
    let id = msg["id"].as_i64().unwrap_or_default();

    let (status, list) = send(&app, get("/api/messages", &token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, updated) = send(&app, with_json("PUT", &format!("/api/messages/{id}"), &token, &json!({"content": "edited"}))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "edited");
    let missing = with_json("PUT", "/api/messages/404", &token, &json!({"content": "x"}))?;
    assert_eq!(send(&app, missing).await?.0, StatusCode::NOT_FOUND);

    assert_eq!(send(&app, delete(&format!("/api/messages/{id}"), &token)?).await?.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, delete(&format!("/api/messages/{id}"), &token)?).await?.0, StatusCode::NOT_FOUND);
    Ok(())
}
