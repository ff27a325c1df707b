mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use std::sync::Arc;

use common::{body, spawn_app, test_config, TestServer, UnreachableStore};
use contentdeck_api::database::RowCounts;
use contentdeck_api::error::GENERIC_FAILURE;

#[tokio::test]
async fn register_creates_user_workspace_and_welcome_credits() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.register("Ada Lovelace", "Ada@Example.com", "correct horse").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = body(res).await?;
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["name"], "Ada Lovelace");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["workspace"]["name"], "Ada Lovelace's Workspace");
    assert!(body["workspace"]["id"].is_string());

    assert_eq!(
        server.store.row_counts().await,
        RowCounts {
            users: 1,
            credit_transactions: 1,
            workspaces: 1,
            workspace_members: 1,
        }
    );
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_new_rows() -> Result<()> {
    let server = TestServer::start().await?;
    server.register("Ada", "ada@example.com", "12345678").await?;
    let before = server.store.row_counts().await;

    let res = server.register("Someone Else", "ADA@example.com", "87654321").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(res).await?["message"], "User with this email already exists");
    assert_eq!(server.store.row_counts().await, before);
    Ok(())
}

#[tokio::test]
async fn short_password_is_reported_even_with_other_bad_fields() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.register("", "not-an-email", "short").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = body(res).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["password"], "Password must be at least 8 characters");
    assert!(body["field_errors"]["email"].is_string());
    assert_eq!(server.store.row_counts().await, RowCounts::default());
    Ok(())
}

#[tokio::test]
async fn missing_fields_and_malformed_json_are_bad_requests() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({"email": "ada@example.com"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(res).await?["field_errors"]["name"], "Name is required");

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(res).await?["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn disabled_registration_is_forbidden() -> Result<()> {
    let mut config = test_config();
    config.registration.enabled = false;
    let server = TestServer::start_with(config).await?;

    let res = server.register("Ada", "ada@example.com", "12345678").await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(res).await?["message"], "Registration is disabled");
    assert_eq!(server.store.row_counts().await.users, 0);
    Ok(())
}

#[tokio::test]
async fn configured_starting_credits_land_in_the_ledger() -> Result<()> {
    let mut config = test_config();
    config.registration.starting_credits = 120;
    let server = TestServer::start_with(config).await?;

    let res = server.register("Grace", "grace@example.com", "12345678").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.login("grace@example.com", "12345678").await?;
    let cookie = common::session_cookie(&res).expect("session cookie");

    let credits = body(server.get("/api/credits/transactions", Some(&cookie)).await?).await?;
    assert_eq!(credits["data"]["balance"], 120);
    assert_eq!(credits["data"]["transactions"][0]["amount"], 120);
    assert_eq!(credits["data"]["transactions"][0]["balance_after"], 120);
    assert_eq!(credits["data"]["transactions"][0]["type"], "REWARD");
    Ok(())
}

#[tokio::test]
async fn long_passwords_and_names_are_accepted() -> Result<()> {
    let server = TestServer::start().await?;
    let password = "p".repeat(73);
    let name = "N".repeat(150);

    let res = server.register(&name, "long@example.com", &password).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.login("long@example.com", &password).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn store_outage_is_a_generic_server_error() -> Result<()> {
    let (base_url, client) = spawn_app(test_config(), Arc::new(UnreachableStore)).await?;

    let res = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({"name": "Ada", "email": "ada@example.com", "password": "correct horse"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body(res).await?;
    assert_eq!(body["message"], GENERIC_FAILURE);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert!(!body.to_string().contains("connection reset"));

    // Only the health check reports the outage as 503
    let res = client.get(format!("{base_url}/health")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
