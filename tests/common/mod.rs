#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, redirect, Client, Response};
use serde_json::{json, Value};
use uuid::Uuid;

use contentdeck_api::config::AppConfig;
use contentdeck_api::database::models::{CreditTransaction, UserRecord, WorkspaceMembership};
use contentdeck_api::database::{AccountStore, CreatedAccount, MemoryStore, NewAccount, StoreError};
use contentdeck_api::{create_router, AppState};

/// The real router served in-process on an ephemeral port, backed by a
/// fresh in-memory store. Each test gets its own server and store.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: Client,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = 4;
    config
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(test_config()).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let (base_url, client) = spawn_app(config, store.clone()).await?;
        Ok(Self { base_url, store, client })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({"name": name, "email": email, "password": password}))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?)
    }

    /// Register and sign in, returning the `name=value` session cookie pair
    pub async fn signed_in(&self, name: &str, email: &str) -> Result<String> {
        let password = "correct horse battery";
        let res = self.register(name, email, password).await?;
        anyhow::ensure!(res.status() == 201, "registration failed: {}", res.status());

        let res = self.login(email, password).await?;
        anyhow::ensure!(res.status() == 200, "login failed: {}", res.status());
        session_cookie(&res).context("login response carried no session cookie")
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<Response> {
        let mut req = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        Ok(req.send().await?)
    }
}

/// Serve the router over any store, returning its base URL and a client
pub async fn spawn_app(config: AppConfig, store: Arc<dyn AccountStore>) -> Result<(String, Client)> {
    let state = AppState::new(config, store).context("failed to build app state")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let base_url = format!("http://{}", listener.local_addr()?);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    // Redirects stay visible so gate decisions can be asserted
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .context("failed to build http client")?;

    Ok((base_url, client))
}

/// Store that behaves as if the database connection dropped
pub struct UnreachableStore;

#[async_trait]
impl AccountStore for UnreachableStore {
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }
    async fn find_user_by_id(&self, _id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }
    async fn create_account(&self, _account: NewAccount) -> Result<CreatedAccount, StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }
    async fn list_credit_transactions(&self, _user_id: Uuid) -> Result<Vec<CreditTransaction>, StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }
    async fn list_workspaces(&self, _user_id: Uuid) -> Result<Vec<WorkspaceMembership>, StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }
    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }
}

/// `name=value` part of the first Set-Cookie header
pub fn session_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(|pair| pair.trim().to_string())
}

pub fn location(res: &Response) -> Option<String> {
    res.headers()
        .get(header::LOCATION)?
        .to_str()
        .ok()
        .map(str::to_string)
}

pub async fn body(res: Response) -> Result<Value> {
    Ok(res.json::<Value>().await?)
}
