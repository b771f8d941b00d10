#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::{json, Value};

use starmap_api::app::app;
use starmap_api::config::AppConfig;
use starmap_api::database::MemoryStore;
use starmap_api::services::{SpaceImage, SpaceImageError, SpaceImageSource, SystemClock};
use starmap_api::state::AppState;

/// Stands in for the upstream picture API
pub struct StaticImageSource;

#[async_trait]
impl SpaceImageSource for StaticImageSource {
    async fn fetch(&self, date: NaiveDate) -> Result<SpaceImage, SpaceImageError> {
        Ok(SpaceImage {
            date,
            title: "Pillars of Creation".to_string(),
            explanation: "Columns of gas in the Eagle Nebula".to_string(),
            url: "https://example.com/pillars.jpg".to_string(),
            hdurl: None,
            media_type: "image".to_string(),
            copyright: None,
        })
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start the real router on an unused port, backed by a fresh memory store
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.port = port;
        config.api.max_page_size = 50;

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            config,
            store.clone(),
            Arc::new(StaticImageSource),
            Arc::new(SystemClock),
        )?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register and log in; returns (user id, access token)
    pub async fn signup(&self, name: &str) -> Result<(i64, String)> {
        let email = format!("{}@example.com", name);
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "username": name, "password": "hunter2" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body: Value = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": "hunter2" }))
            .send()
            .await?
            .json()
            .await?;
        let id = body["data"]["user"]["id"].as_i64().context("missing user id")?;
        let token = body["data"]["access_token"]
            .as_str()
            .context("missing access token")?
            .to_string();
        Ok((id, token))
    }

    pub async fn create_map(&self, token: &str, name: &str, is_public: bool) -> Result<i64> {
        let body: Value = self
            .client
            .post(self.url("/api/maps"))
            .bearer_auth(token)
            .json(&json!({ "name": name, "is_public": is_public }))
            .send()
            .await?
            .json()
            .await?;
        body["data"]["id"].as_i64().context("missing map id")
    }

    pub async fn create_object(&self, token: &str, payload: Value) -> Result<i64> {
        let res = self
            .client
            .post(self.url("/api/celestial-objects"))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["id"].as_i64().context("missing object id")
    }
}

pub fn sol(is_public: bool) -> Value {
    json!({
        "type": "star",
        "name": "sol",
        "description": "Our star",
        "mass": 2e30,
        "temperature": 5778.0,
        "radius": 696340.0,
        "brightness": 1.0,
        "star_type": "YellowDwarf",
        "is_public": is_public
    })
}

pub fn terra(is_public: bool) -> Value {
    json!({
        "type": "planet",
        "name": "terra",
        "description": "Home",
        "mass": 5.97e24,
        "temperature": 21.0,
        "radius": 6371.0,
        "has_water": true,
        "has_life": true,
        "planet_type": "Terrestrial",
        "is_public": is_public
    })
}
