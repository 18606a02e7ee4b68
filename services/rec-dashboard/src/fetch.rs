//!
//! src/fetch.rs  Andrew Belles  Oct 15th, 2026
//!
//! Client for the recommendation api. One call per user action, no
//! retries; failures are classified and handed back to the caller
//!

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ApiConfig, HttpConfig};
use crate::errors::DashboardError;
use crate::normalize::parse_query_result;
use crate::types::{QueryResult, SongQuery};

pub const DEFAULT_NOT_FOUND: &str = "No track found";

/// Anything able to answer a song query. The drill-down state only
/// talks to the network through this.
#[async_trait]
pub trait RecommendationSource {
    async fn recommend(&self, query: &SongQuery) -> Result<QueryResult, DashboardError>;

    /// Status probe, failures resolve to a Health value rather than an error
    async fn health(&self) -> Health;
}

/// Passive status of the api, never gates any action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Connected,
    Degraded(u16),
    Disconnected
}

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
}

pub fn base_client(http: &HttpConfig) -> Result<Client, DashboardError> {
    let mut h = header::HeaderMap::new();
    h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    client_helper(http)
        .default_headers(h)
        .build()
        .map_err(|e| DashboardError::Config(format!("build client: {e}")))
}

#[derive(Clone, Debug)]
pub struct RecommendClient {
    pub http: Client,
    pub base: Url,
    recommend_url: Url,
    health_timeout: Duration
}

impl RecommendClient {
    pub fn new(http_config: &HttpConfig, api: &ApiConfig) -> Result<Self, DashboardError> {
        let http = base_client(http_config)?;
        let recommend_url = api.base_url.join("recommend")
            .map_err(|e| DashboardError::Config(format!("recommend url: {e}")))?;

        Ok( Self {
            http,
            base: api.base_url.clone(),
            recommend_url,
            health_timeout: http_config.health_timeout
        })
    }

    /// POST /recommend
    pub fn recommend_request(&self, query: &SongQuery) -> RequestBuilder {
        self.http.post(self.recommend_url.clone()).json(query)
    }

    /// GET /
    pub fn health_request(&self) -> RequestBuilder {
        self.http.get(self.base.clone()).timeout(self.health_timeout)
    }

    async fn classify(&self, resp: reqwest::Response) -> Result<QueryResult, DashboardError> {
        match resp.status() {
            StatusCode::OK => {
                let text = resp.text().await?;
                let body: Value = serde_json::from_str(&text)?;
                parse_query_result(&body)
            },
            StatusCode::NOT_FOUND => {
                let detail = resp.json::<Value>().await
                    .ok()
                    .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
                    .unwrap_or_else(|| DEFAULT_NOT_FOUND.to_string());
                Err(DashboardError::NotFound(detail))
            },
            StatusCode::SERVICE_UNAVAILABLE => Err(DashboardError::ServiceUnavailable),
            status => Err(DashboardError::UnexpectedStatus(status.as_u16()))
        }
    }
}

#[async_trait]
impl RecommendationSource for RecommendClient {
    async fn recommend(&self, query: &SongQuery) -> Result<QueryResult, DashboardError> {
        let started = Instant::now();
        let outcome = match self.recommend_request(query).send().await {
            Ok(resp) => self.classify(resp).await,
            Err(e) => Err(e.into())
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(result) => info!(
                song = %query.song_name,
                artist = %query.artist_name,
                found = %result.song_found.name,
                recommendations = result.recommendations.len(),
                elapsed_ms,
                "recommend.ok"
            ),
            Err(e) => warn!(
                song = %query.song_name,
                artist = %query.artist_name,
                kind = ?e.kind(),
                error = %e,
                elapsed_ms,
                "recommend.failed"
            )
        }
        outcome
    }

    async fn health(&self) -> Health {
        match self.health_request().send().await {
            Ok(resp) if resp.status() == StatusCode::OK => Health::Connected,
            Ok(resp) => {
                debug!(status = %resp.status(), "health.degraded");
                Health::Degraded(resp.status().as_u16())
            },
            Err(e) => {
                debug!(error = %e, "health.unreachable");
                Health::Disconnected
            }
        }
    }
}
