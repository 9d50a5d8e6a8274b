//! HTTP binding for the hosted record store.
//!
//! Speaks the store service's PostgREST-style REST API using [`reqwest`]:
//! filters become `column=eq.value` query pairs, writes ask for
//! `return=representation` so the stored rows come back, and non-2xx
//! responses are decoded into the service's structured `{code, message}`
//! error body when one is present.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::filter::{Filter, Predicate, Query};
use crate::store::{RecordStore, Row};

/// Connection settings for the hosted record store.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Base URL of the store service, without the `/rest/v1` suffix.
    pub url: String,
    /// Publishable API key sent with every request.
    pub api_key: String,
    /// Elevated service key for server-side maintenance calls; only used
    /// by [`RestStore::service_client`].
    pub service_key: Option<String>,
}

impl RestStoreConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var             | Default                  |
    /// |---------------------|--------------------------|
    /// | `STORE_URL`         | `http://localhost:54321` |
    /// | `STORE_API_KEY`     | (empty)                  |
    /// | `STORE_SERVICE_KEY` | unset                    |
    pub fn from_env() -> Self {
        let url = std::env::var("STORE_URL").unwrap_or_else(|_| "http://localhost:54321".into());
        let api_key = std::env::var("STORE_API_KEY").unwrap_or_default();
        let service_key = std::env::var("STORE_SERVICE_KEY").ok();
        Self {
            url,
            api_key,
            service_key,
        }
    }
}

/// A [`RecordStore`] over the store service's REST API.
pub struct RestStore {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl RestStore {
    /// Client authenticated with the publishable API key.
    pub fn new(config: &RestStoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            key: config.api_key.clone(),
        }
    }

    /// Client authenticated with the elevated service key, bypassing
    /// row-level policies. `None` when no service key is configured.
    pub fn service_client(config: &RestStoreConfig) -> Option<Self> {
        let key = config.service_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            key,
        })
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{table}", self.url))
            .header("apikey", self.key.as_str())
            .bearer_auth(self.key.as_str())
    }

    /// Return the response unchanged on success, or decode the service's
    /// error body on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        match serde_json::from_str::<ServiceErrorBody>(&body) {
            Ok(parsed) if !parsed.code.is_empty() || !parsed.message.is_empty() => {
                Err(StoreError::Service {
                    code: parsed.code,
                    message: parsed.message,
                })
            }
            _ => Err(StoreError::Service {
                code: status.as_u16().to_string(),
                message: body,
            }),
        }
    }

    async fn parse_rows(response: reqwest::Response) -> Result<Vec<Row>, StoreError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Error body the store service returns alongside non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Render a select as query parameters.
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(&query.filter));
    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// Render filter predicates as `column=op.value` query parameters.
fn filter_params(filter: &Filter) -> Vec<(String, String)> {
    filter
        .predicates()
        .iter()
        .map(|predicate| match predicate {
            Predicate::Eq(column, value) => (column.clone(), format!("eq.{}", literal(value))),
            Predicate::ILike(column, value) => (column.clone(), format!("ilike.{value}")),
        })
        .collect()
}

/// Render a JSON value as a filter literal. Strings go in bare; the
/// service parses booleans and numbers from their JSON form.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select(&self, table: &str, query: Query) -> Result<Vec<Row>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, table)
            .query(&query_params(&query))
            .send()
            .await?;
        Self::parse_rows(response).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        Self::parse_rows(response).await
    }

    async fn update(&self, table: &str, patch: Row, filter: Filter) -> Result<Vec<Row>, StoreError> {
        let response = self
            .request(reqwest::Method::PATCH, table)
            .query(&filter_params(&filter))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        Self::parse_rows(response).await
    }

    async fn delete(&self, table: &str, filter: Filter) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::DELETE, table)
            .query(&filter_params(&filter))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
