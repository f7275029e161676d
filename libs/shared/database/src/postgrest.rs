use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("row not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("data API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("data API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode row: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the PostgREST-style data API fronting the relational
/// store. One instance is created at startup and shared by every cell.
#[derive(Clone)]
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_api_url.clone(),
            api_key: config.database_api_key.clone(),
        }
    }

    fn headers(&self, representation: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if representation {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        headers
    }

    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        representation: bool,
    ) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Data API request: {} {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(representation));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Data API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                // PostgREST reports unique index violations (23505) as 409
                409 => DbError::UniqueViolation(error_text),
                404 => DbError::NotFound,
                _ => DbError::Api {
                    status: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let rows = response.json::<Vec<T>>().await?;
        Ok(rows)
    }

    /// Fetch all rows matching the filter expression in `path`.
    pub async fn select<T>(&self, path: &str) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, None, false).await
    }

    /// Fetch at most one row; `None` when the filter matches nothing.
    pub async fn select_one<T>(&self, path: &str) -> Result<Option<T>, DbError>
    where
        T: DeserializeOwned,
    {
        let rows = self.select(path).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a row and return the stored representation.
    pub async fn insert<T>(&self, path: &str, body: Value) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.request(Method::POST, path, Some(body), true).await?;
        rows.into_iter().next().ok_or(DbError::NotFound)
    }

    /// Patch rows matching the filter in `path`, returning the updated rows.
    pub async fn update<T>(&self, path: &str, body: Value) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body), true).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
