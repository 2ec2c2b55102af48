//! Thin pass-through client for the Realtor search API

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::shared::errors::InfraError;

pub const REALTOR_HOST: &str = "realtor16.p.rapidapi.com";

#[derive(Debug, Clone)]
pub struct RealtorConfig {
    /// RapidAPI key; falls back to `RAPIDAPI_KEY` when unset
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RealtorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: format!("https://{}", REALTOR_HOST),
            timeout_secs: 15,
        }
    }
}

pub struct RealtorClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl RealtorClient {
    pub fn new(config: &RealtorConfig) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("RAPIDAPI_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// `GET /search?location=..[&query=..]`
    pub async fn search_properties(
        &self,
        location: &str,
        query: Option<&str>,
    ) -> Result<Value, InfraError> {
        let mut params = vec![("location", location)];
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("query", q));
        }
        self.get("/search", &params).await
    }

    /// `GET /agents/search?location=..[&name=..]`
    pub async fn search_agents(
        &self,
        location: &str,
        name: Option<&str>,
    ) -> Result<Value, InfraError> {
        let mut params = vec![("location", location)];
        if let Some(n) = name.filter(|n| !n.is_empty()) {
            params.push(("name", n));
        }
        self.get("/agents/search", &params).await
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, InfraError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| InfraError::Config("RAPIDAPI_KEY not configured".to_string()))?;

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Calling Realtor API");

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", REALTOR_HOST)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Realtor API returned an error");
            return Err(InfraError::UpstreamStatus(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}
