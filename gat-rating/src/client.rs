//! HTTP rating provider
//!
//! Issues `GET <base_url>/monitoring/rating/` with the canonical query pairs
//! and the locale as an `Accept-Language` header.

use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use std::time::Duration;

use gat_common::config::TomlConfig;

use crate::filter::CanonicalRequest;
use crate::model::PageEnvelope;
use crate::provider::{ProviderError, RatingProvider};

const RATING_PATH: &str = "/monitoring/rating/";
const USER_AGENT: &str = concat!("gat-rating/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed [`RatingProvider`]
pub struct HttpRatingProvider {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpRatingProvider {
    /// Create a client for the provider rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RATING_PATH),
        })
    }

    pub fn from_config(config: &TomlConfig) -> Result<Self, ProviderError> {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RatingProvider for HttpRatingProvider {
    async fn fetch_page(&self, request: &CanonicalRequest) -> Result<PageEnvelope, ProviderError> {
        tracing::debug!(
            url = %self.endpoint,
            query = %request.query_string(),
            locale = %request.locale,
            "Querying rating provider"
        );

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&request.query_pairs())
            .header(ACCEPT_LANGUAGE, request.locale.as_str())
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let page: PageEnvelope =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        tracing::info!(
            page = request.page,
            records = page.data.len(),
            has_next = page.meta.pagination.as_ref().map(|p| p.has_next).unwrap_or(false),
            "Rating page received"
        );

        Ok(page)
    }
}
