//! Remote data provider seam

use async_trait::async_trait;
use thiserror::Error;

use crate::filter::CanonicalRequest;
use crate::model::PageEnvelope;

/// Rating provider errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Provider returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse response JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Source of result pages
///
/// Implementations must not retry; retries are always user-initiated.
#[async_trait]
pub trait RatingProvider: Send + Sync {
    async fn fetch_page(&self, request: &CanonicalRequest) -> Result<PageEnvelope, ProviderError>;
}
