use std::future::Future;
use std::sync::Arc;

use super::error::SourceError;
use super::parsing::parse_records;
use super::types::LocationSample;

/// Anything that can hand the tracker a fresh batch of location records.
///
/// Implementations do not need to enforce a timeout; the tracker bounds
/// every call itself.
pub trait LocationSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<LocationSample>, SourceError>> + Send;
}

impl<T: LocationSource> LocationSource for Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<Vec<LocationSample>, SourceError>> + Send {
        self.as_ref().fetch()
    }
}

/// Records endpoint reached over HTTP, e.g.
/// `http://localhost:8090/api/collections/locations/records`.
#[derive(Debug, Clone)]
pub struct HttpLocationSource {
    client: reqwest::Client,
    url: String,
}

impl HttpLocationSource {
    pub fn new(url: impl Into<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SourceError::Unreachable(format!("http client init failed: {e}")))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl LocationSource for HttpLocationSource {
    async fn fetch(&self) -> Result<Vec<LocationSample>, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Rejected(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Unreachable(e.to_string()))?;
        let samples = parse_records(&body)?;
        log::debug!("Fetched {} location records from {}", samples.len(), self.url);
        Ok(samples)
    }
}
