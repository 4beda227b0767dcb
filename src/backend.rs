//! HTTP client for the upstream ledger backend.
//!
//! The backend is the system of record; this service fetches the raw
//! transaction records wholesale per request and derives everything else in
//! memory. There is no caching and no retry: a page refresh simply fetches
//! again.

use std::time::Duration;

use crate::{Error, statement::TransactionRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A client for the upstream REST backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`, e.g.
    /// `http://localhost:8000`. A trailing slash is tolerated.
    ///
    /// # Errors
    /// Returns [Error::UpstreamRequest] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| Error::UpstreamRequest(error.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetch every transaction record from the backend.
    ///
    /// The records come back in backend order; callers sort them with
    /// [crate::statement::sort_records] before aggregating.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::UpstreamRequest] if the backend cannot be reached,
    /// - [Error::UpstreamStatus] on a non-success HTTP status,
    /// - [Error::UpstreamDecode] if the response body is not the expected
    ///   JSON array.
    pub async fn fetch_transactions(&self) -> Result<Vec<TransactionRecord>, Error> {
        let url = format!("{}/api/transactions", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|error| Error::UpstreamRequest(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus(status.as_u16()));
        }

        response
            .json::<Vec<TransactionRecord>>()
            .await
            .map_err(|error| Error::UpstreamDecode(error.to_string()))
    }
}
