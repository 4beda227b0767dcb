//! Implements the struct that holds the state of the statement service.

use crate::{backend::BackendClient, pagination::PaginationConfig};

/// The state of the statement service.
///
/// Every field is cheap to clone and none of them is mutable: the service
/// is stateless per request, so concurrent handlers share nothing but
/// configuration and the backend client's connection pool.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The client for the upstream ledger backend.
    pub backend: BackendClient,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    /// Statement day bounds are evaluated in this timezone.
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name; it is
    /// validated per request so a misconfigured name renders an error page
    /// instead of crashing the server.
    pub fn new(
        backend: BackendClient,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Self {
        Self {
            backend,
            local_timezone: local_timezone.to_owned(),
            pagination_config,
        }
    }
}
