//! ShopMunim is a statement service for a shop credit ledger.
//!
//! Shops extend goods on credit to customers and later receive payments
//! against the dues. The upstream REST backend is the system of record;
//! this service fetches the raw transaction records wholesale per request,
//! runs a pure statement engine over them in memory (classify, filter,
//! sort, summarize, paginate) and serves the result as a rendered ledger
//! page, a JSON statement API and a CSV export.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod backend;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
pub mod pagination;
mod routing;
pub mod statement;
mod timezone;

pub use app_state::AppState;
pub use backend::BackendClient;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The configured timezone name is not a canonical timezone.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The ledger backend could not be reached.
    ///
    /// There is no retry; a page refresh fetches again.
    #[error("could not reach the ledger backend: {0}")]
    UpstreamRequest(String),

    /// The ledger backend answered with a non-success HTTP status.
    #[error("the ledger backend returned HTTP status {0}")]
    UpstreamStatus(u16),

    /// The ledger backend's response body was not the expected JSON array
    /// of transaction records.
    #[error("could not decode the ledger backend response: {0}")]
    UpstreamDecode(String),

    /// Writing the CSV export failed.
    #[error("could not write the CSV export: {0}")]
    CsvExport(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Error::CsvExport(error.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezone(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::UpstreamRequest(detail) | Error::UpstreamDecode(detail) => {
                tracing::error!("The ledger backend failed: {detail}");
                InternalServerError {
                    description: "Ledger Backend Unavailable",
                    fix: "The upstream ledger backend did not answer correctly. \
                        Try again in a moment.",
                }
                .into_response()
            }
            Error::UpstreamStatus(status) => {
                tracing::error!("The ledger backend returned HTTP status {status}");
                InternalServerError {
                    description: "Ledger Backend Unavailable",
                    fix: "The upstream ledger backend did not answer correctly. \
                        Try again in a moment.",
                }
                .into_response()
            }
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                InternalServerError::default().into_response()
            }
        }
    }
}
