//! The JSON statement endpoint.
//!
//! This is the aggregator in its service form: stateless per call, safe to
//! invoke concurrently, returning the fully-resolved filtered entries plus a
//! summary with every numeric field populated. Export renderers and other
//! clients consume this shape directly.

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{AppState, Error, backend::BackendClient, timezone::get_local_offset};

use super::{
    aggregate::{StatementSummary, build_statement, sort_records},
    criteria::StatementQuery,
    record::TransactionRecord,
};

/// The state needed for the statement endpoint.
#[derive(Debug, Clone)]
pub struct StatementApiState {
    backend: BackendClient,
    local_timezone: String,
}

impl FromRef<AppState> for StatementApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The response body of the statement endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    transactions: Vec<TransactionRecord>,
    summary: StatementSummary,
}

/// Return the filtered statement as JSON.
pub async fn get_statement(
    State(state): State<StatementApiState>,
    Query(query): Query<StatementQuery>,
) -> Result<Response, Error> {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezone(state.local_timezone.clone()));
    };

    let records = state
        .backend
        .fetch_transactions()
        .await
        .inspect_err(|error| tracing::error!("could not fetch transactions: {error}"))?;
    let records = sort_records(records);

    let statement = build_statement(&records, &query.to_filter(), local_offset);

    Ok(Json(StatementResponse {
        transactions: statement.entries,
        summary: statement.summary,
    })
    .into_response())
}
