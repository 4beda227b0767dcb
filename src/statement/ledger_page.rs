//! Defines the route handler for the ledger statement page.

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use time::{Date, UtcOffset};

use crate::{
    AppState, Error, endpoints,
    backend::BackendClient,
    pagination::{PaginationConfig, build_page_indicators, page_count, page_slice},
    timezone::get_local_offset,
};

use super::{
    aggregate::{Statement, build_statement, sort_records},
    classify::EntryKind,
    criteria::{KindFilter, StatementFilter, parse_day},
    record::TransactionRecord,
    view::{LedgerViewModel, format_date_label, format_quantity, ledger_view},
};

/// The state needed for the ledger page.
#[derive(Debug, Clone)]
pub struct LedgerViewState {
    /// The client for the upstream ledger backend.
    backend: BackendClient,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    local_timezone: String,
    /// The config that controls how to display pages of data.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for LedgerViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The ledger page query parameters as they arrive on the wire.
///
/// Dates are accepted leniently (an unparseable value behaves like an absent
/// one); missing paging parameters trigger a redirect to the canonical URL.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    /// Inclusive lower day bound, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Inclusive upper day bound, `YYYY-MM-DD`.
    pub to: Option<String>,
    /// The entry-kind restriction.
    pub kind: Option<KindFilter>,
    /// Customer or shop id to restrict the statement to.
    pub party: Option<String>,
    /// The 1-based page number.
    pub page: Option<u64>,
    /// Entries per page.
    pub page_size: Option<u64>,
}

/// URL encoding helper for the ledger page query params.
///
/// Built from already-normalized values, so every link on the page points at
/// a canonical URL.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LedgerQueryParams {
    pub(crate) from: Option<Date>,
    pub(crate) to: Option<Date>,
    pub(crate) kind: KindFilter,
    pub(crate) party: Option<String>,
    pub(crate) page: u64,
    pub(crate) page_size: u64,
}

impl LedgerQueryParams {
    pub(crate) fn with_page(&self, page: u64) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// A new page size restarts from page 1, so the slice can never start
    /// beyond the end of the filtered statement.
    pub(crate) fn with_page_size(&self, page_size: u64) -> Self {
        Self {
            page: 1,
            page_size,
            ..self.clone()
        }
    }

    pub(crate) fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if let Some(from) = self.from {
            pairs.push(("from", from.to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("to", to.to_string()));
        }
        pairs.push(("kind", self.kind.as_query_value().to_owned()));
        if let Some(party) = &self.party {
            pairs.push(("party", party.clone()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("page_size", self.page_size.to_string()));

        serde_urlencoded::to_string(&pairs).unwrap_or_default()
    }

    pub(crate) fn to_url(&self, route: &str) -> String {
        format!("{route}?{}", self.to_query_string())
    }
}

/// One rendered row of the statement table.
pub(crate) struct LedgerRow {
    pub(crate) date_label: String,
    pub(crate) kind: EntryKind,
    pub(crate) amount: f64,
    pub(crate) items_label: String,
    pub(crate) note: Option<String>,
}

impl LedgerRow {
    pub(crate) fn from_record(record: &TransactionRecord, local_offset: UtcOffset) -> Self {
        let date_label = match record.timestamp() {
            Some(at) => format_date_label(at.to_offset(local_offset).date()),
            // Undated records render their raw value so the bad data is
            // visible instead of silently hidden.
            None => record.date.clone(),
        };

        let items_label = record
            .line_items
            .iter()
            .map(|item| match item.quantity {
                Some(quantity) => format!("{} ×{}", item.name, format_quantity(quantity)),
                None => item.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            date_label,
            kind: record.kind(),
            amount: record.amount,
            items_label,
            note: record.note.clone(),
        }
    }
}

enum QueryDecision {
    Redirect(String),
    Normalized(NormalizedQuery),
}

/// Validated query options after defaults are applied.
struct NormalizedQuery {
    filter: StatementFilter,
    params: LedgerQueryParams,
}

/// Render the ledger statement for the current filter and page.
pub async fn get_ledger_page(
    State(state): State<LedgerViewState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Response, Error> {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezone(state.local_timezone.clone()));
    };

    let normalized = match normalize_query(query, &state.pagination_config) {
        QueryDecision::Normalized(normalized) => normalized,
        QueryDecision::Redirect(redirect_url) => {
            return Ok(Redirect::to(&redirect_url).into_response());
        }
    };

    let records = state
        .backend
        .fetch_transactions()
        .await
        .inspect_err(|error| tracing::error!("could not fetch transactions: {error}"))?;
    let records = sort_records(records);

    let statement = build_statement(&records, &normalized.filter, local_offset);
    let model = build_ledger_view_model(
        statement,
        normalized.params,
        local_offset,
        &state.pagination_config,
    );

    Ok(ledger_view(model).into_response())
}

fn normalize_query(query: LedgerQuery, config: &PaginationConfig) -> QueryDecision {
    let has_missing_params =
        query.kind.is_none() || query.page.is_none() || query.page_size.is_none();
    let needs_clamping = query.page == Some(0) || query.page_size == Some(0);

    let from = query.from.as_deref().and_then(parse_day);
    let to = query.to.as_deref().and_then(parse_day);
    let kind = query.kind.unwrap_or_default();
    let party = query.party.filter(|party| !party.is_empty());
    let page = query.page.unwrap_or(config.default_page).max(1);
    let page_size = query.page_size.unwrap_or(config.default_page_size).max(1);

    let params = LedgerQueryParams {
        from,
        to,
        kind,
        party: party.clone(),
        page,
        page_size,
    };

    if has_missing_params || needs_clamping {
        return QueryDecision::Redirect(params.to_url(endpoints::LEDGER_VIEW));
    }

    QueryDecision::Normalized(NormalizedQuery {
        filter: StatementFilter {
            from_date: from,
            to_date: to,
            kind,
            party_id: party,
        },
        params,
    })
}

fn build_ledger_view_model(
    statement: Statement,
    params: LedgerQueryParams,
    local_offset: UtcOffset,
    config: &PaginationConfig,
) -> LedgerViewModel {
    let total_entries = statement.entries.len();
    let page_count = page_count(total_entries, params.page_size);

    let rows = page_slice(&statement.entries, params.page, params.page_size)
        .iter()
        .map(|entry| LedgerRow::from_record(entry, local_offset))
        .collect();

    let indicators = build_page_indicators(params.page, page_count, config.max_pages);

    LedgerViewModel {
        summary: statement.summary,
        rows,
        total_entries,
        indicators,
        params,
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        extract::{Query, State},
        http::StatusCode,
        response::Response,
        routing::get,
    };
    use scraper::{ElementRef, Html, Selector};
    use serde_json::{Value, json};
    use time::macros::date;

    use super::{
        LedgerQuery, LedgerQueryParams, LedgerViewState, QueryDecision, get_ledger_page,
        normalize_query,
    };
    use crate::{
        backend::BackendClient, endpoints, pagination::PaginationConfig,
        statement::criteria::KindFilter,
    };

    fn full_query() -> LedgerQuery {
        LedgerQuery {
            from: None,
            to: None,
            kind: Some(KindFilter::All),
            party: None,
            page: Some(1),
            page_size: Some(20),
        }
    }

    fn sample_records() -> Value {
        json!([
            {"id": "A", "date": "2024-01-05", "type": "credit", "amount": 100.0,
             "products": [{"name": "Rice", "quantity": 2}]},
            {"id": "B", "date": "2024-01-10", "type": "debit", "amount": 150.0},
            {"id": "C", "date": "2024-01-15", "type": "CREDIT", "amount": 50.0,
             "notes": "paid at counter"}
        ])
    }

    async fn serve_stub(records: Value) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind stub listener");
        let addr = listener.local_addr().expect("Could not get stub address");

        let router = Router::new().route(
            "/api/transactions",
            get(move || {
                let records = records.clone();
                async move { Json(records) }
            }),
        );

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub server");
        });

        format!("http://{addr}")
    }

    async fn ledger_state(records: Value) -> LedgerViewState {
        let base_url = serve_stub(records).await;

        LedgerViewState {
            backend: BackendClient::new(&base_url).unwrap(),
            local_timezone: "Etc/UTC".to_owned(),
            pagination_config: PaginationConfig::default(),
        }
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    fn entry_rows(html: &Html) -> Vec<ElementRef<'_>> {
        let row_selector = Selector::parse("tbody tr[data-entry-row='true']").unwrap();
        html.select(&row_selector).collect()
    }

    fn summary_value(html: &Html, key: &str) -> String {
        let selector = Selector::parse(&format!("[data-summary-value='{key}']")).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("No summary value for {key}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn ledger_page_displays_statement_newest_first() {
        let state = ledger_state(sample_records()).await;

        let response = get_ledger_page(State(state), Query(full_query()))
            .await
            .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let rows = entry_rows(&html);
        assert_eq!(rows.len(), 3, "want 3 entry rows, got {}", rows.len());

        let first_row_text = rows[0].text().collect::<String>();
        assert!(
            first_row_text.contains("15 Jan 2024"),
            "newest entry should render first, got: {first_row_text}"
        );

        assert_eq!(summary_value(&html, "credit-total"), "₹250.00");
        assert_eq!(summary_value(&html, "payment-total"), "₹50.00");
        assert_eq!(summary_value(&html, "net-balance"), "-₹200.00");
        assert_eq!(summary_value(&html, "items-total"), "2");
    }

    #[tokio::test]
    async fn ledger_page_filters_by_kind() {
        let state = ledger_state(sample_records()).await;
        let query = LedgerQuery {
            kind: Some(KindFilter::PaymentReceived),
            ..full_query()
        };

        let response = get_ledger_page(State(state), Query(query)).await.unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let rows = entry_rows(&html);
        assert_eq!(rows.len(), 1);
        let row_text = rows[0].text().collect::<String>();
        assert!(row_text.contains("Payment received"), "got: {row_text}");
    }

    #[tokio::test]
    async fn ledger_page_paginates_the_statement() {
        let state = ledger_state(sample_records()).await;
        let query = LedgerQuery {
            page: Some(2),
            page_size: Some(2),
            ..full_query()
        };

        let response = get_ledger_page(State(state), Query(query)).await.unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        // Three entries at two per page leaves one entry on page two.
        let rows = entry_rows(&html);
        assert_eq!(rows.len(), 1);

        let nav_selector = Selector::parse("nav.pagination [aria-current='page']").unwrap();
        let current = html
            .select(&nav_selector)
            .next()
            .expect("No current page indicator found");
        assert_eq!(current.text().collect::<String>().trim(), "2");
    }

    #[tokio::test]
    async fn ledger_page_shows_empty_state_when_nothing_matches() {
        let state = ledger_state(sample_records()).await;
        let query = LedgerQuery {
            party: Some("nobody".to_owned()),
            ..full_query()
        };

        let response = get_ledger_page(State(state), Query(query)).await.unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        assert!(entry_rows(&html).is_empty());

        let empty_selector = Selector::parse("tbody td[data-empty-state='true']").unwrap();
        let empty_cell = html
            .select(&empty_selector)
            .next()
            .expect("No empty-state cell found");
        assert_eq!(empty_cell.value().attr("colspan"), Some("5"));
    }

    #[tokio::test]
    async fn ledger_page_redirects_to_canonical_url() {
        let state = ledger_state(sample_records()).await;

        let response = get_ledger_page(State(state), Query(LedgerQuery::default()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get("location")
            .expect("Missing redirect location header")
            .to_str()
            .unwrap();
        assert_eq!(
            location,
            format!("{}?kind=all&page=1&page_size=20", endpoints::LEDGER_VIEW)
        );
    }

    #[test]
    fn normalize_query_redirects_when_paging_params_missing() {
        let query = LedgerQuery {
            from: Some("2024-01-01".to_owned()),
            kind: Some(KindFilter::CreditGiven),
            ..Default::default()
        };

        let decision = normalize_query(query, &PaginationConfig::default());

        let QueryDecision::Redirect(redirect_url) = decision else {
            panic!("Expected redirect for missing paging params");
        };
        assert_eq!(
            redirect_url,
            format!(
                "{}?from=2024-01-01&kind=credit-given&page=1&page_size=20",
                endpoints::LEDGER_VIEW
            )
        );
    }

    #[test]
    fn normalize_query_clamps_zero_paging_values() {
        let query = LedgerQuery {
            kind: Some(KindFilter::All),
            page: Some(0),
            page_size: Some(0),
            ..Default::default()
        };

        let decision = normalize_query(query, &PaginationConfig::default());

        let QueryDecision::Redirect(redirect_url) = decision else {
            panic!("Expected redirect for zero paging params");
        };
        assert!(
            redirect_url.contains("page=1") && redirect_url.contains("page_size=20"),
            "got: {redirect_url}"
        );
    }

    #[test]
    fn normalize_query_accepts_complete_queries() {
        let query = LedgerQuery {
            from: Some("2024-01-01".to_owned()),
            to: Some("2024-01-31".to_owned()),
            party: Some("c1".to_owned()),
            ..full_query()
        };

        let decision = normalize_query(query, &PaginationConfig::default());

        let QueryDecision::Normalized(normalized) = decision else {
            panic!("Expected complete query to pass normalization");
        };
        assert_eq!(normalized.filter.from_date, Some(date!(2024 - 01 - 01)));
        assert_eq!(normalized.filter.to_date, Some(date!(2024 - 01 - 31)));
        assert_eq!(normalized.filter.party_id.as_deref(), Some("c1"));
        assert_eq!(normalized.params.page, 1);
    }

    #[test]
    fn changing_page_size_resets_the_page() {
        let params = LedgerQueryParams {
            from: None,
            to: None,
            kind: KindFilter::All,
            party: None,
            page: 4,
            page_size: 20,
        };

        let resized = params.with_page_size(50);

        assert_eq!(resized.page, 1);
        assert_eq!(resized.page_size, 50);
        // Moving between pages keeps the page size.
        assert_eq!(params.with_page(2).page_size, 20);
    }

    #[test]
    fn query_params_url_escapes_the_party() {
        let params = LedgerQueryParams {
            from: None,
            to: None,
            kind: KindFilter::All,
            party: Some("shop 7".to_owned()),
            page: 1,
            page_size: 20,
        };

        let query_string = params.to_query_string();

        assert!(
            query_string.contains("party=shop+7"),
            "got: {query_string}"
        );
    }
}
