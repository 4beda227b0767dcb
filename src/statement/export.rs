//! CSV export of the filtered statement.
//!
//! The export consumes exactly what any renderer gets from the aggregator: a
//! stable, fully-resolved entry list and a summary with every field
//! populated. Heavier formats (PDF, XLSX) are produced by external tooling
//! from the same statement endpoint.

use axum::{
    extract::{FromRef, Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{AppState, Error, backend::BackendClient, timezone::get_local_offset};

use super::{
    aggregate::{Statement, build_statement, sort_records},
    criteria::StatementQuery,
    record::TransactionRecord,
    view::format_quantity,
};

/// The state needed for the export endpoint.
#[derive(Debug, Clone)]
pub struct ExportState {
    backend: BackendClient,
    local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Download the filtered statement as a CSV attachment.
pub async fn get_ledger_export(
    State(state): State<ExportState>,
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
    let csv_bytes = write_statement_csv(&statement)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ledger-statement.csv\"",
            ),
        ],
        csv_bytes,
    )
        .into_response())
}

fn write_statement_csv(statement: &Statement) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["Date", "Entry", "Amount", "Items", "Note"])?;

    for entry in &statement.entries {
        let amount = format!("{:.2}", entry.amount);
        let items = items_field(entry);
        let note = entry.note.as_deref().unwrap_or("");

        writer.write_record([
            entry.date.as_str(),
            entry.kind().label(),
            amount.as_str(),
            items.as_str(),
            note,
        ])?;
    }

    let summary = &statement.summary;
    let summary_rows = [
        (
            "Entries".to_owned(),
            summary.transaction_count.to_string(),
            String::new(),
        ),
        (
            "Credit given".to_owned(),
            summary.credit_count.to_string(),
            format!("{:.2}", summary.credit_total),
        ),
        (
            "Payments received".to_owned(),
            summary.payment_count.to_string(),
            format!("{:.2}", summary.payment_total),
        ),
        (
            "Items purchased".to_owned(),
            format_quantity(summary.items_purchased_total),
            String::new(),
        ),
        (
            "Net balance".to_owned(),
            String::new(),
            format!("{:.2}", summary.net_balance),
        ),
    ];

    writer.write_record(["", "", "", "", ""])?;
    for (label, count, amount) in summary_rows {
        writer.write_record([label.as_str(), count.as_str(), amount.as_str(), "", ""])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvExport(error.to_string()))?;

    Ok(bytes)
}

fn items_field(entry: &TransactionRecord) -> String {
    entry
        .line_items
        .iter()
        .map(|item| match item.quantity {
            Some(quantity) => format!("{} x{}", item.name, format_quantity(quantity)),
            None => item.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use time::UtcOffset;

    use super::write_statement_csv;
    use crate::statement::{
        aggregate::{build_statement, sort_records},
        criteria::StatementFilter,
        record::{LineItem, TransactionRecord},
    };

    fn record(id: &str, date: &str, type_tag: &str, amount: f64) -> TransactionRecord {
        TransactionRecord {
            id: id.to_owned(),
            date: date.to_owned(),
            type_tag: type_tag.to_owned(),
            amount,
            line_items: Vec::new(),
            note: None,
            customer_id: None,
            shop_id: None,
        }
    }

    fn sample_statement() -> crate::statement::aggregate::Statement {
        let mut credit = record("A", "2024-01-05", "credit", 100.0);
        credit.line_items = vec![LineItem {
            name: "Rice".to_owned(),
            unit_price: Some(50.0),
            quantity: Some(2.0),
            line_subtotal: Some(100.0),
        }];
        credit.note = Some("weekly ration".to_owned());
        let payment = record("C", "2024-01-15", "CREDIT", 50.0);

        let records = sort_records(vec![credit, payment]);
        build_statement(&records, &StatementFilter::default(), UtcOffset::UTC)
    }

    #[test]
    fn csv_lists_entries_then_summary() {
        let statement = sample_statement();

        let bytes = write_statement_csv(&statement).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Entry,Amount,Items,Note");
        assert_eq!(
            lines[1],
            "2024-01-15,Payment received,50.00,,"
        );
        assert_eq!(
            lines[2],
            "2024-01-05,Credit given,100.00,Rice x2,weekly ration"
        );

        assert!(lines.contains(&"Credit given,1,100.00,,"));
        assert!(lines.contains(&"Payments received,1,50.00,,"));
        assert!(lines.contains(&"Net balance,,-50.00,,"));
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let mut entry = record("A", "2024-01-05", "credit", 10.0);
        entry.note = Some("rice, dal".to_owned());
        let records = sort_records(vec![entry]);
        let statement = build_statement(&records, &StatementFilter::default(), UtcOffset::UTC);

        let bytes = write_statement_csv(&statement).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(
            text.contains("\"rice, dal\""),
            "note with comma should be quoted, got: {text}"
        );
    }

    #[test]
    fn empty_statement_still_writes_header_and_summary() {
        let statement = build_statement(&[], &StatementFilter::default(), UtcOffset::UTC);

        let bytes = write_statement_csv(&statement).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Entry,Amount,Items,Note");
        assert!(lines.contains(&"Entries,0,,,"));
        assert!(lines.contains(&"Net balance,,0.00,,"));
    }
}
