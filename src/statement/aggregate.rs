//! Statement aggregation: ordering, filtering and summary reduction.
//!
//! The aggregation is a pure, synchronous transformation. Records are
//! sorted once after they arrive from the backend, filtering preserves that
//! order, and the summary is recomputed from scratch on every call; nothing
//! here owns state between invocations.

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

use super::{classify::EntryKind, criteria::StatementFilter, record::TransactionRecord};

/// Derived totals for a filtered statement.
///
/// Every field is always populated; an empty statement has an all-zero
/// summary. Totals accumulate at full f64 precision, display rounding
/// happens at the presentation layer only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementSummary {
    /// How many entries passed the filter.
    pub transaction_count: u64,
    /// How many entries classified as credit given.
    pub credit_count: u64,
    /// Sum of credit-given amounts.
    pub credit_total: f64,
    /// How many entries classified as payment received.
    pub payment_count: u64,
    /// Sum of payment-received amounts.
    pub payment_total: f64,
    /// Total units across all line items, missing quantities counting as one.
    pub items_purchased_total: f64,
    /// `payment_total - credit_total`. Negative means the customer owes the
    /// shop.
    pub net_balance: f64,
}

/// A filtered, chronologically ordered statement and its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// The entries that passed the filter, newest first.
    pub entries: Vec<TransactionRecord>,
    /// The derived totals over `entries`.
    pub summary: StatementSummary,
}

/// Sort records newest-first.
///
/// The sort is stable: entries on the same instant keep their backend
/// order. Records whose date cannot be parsed sort after all dated records,
/// also keeping their relative order, so repeated loads always produce the
/// same sequence.
pub fn sort_records(records: Vec<TransactionRecord>) -> Vec<TransactionRecord> {
    let mut keyed: Vec<(Option<OffsetDateTime>, TransactionRecord)> = records
        .into_iter()
        .map(|record| (record.timestamp(), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

/// Produce the filtered statement and its summary for `records`.
///
/// `records` must already be sorted by [sort_records]; filtering preserves
/// the order. The input is not mutated and the returned entries are fresh
/// copies. An empty input, a filter nothing matches, or an inverted date
/// range all yield an empty statement with a zeroed summary rather than an
/// error.
pub fn build_statement(
    records: &[TransactionRecord],
    filter: &StatementFilter,
    local_offset: UtcOffset,
) -> Statement {
    let entries: Vec<TransactionRecord> = records
        .iter()
        .filter(|record| filter.matches(record, local_offset))
        .cloned()
        .collect();

    let summary = summarize(&entries);

    Statement { entries, summary }
}

fn summarize(entries: &[TransactionRecord]) -> StatementSummary {
    let mut summary = StatementSummary::default();

    for entry in entries {
        summary.transaction_count += 1;

        match entry.kind() {
            EntryKind::CreditGiven => {
                summary.credit_count += 1;
                summary.credit_total += entry.amount;
            }
            EntryKind::PaymentReceived => {
                summary.payment_count += 1;
                summary.payment_total += entry.amount;
            }
        }

        summary.items_purchased_total += entry.item_quantity_total();
    }

    summary.net_balance = summary.payment_total - summary.credit_total;

    summary
}
