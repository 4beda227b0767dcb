//! The raw ledger record model and its JSON ingestion rules.

use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

use super::classify::{EntryKind, classify_type_tag};

/// One line on an itemized credit entry.
///
/// Manual entries have no line items; itemized entries list the goods that
/// were taken on credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// The name of the product, e.g. "Rice".
    #[serde(default)]
    pub name: String,
    /// The per-unit price, when the backend supplies one.
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// How many units were taken. Older records omit this field.
    #[serde(default)]
    pub quantity: Option<f64>,
    /// The line subtotal as computed by the backend.
    #[serde(default)]
    pub line_subtotal: Option<f64>,
}

impl LineItem {
    /// The quantity for item totals. A missing quantity counts as one unit.
    pub fn quantity_or_one(&self) -> f64 {
        self.quantity.unwrap_or(1.0)
    }
}

/// One ledger entry between a customer and a shop, as delivered by the
/// upstream backend.
///
/// Ingestion tolerates the backend's field-name drift: the line-item list
/// arrives as either `products` or `items`, and the free-text note as either
/// `note` or `notes`. Both are normalized to one field here so the rest of
/// the crate never sees the aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Opaque unique identifier assigned by the backend.
    pub id: String,
    /// The raw ISO-8601 timestamp string, empty when the backend omitted
    /// it. Kept verbatim; use [TransactionRecord::timestamp] for
    /// comparisons.
    #[serde(default)]
    pub date: String,
    /// The raw type tag. Never compare this directly, classify it via
    /// [TransactionRecord::kind]; an absent tag takes the classification
    /// fallback.
    #[serde(rename = "type", default)]
    pub type_tag: String,
    /// The non-negative amount. The sign is implied by the entry kind.
    pub amount: f64,
    /// The itemized lines, empty for manual entries.
    #[serde(
        rename(serialize = "lineItems", deserialize = "products"),
        alias = "items",
        alias = "lineItems",
        default
    )]
    pub line_items: Vec<LineItem>,
    /// Optional free-text note.
    #[serde(alias = "notes", default)]
    pub note: Option<String>,
    /// The customer this entry belongs to.
    #[serde(alias = "counterpartyId", default)]
    pub customer_id: Option<String>,
    /// The shop this entry belongs to.
    #[serde(default)]
    pub shop_id: Option<String>,
}

impl TransactionRecord {
    /// The parsed timestamp, or `None` when the raw date string is
    /// unparseable. Undated records sort after all dated records and never
    /// match a date-bounded filter, but still count toward unbounded
    /// aggregation.
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        parse_timestamp(&self.date)
    }

    /// The semantic kind of this entry per the classification rule.
    pub fn kind(&self) -> EntryKind {
        classify_type_tag(&self.type_tag)
    }

    /// Total units across the line items, counting a missing quantity as one.
    pub fn item_quantity_total(&self) -> f64 {
        self.line_items
            .iter()
            .map(LineItem::quantity_or_one)
            .sum()
    }
}

const NAIVE_DATETIME: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const CALENDAR_DAY: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a backend date string.
///
/// Accepts full RFC 3339 timestamps, offset-less date-times (assumed UTC,
/// matching how the backend stores them), and bare calendar days (midnight
/// UTC). Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(timestamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(timestamp);
    }

    if let Ok(datetime) = PrimitiveDateTime::parse(raw, NAIVE_DATETIME) {
        return Some(datetime.assume_utc());
    }

    if let Ok(day) = Date::parse(raw, CALENDAR_DAY) {
        return Some(day.midnight().assume_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::{TransactionRecord, parse_timestamp};

    #[test]
    fn ingests_products_field() {
        let json = r#"{
            "id": "t1",
            "date": "2024-01-05",
            "type": "credit",
            "amount": 100.0,
            "products": [{"name": "Rice", "unitPrice": 50.0, "quantity": 2, "lineSubtotal": 100.0}],
            "note": "weekly ration",
            "customerId": "c9",
            "shopId": "s1"
        }"#;

        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.line_items.len(), 1);
        assert_eq!(record.line_items[0].name, "Rice");
        assert_eq!(record.line_items[0].quantity, Some(2.0));
        assert_eq!(record.note.as_deref(), Some("weekly ration"));
        assert_eq!(record.customer_id.as_deref(), Some("c9"));
    }

    #[test]
    fn ingests_items_and_notes_aliases() {
        let json = r#"{
            "id": "t2",
            "date": "2024-01-10",
            "type": "payment",
            "amount": 50.0,
            "items": [{"name": "Sugar"}],
            "notes": "part payment",
            "counterpartyId": "c9"
        }"#;

        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.line_items.len(), 1);
        assert_eq!(record.line_items[0].name, "Sugar");
        assert_eq!(record.note.as_deref(), Some("part payment"));
        assert_eq!(record.customer_id.as_deref(), Some("c9"));
        assert_eq!(record.shop_id, None);
    }

    #[test]
    fn ingests_minimal_record() {
        let json = r#"{"id": "t3", "date": "2024-02-01", "type": "debit", "amount": 150}"#;

        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        assert!(record.line_items.is_empty());
        assert_eq!(record.note, None);
        assert_eq!(record.item_quantity_total(), 0.0);
    }

    #[test]
    fn tolerates_a_missing_date_field() {
        let json = r#"{"id": "t3b", "type": "credit", "amount": 20}"#;

        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.date, "");
        assert_eq!(record.timestamp(), None);
    }

    #[test]
    fn missing_quantity_counts_as_one_unit() {
        let json = r#"{
            "id": "t4",
            "date": "2024-02-01",
            "type": "credit",
            "amount": 75.0,
            "products": [{"name": "Atta", "quantity": 3}, {"name": "Ghee"}]
        }"#;

        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.item_quantity_total(), 4.0);
    }

    #[test]
    fn serializes_line_items_under_canonical_name() {
        let json = r#"{"id": "t5", "date": "2024-02-01", "type": "credit", "amount": 10,
                       "items": [{"name": "Dal"}]}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        let out = serde_json::to_value(&record).unwrap();

        assert!(out.get("lineItems").is_some());
        assert!(out.get("products").is_none());
        assert!(out.get("items").is_none());
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        assert_eq!(
            parse_timestamp("2024-01-05T10:30:00Z"),
            Some(datetime!(2024-01-05 10:30:00 UTC))
        );
        assert_eq!(
            parse_timestamp("2024-01-05T10:30:00.250+05:30"),
            Some(datetime!(2024-01-05 10:30:00.250 +05:30))
        );
    }

    #[test]
    fn parses_offsetless_datetimes_as_utc() {
        assert_eq!(
            parse_timestamp("2024-01-05T10:30:00"),
            Some(datetime!(2024-01-05 10:30:00 UTC))
        );
    }

    #[test]
    fn parses_bare_days_as_utc_midnight() {
        assert_eq!(
            parse_timestamp("2024-01-05"),
            Some(datetime!(2024-01-05 00:00:00 UTC))
        );
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("05/01/2024"), None);
    }
}
