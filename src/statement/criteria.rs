//! Filter criteria for ledger statements.
//!
//! A [StatementFilter] is an immutable description of a statement query:
//! an optional inclusive day range, an entry-kind restriction, and an
//! optional customer/shop equality filter. Matching is a pure predicate
//! with no I/O; every check passes when its criterion is absent and the
//! checks AND-combine.

use serde::Deserialize;
use time::{Date, Time, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use super::{classify::EntryKind, record::TransactionRecord};

/// Which entry kinds a statement should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KindFilter {
    /// Include both credit and payment entries.
    #[default]
    All,
    /// Only goods extended on credit.
    CreditGiven,
    /// Only payments received against dues.
    PaymentReceived,
}

impl KindFilter {
    /// The value used for this filter in query strings.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::CreditGiven => "credit-given",
            Self::PaymentReceived => "payment-received",
        }
    }

    /// The human-readable label shown in the filter controls.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All entries",
            Self::CreditGiven => "Credit given",
            Self::PaymentReceived => "Payments received",
        }
    }

    fn passes(self, kind: EntryKind) -> bool {
        match self {
            Self::All => true,
            Self::CreditGiven => kind == EntryKind::CreditGiven,
            Self::PaymentReceived => kind == EntryKind::PaymentReceived,
        }
    }
}

/// An immutable statement query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementFilter {
    /// Inclusive lower day bound, normalized to 00:00:00.000 local time.
    pub from_date: Option<Date>,
    /// Inclusive upper day bound, normalized to 23:59:59.999 local time.
    pub to_date: Option<Date>,
    /// The entry-kind restriction.
    pub kind: KindFilter,
    /// Equality filter against the record's customer or shop id.
    pub party_id: Option<String>,
}

// Upper day bounds normalize to the last millisecond of the calendar day.
fn end_of_day() -> Time {
    Time::from_hms_milli(23, 59, 59, 999).expect("valid end-of-day time")
}

impl StatementFilter {
    /// Whether `record` satisfies every criterion of this filter.
    ///
    /// Day bounds are evaluated in `local_offset`, the service's configured
    /// timezone. A record without a parseable date fails any date-bounded
    /// check. An inverted range (`from_date` after `to_date`) cannot match
    /// anything, which is the intended degenerate result rather than an
    /// error.
    pub fn matches(&self, record: &TransactionRecord, local_offset: UtcOffset) -> bool {
        let timestamp = record.timestamp();

        if let Some(from) = self.from_date {
            let lower = from.midnight().assume_offset(local_offset);
            match timestamp {
                Some(at) if at >= lower => {}
                _ => return false,
            }
        }

        if let Some(to) = self.to_date {
            let upper = to.with_time(end_of_day()).assume_offset(local_offset);
            match timestamp {
                Some(at) if at <= upper => {}
                _ => return false,
            }
        }

        if !self.kind.passes(record.kind()) {
            return false;
        }

        if let Some(party_id) = self.party_id.as_deref() {
            let is_customer = record.customer_id.as_deref() == Some(party_id);
            let is_shop = record.shop_id.as_deref() == Some(party_id);
            if !is_customer && !is_shop {
                return false;
            }
        }

        true
    }
}

/// The statement query parameters as they arrive on the wire.
///
/// Dates are accepted leniently: an empty or unparseable value behaves as if
/// the parameter were absent, so a half-filled filter form never turns into
/// a request error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementQuery {
    /// Inclusive lower day bound, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Inclusive upper day bound, `YYYY-MM-DD`.
    pub to: Option<String>,
    /// The entry-kind restriction.
    pub kind: Option<KindFilter>,
    /// Customer or shop id to restrict the statement to.
    pub party: Option<String>,
}

impl StatementQuery {
    /// The immutable filter described by these parameters.
    pub fn to_filter(&self) -> StatementFilter {
        StatementFilter {
            from_date: self.from.as_deref().and_then(parse_day),
            to_date: self.to.as_deref().and_then(parse_day),
            kind: self.kind.unwrap_or_default(),
            party_id: self.party.clone().filter(|party| !party.is_empty()),
        }
    }
}

const CALENDAR_DAY: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` query parameter, treating anything else as absent.
pub(crate) fn parse_day(raw: &str) -> Option<Date> {
    Date::parse(raw, CALENDAR_DAY).ok()
}
