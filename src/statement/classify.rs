//! The single classification rule that maps raw backend type tags to
//! semantic entry kinds.
//!
//! The upstream backend has accumulated inconsistent type tags over time:
//! the lowercase tags follow the shop's ledger convention, while the legacy
//! uppercase tags come from an older code path with its own casing. All tag
//! comparisons in the crate go through [classify_type_tag] so the mapping
//! lives in exactly one place.

/// The semantic kind of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Goods or services extended on credit, increasing the customer's dues.
    CreditGiven,
    /// Money received against dues, reducing what the customer owes.
    PaymentReceived,
}

impl EntryKind {
    /// A human-readable label for table rows and export columns.
    pub fn label(self) -> &'static str {
        match self {
            Self::CreditGiven => "Credit given",
            Self::PaymentReceived => "Payment received",
        }
    }
}

/// Map a raw type tag to its semantic entry kind.
///
/// The mapping is case-sensitive and reproduces the backend's observed
/// behavior exactly, including the legacy uppercase tags:
///
/// | tag | kind |
/// |---|---|
/// | `credit`, `debit`, `DEBIT` | [EntryKind::CreditGiven] |
/// | `payment`, `CREDIT` | [EntryKind::PaymentReceived] |
///
/// Tags not in the table fall back to [EntryKind::PaymentReceived], matching
/// the observed fallback. Do not "fix" the uppercase tags here without
/// confirming the sign convention with the backend owners first.
pub fn classify_type_tag(raw_tag: &str) -> EntryKind {
    match raw_tag {
        "credit" | "debit" | "DEBIT" => EntryKind::CreditGiven,
        "payment" | "CREDIT" => EntryKind::PaymentReceived,
        _ => EntryKind::PaymentReceived,
    }
}
