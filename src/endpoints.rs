//! The API endpoint URIs.

/// The root route which redirects to the ledger view.
pub const ROOT: &str = "/";
/// The page displaying the ledger statement.
pub const LEDGER_VIEW: &str = "/ledger";
/// The CSV download of the current statement.
pub const LEDGER_EXPORT: &str = "/ledger/export";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The JSON statement endpoint: the filtered entries plus their summary.
pub const STATEMENT_API: &str = "/api/statement";
