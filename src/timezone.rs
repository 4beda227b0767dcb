//! Resolves canonical timezone names to UTC offsets for statement day
//! bounds.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// The current UTC offset for `canonical_timezone`, e.g. "Asia/Kolkata".
///
/// Returns `None` for names the timezone database does not know; callers
/// turn that into [crate::Error::InvalidTimezone].
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}
