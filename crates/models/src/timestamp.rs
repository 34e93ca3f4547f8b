//! `createdAt` wire format: RFC 3339, UTC, millisecond precision, `Z` suffix.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::Serializer;

/// Current time rounded up to the next whole millisecond, so the value
/// survives the wire format and is never earlier than the moment of the call.
pub fn now() -> DateTime<Utc> {
    ceil_millis(Utc::now())
}

fn ceil_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = dt.trunc_subsecs(3);
    if truncated < dt { truncated + Duration::milliseconds(1) } else { truncated }
}

pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(dt))
}
