use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as epoch milliseconds, the unit every message
/// timestamp and token expiry uses on the wire.
pub(crate) fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
