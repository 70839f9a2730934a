#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as epoch millis, matching the wire unit.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_millis() as i64
}

/// Poll until `condition` holds, yielding to the runtime between checks.
///
/// Gives up after ~100 s of (possibly virtual) time so a broken condition
/// fails the test instead of hanging it.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
