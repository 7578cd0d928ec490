use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

/// Hands out meal ids derived from the creation instant (epoch millis).
///
/// Two meals created within the same millisecond would collide, so each id is
/// bumped past the last one issued. Ids are therefore strictly increasing
/// within a process, until the counter reaches `i64::MAX`; then it restarts
/// from the clock.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never issue anything at or below `floor` (the largest id already stored).
    pub fn observe(&self, floor: i64) {
        self.last.fetch_max(floor, Ordering::SeqCst);
    }

    pub fn next_id(&self) -> String {
        let now = now_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(step(now, last))
            })
            .unwrap_or_else(|last| last);
        step(now, prev).to_string()
    }
}

fn step(now: i64, last: i64) -> i64 {
    match last.checked_add(1) {
        Some(next) => now.max(next),
        None => now,
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
