/// Timestamp helpers
///
/// PostgreSQL stores `TIMESTAMPTZ` with microsecond precision, so every
/// timestamp the application writes is truncated to microseconds up front.
/// That keeps values read back from the database equal to the ones held in
/// memory, whichever store backend is in use.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Last value handed out by [`now`], in microseconds since the epoch
static LAST_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current time at microsecond precision
///
/// Strictly increasing within the process, so records created back to back
/// never share a `created_at`.
pub fn now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_micros();
    let previous = LAST_MICROS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(wall.max(last.saturating_add(1)))
        })
        .unwrap_or(wall);
    let micros = wall.max(previous.saturating_add(1));

    DateTime::from_timestamp_micros(micros).unwrap_or_else(|| Utc::now().trunc_subsecs(6))
}

/// Next modification time for a record last modified at `previous`
///
/// Always strictly later than `previous`, even when the wall clock has not
/// moved (or has moved backwards) since the last write.
pub fn next_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous.trunc_subsecs(6) + Duration::microseconds(1);
    now().max(floor)
}
