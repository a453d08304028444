// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Start of the UTC day containing `ts`. Works for instants before the epoch.
#[must_use]
pub fn utc_day_start(ts: i64) -> i64 {
    ts - ts.rem_euclid(SECONDS_PER_DAY)
}

#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Inclusive `[start, end]` range over the `createAt` column, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    #[serde(rename = "startTimestamp")]
    pub start: i64,
    #[serde(rename = "endTimestamp")]
    pub end: i64,
}

impl TimeWindow {
    /// From midnight UTC up to `now`.
    #[must_use]
    pub fn today(now: i64) -> Self {
        Self {
            start: utc_day_start(now),
            end: now,
        }
    }

    /// The whole UTC day containing `ts`.
    #[must_use]
    pub fn utc_day_of(ts: i64) -> Self {
        let start = utc_day_start(ts);
        Self {
            start,
            end: start.saturating_add(SECONDS_PER_DAY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_start_truncates_to_midnight() {
        assert_eq!(utc_day_start(0), 0);
        assert_eq!(utc_day_start(1_700_000_000), 1_699_920_000);
        assert_eq!(utc_day_start(1_699_920_000), 1_699_920_000);
        assert_eq!(utc_day_start(-1), -SECONDS_PER_DAY);
    }

    #[test]
    fn windows_cover_expected_ranges() {
        let today = TimeWindow::today(1_700_000_000);
        assert_eq!(today.start, 1_699_920_000);
        assert_eq!(today.end, 1_700_000_000);

        let day = TimeWindow::utc_day_of(1_700_000_000);
        assert_eq!(day.start, 1_699_920_000);
        assert_eq!(day.end, 1_699_920_000 + SECONDS_PER_DAY);
    }

    #[test]
    fn window_serializes_with_timestamp_names() {
        let json = serde_json::to_value(TimeWindow::utc_day_of(0)).expect("json");
        assert_eq!(json["startTimestamp"], 0);
        assert_eq!(json["endTimestamp"], 86_400);
    }
}
