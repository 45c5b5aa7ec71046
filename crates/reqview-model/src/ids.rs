use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Identity of a stored report.
///
/// Ids are millisecond timestamps in the reference backends, so ordering by id
/// is ordering by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(i64);

impl ReportId {
    /// Placeholder for a report no store has accepted yet. Stores replace
    /// any id that is not positive with a fresh one.
    pub const UNASSIGNED: Self = Self(0);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn is_assigned(self) -> bool {
        self.0 > 0
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }
}

/// Identity of a stored screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenshotId(i64);

impl ScreenshotId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ScreenshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScreenshotId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }
}

/// Monotonic id source derived from the wall clock.
///
/// Two calls never return the same value: when the clock has not advanced
/// (or went backwards) the previous value plus one is used instead.
#[derive(Debug, Default)]
pub struct TimestampIds {
    last: AtomicI64,
}

impl TimestampIds {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Next raw id value.
    pub fn next_value(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }

    pub fn next_report_id(&self) -> ReportId {
        ReportId(self.next_value())
    }

    pub fn next_screenshot_id(&self) -> ScreenshotId {
        ScreenshotId(self.next_value())
    }

    /// Makes every later id strictly greater than `floor`.
    ///
    /// Stores call this after loading existing records so that fresh ids
    /// cannot collide with persisted ones.
    pub fn observe(&self, floor: i64) {
        self.last.fetch_max(floor, Ordering::AcqRel);
    }
}
