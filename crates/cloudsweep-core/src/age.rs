//! Resource age evaluation

use chrono::{DateTime, Utc};

/// Elapsed wall-clock age of a resource
///
/// All three units are derived from the same elapsed duration in one
/// computation, so they can never disagree with each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningTime {
    pub seconds: f64,
    pub minutes: f64,
    pub hours: f64,
}

impl RunningTime {
    /// Age of a resource created at `creation`, as of `now`
    ///
    /// Returns `None` when the creation timestamp is unknown. Callers must
    /// treat unknown age as "cannot evaluate age-based policy", never as
    /// zero.
    pub fn since(creation: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Self> {
        let creation = creation?;
        let seconds = (now - creation).num_milliseconds() as f64 / 1000.0;
        Some(Self {
            seconds,
            minutes: seconds / 60.0,
            hours: seconds / 3600.0,
        })
    }
}
