use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const DAY_MS: i64 = 86_400_000;

/// One existing booking's blocked interval for a car, as reported by the
/// calendar endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupiedDateRange {
    #[serde(alias = "startDate", alias = "pickupDate")]
    pub start: DateTime<Utc>,
    #[serde(alias = "endDate", alias = "returnDate")]
    pub end: DateTime<Utc>,
}

impl OccupiedDateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Inclusive calendar-day span, start <= end.
    pub fn days(&self) -> (NaiveDate, NaiveDate) {
        ordered(self.start.date_naive(), self.end.date_naive())
    }
}

fn ordered(a: NaiveDate, b: NaiveDate) -> (NaiveDate, NaiveDate) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// True if any calendar day in `[start, end]` falls inside, or on the
/// boundary of, any occupied range.
pub fn is_range_occupied(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    ranges: &[OccupiedDateRange],
) -> bool {
    let (from, to) = ordered(start.date_naive(), end.date_naive());
    ranges.iter().any(|range| {
        let (blocked_from, blocked_to) = range.days();
        from <= blocked_to && to >= blocked_from
    })
}

/// Earliest occupied start day strictly after the pickup day.
pub fn nearest_occupied_start(
    pickup: DateTime<Utc>,
    ranges: &[OccupiedDateRange],
) -> Option<NaiveDate> {
    let pickup_day = pickup.date_naive();
    ranges
        .iter()
        .map(|range| range.days().0)
        .filter(|start| *start > pickup_day)
        .min()
}

/// Last day a car picked up at `pickup` may be returned, or `None` when no
/// later booking caps it.
pub fn max_return_date(pickup: DateTime<Utc>, ranges: &[OccupiedDateRange]) -> Option<NaiveDate> {
    nearest_occupied_start(pickup, ranges).and_then(|start| start.pred_opt())
}

pub fn rental_days(pickup: DateTime<Utc>, return_at: DateTime<Utc>) -> i64 {
    let millis = (return_at - pickup).num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    ((millis + DAY_MS - 1) / DAY_MS).max(1)
}
