//! Per-date statistics and their aggregation into time series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{UrbanError, UrbanResult};

/// One reduced value for one source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub date: NaiveDate,
    /// `None` when the reduction produced no value (masked region, nodata).
    pub value: Option<f64>,
}

impl StatRecord {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// Chronological series with period-over-period percent change.
///
/// Entry `i` carries the value at `dates[i]` and its change relative to the
/// preceding observation. The first observation has no change and is not
/// part of the series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub change: Vec<f64>,
}

impl TimeSeries {
    /// Build a series from raw per-image records.
    ///
    /// Records without a value are discarded before ordering. Entries whose
    /// change is undefined (the first one, or one following a zero) are
    /// dropped. A series left with no entries is an
    /// [`UrbanError::EmptySeries`] for `metric`.
    pub fn aggregate(metric: &str, records: &[StatRecord]) -> UrbanResult<Self> {
        let mut valid: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter_map(|r| match r.value {
                Some(v) if v.is_finite() => Some((r.date, v)),
                _ => None,
            })
            .collect();

        if valid.is_empty() {
            return Err(UrbanError::EmptySeries(format!(
                "{}: no valid observations",
                metric
            )));
        }

        valid.sort_by_key(|(date, _)| *date);

        let mut series = TimeSeries::default();
        for pair in valid.windows(2) {
            let (_, prev) = pair[0];
            let (date, curr) = pair[1];
            if let Some(change) = percent_change(prev, curr) {
                series.dates.push(date);
                series.values.push(curr);
                series.change.push(change);
            }
        }

        if series.is_empty() {
            return Err(UrbanError::EmptySeries(format!(
                "{}: no change computable from {} valid observation{}",
                metric,
                valid.len(),
                if valid.len() == 1 { "" } else { "s" }
            )));
        }

        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// `(curr - prev) / prev * 100`, undefined when `prev` is zero.
pub fn percent_change(prev: f64, curr: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    Some((curr - prev) / prev * 100.0)
}
