//! Streak and time-series value types.
//!
//! None of these are stored; they are derived from the completion ledger on
//! demand.

use std::collections::BTreeMap;
use std::iter::FusedIterator;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A maximal run of consecutive calendar days with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakRun {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub length: u32,
}

/// Streak figures reported for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Days with at least one completion inside the graph window
    pub total_completions_in_window: u32,
}

/// One day of a [`DailySeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDay {
    pub date: NaiveDate,
    pub present: bool,
}

/// One point of the chart series handed to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPoint {
    pub date: NaiveDate,
    /// 1 if any completion exists for the day, else 0
    pub completions: u8,
    /// Raw stored count for the day, 0 if absent
    pub count: u32,
}

/// Fixed-length run of calendar days ending on `end`, oldest first.
///
/// Always holds exactly `window_days + 1` days no matter how sparse the
/// ledger is. Iterating borrows the series, so it can be walked any number
/// of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySeries {
    start: NaiveDate,
    len: usize,
    counts: BTreeMap<NaiveDate, u32>,
}

impl DailySeries {
    /// Build the series for `[end - window_days, end]` from per-day counts.
    /// Counts outside the window are dropped.
    ///
    /// Returns `None` when the window reaches before the earliest
    /// representable date.
    pub fn new(end: NaiveDate, window_days: u32, counts: BTreeMap<NaiveDate, u32>) -> Option<Self> {
        let start = end.checked_sub_days(Days::new(u64::from(window_days)))?;
        let counts = counts
            .into_iter()
            .filter(|(date, count)| *date >= start && *date <= end && *count > 0)
            .collect();
        let len = usize::try_from(window_days).ok()? + 1;
        Some(Self { start, len, counts })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Days::new(self.len as u64 - 1)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// A series always contains at least the end day.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn count_on(&self, date: NaiveDate) -> u32 {
        self.counts.get(&date).copied().unwrap_or(0)
    }

    /// Number of days in the window that have a completion.
    pub fn present_days(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> SeriesIter<'_> {
        SeriesIter {
            series: self,
            front: 0,
            back: self.len,
        }
    }
}

impl<'a> IntoIterator for &'a DailySeries {
    type Item = SeriesDay;
    type IntoIter = SeriesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the days of a [`DailySeries`].
#[derive(Debug, Clone)]
pub struct SeriesIter<'a> {
    series: &'a DailySeries,
    front: usize,
    back: usize,
}

impl SeriesIter<'_> {
    fn day_at(&self, offset: usize) -> SeriesDay {
        let date = self.series.start + Days::new(offset as u64);
        SeriesDay {
            date,
            present: self.series.counts.contains_key(&date),
        }
    }
}

impl Iterator for SeriesIter<'_> {
    type Item = SeriesDay;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let day = self.day_at(self.front);
        self.front += 1;
        Some(day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for SeriesIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.day_at(self.back))
    }
}

impl ExactSizeIterator for SeriesIter<'_> {}

impl FusedIterator for SeriesIter<'_> {}

/// Aggregate figures over all of a user's goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_goals: u32,
    pub active_goals: u32,
    /// Sum of stored completion counts across all goals
    pub total_completions: u64,
    pub best_current_streak: u32,
    pub longest_streak: u32,
}
