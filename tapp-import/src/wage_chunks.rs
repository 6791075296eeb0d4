//! Wage-chunk arithmetic
//!
//! An assignment's hours are split into chunks at a fixed calendar boundary
//! (January 1st unless configured otherwise) because pay rates change
//! there. Hours are apportioned by the number of days on each side.

use crate::models::WageChunk;
use chrono::{Datelike, Days, NaiveDate};
use tapp_common::time::format_date;

/// Tolerance when comparing hour totals
const HOURS_EPSILON: f64 = 1e-6;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Sum of chunk hours, rounded to hundredths
pub fn total_hours(hours: impl IntoIterator<Item = f64>) -> f64 {
    round2(hours.into_iter().sum())
}

/// True if two hour totals differ beyond float noise
pub fn hours_differ(a: f64, b: f64) -> bool {
    (a - b).abs() > HOURS_EPSILON
}

/// Boundary dates (`month`, `day`) that fall strictly after `start` and no
/// later than `end`
fn boundaries_within(start: NaiveDate, end: NaiveDate, (month, day): (u32, u32)) -> Vec<NaiveDate> {
    (start.year()..=end.year())
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|b| *b > start && *b <= end)
        .collect()
}

/// Split `hours` over `[start, end]` at each occurrence of the boundary
///
/// Each chunk gets hours proportional to its day count, rounded to
/// hundredths; the last chunk absorbs the rounding remainder so the chunks
/// always sum to `hours`. A reversed range yields a single chunk.
pub fn split_at_boundary(
    start: NaiveDate,
    end: NaiveDate,
    hours: f64,
    boundary: (u32, u32),
) -> Vec<WageChunk> {
    if end < start {
        return vec![chunk(start, end, hours)];
    }

    let mut ranges = Vec::new();
    let mut chunk_start = start;
    for b in boundaries_within(start, end, boundary) {
        // b > start, so b - 1 day is never before chunk_start
        let chunk_end = b.checked_sub_days(Days::new(1)).unwrap_or(b);
        ranges.push((chunk_start, chunk_end));
        chunk_start = b;
    }
    ranges.push((chunk_start, end));

    let total_days: i64 = ranges.iter().map(|(s, e)| day_count(*s, *e)).sum();
    let mut assigned = 0.0;
    let last = ranges.len() - 1;

    ranges
        .iter()
        .enumerate()
        .map(|(i, (s, e))| {
            let chunk_hours = if i == last {
                round2(hours - assigned)
            } else {
                let share = round2(hours * day_count(*s, *e) as f64 / total_days as f64);
                assigned += share;
                share
            };
            chunk(*s, *e, chunk_hours)
        })
        .collect()
}

fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

fn chunk(start: NaiveDate, end: NaiveDate, hours: f64) -> WageChunk {
    WageChunk {
        id: None,
        start_date: Some(format_date(start)),
        end_date: Some(format_date(end)),
        hours,
        rate: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_term_is_one_chunk() {
        let chunks = split_at_boundary(ymd(2021, 9, 1), ymd(2021, 12, 31), 70.0, (1, 1));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].hours, 70.0);
        assert_eq!(chunks[0].start_date.as_deref(), Some("2021-09-01"));
        assert_eq!(chunks[0].end_date.as_deref(), Some("2021-12-31"));
    }

    #[test]
    fn test_full_year_splits_at_new_year() {
        let chunks = split_at_boundary(ymd(2021, 9, 1), ymd(2022, 4, 30), 140.0, (1, 1));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].end_date.as_deref(), Some("2021-12-31"));
        assert_eq!(chunks[1].start_date.as_deref(), Some("2022-01-01"));

        // 122 of 242 days fall in 2021
        assert_eq!(chunks[0].hours, 70.58);
        assert_eq!(chunks[1].hours, 69.42);
        assert_eq!(total_hours(chunks.iter().map(|c| c.hours)), 140.0);
    }

    #[test]
    fn test_starting_on_boundary_does_not_split() {
        let chunks = split_at_boundary(ymd(2022, 1, 1), ymd(2022, 4, 30), 60.0, (1, 1));
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_custom_boundary() {
        let chunks = split_at_boundary(ymd(2022, 1, 1), ymd(2022, 8, 31), 100.0, (5, 1));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].end_date.as_deref(), Some("2022-04-30"));
        assert_eq!(chunks[1].start_date.as_deref(), Some("2022-05-01"));
    }

    #[test]
    fn test_multi_year_range() {
        let chunks = split_at_boundary(ymd(2020, 9, 1), ymd(2022, 4, 30), 300.0, (1, 1));
        assert_eq!(chunks.len(), 3);
        assert_eq!(total_hours(chunks.iter().map(|c| c.hours)), 300.0);
    }

    #[test]
    fn test_reversed_range_is_single_chunk() {
        let chunks = split_at_boundary(ymd(2022, 4, 30), ymd(2021, 9, 1), 10.0, (1, 1));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].hours, 10.0);
    }

    #[test]
    fn test_hours_differ() {
        assert!(!hours_differ(70.0, 70.0000001));
        assert!(hours_differ(70.0, 70.01));
    }
}
