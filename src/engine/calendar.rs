// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar grid generation for the day, week and month views.
//!
//! All functions are total over valid dates. The month grid is always
//! 6 rows by 7 columns so the rendered height never changes between months.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::models::{CalendarCell, ViewMode};

pub const MONTH_GRID_CELLS: usize = 42;

pub fn day_cells(anchor: NaiveDate) -> Vec<CalendarCell> {
    vec![CalendarCell {
        date: anchor,
        is_current_period: true,
    }]
}

/// Seven consecutive days beginning with the most recent `week_start` on or before `anchor`.
pub fn week_cells(anchor: NaiveDate, week_start: Weekday) -> Vec<CalendarCell> {
    let start = week_start_on_or_before(anchor, week_start);
    start
        .iter_days()
        .take(7)
        .map(|date| CalendarCell {
            date,
            is_current_period: true,
        })
        .collect()
}

/// Fixed 42-cell month grid: trailing days of the previous month, the whole
/// anchor month, then leading days of the next month.
pub fn month_cells(anchor: NaiveDate) -> Vec<CalendarCell> {
    let first = first_of_month(anchor);
    let lead = first.weekday().num_days_from_sunday() as u64;
    let grid_start = first - Days::new(lead);
    grid_start
        .iter_days()
        .take(MONTH_GRID_CELLS)
        .map(|date| CalendarCell {
            date,
            is_current_period: date.year() == first.year() && date.month() == first.month(),
        })
        .collect()
}

pub fn cells(mode: ViewMode, anchor: NaiveDate) -> Vec<CalendarCell> {
    match mode {
        ViewMode::Day => day_cells(anchor),
        ViewMode::Week => week_cells(anchor, Weekday::Sun),
        ViewMode::Month => month_cells(anchor),
    }
}

/// First and last date shown by the grid for `mode` (padding cells included).
pub fn visible_range(mode: ViewMode, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    match mode {
        ViewMode::Day => (anchor, anchor),
        ViewMode::Week => {
            let start = week_start_on_or_before(anchor, Weekday::Sun);
            (start, start + Days::new(6))
        }
        ViewMode::Month => {
            let first = first_of_month(anchor);
            let start = first - Days::new(first.weekday().num_days_from_sunday() as u64);
            (start, start + Days::new(MONTH_GRID_CELLS as u64 - 1))
        }
    }
}

/// Moves the anchor by `steps` views. Month steps clamp to the last day of
/// shorter months (Jan 31 + 1 month = Feb 28/29). A move past the
/// representable date range leaves the anchor where it is.
pub fn shift(mode: ViewMode, anchor: NaiveDate, steps: i32) -> NaiveDate {
    let n = steps.unsigned_abs();
    let moved = match (mode, steps >= 0) {
        (ViewMode::Day, true) => anchor.checked_add_days(Days::new(n as u64)),
        (ViewMode::Day, false) => anchor.checked_sub_days(Days::new(n as u64)),
        (ViewMode::Week, true) => anchor.checked_add_days(Days::new(7 * n as u64)),
        (ViewMode::Week, false) => anchor.checked_sub_days(Days::new(7 * n as u64)),
        (ViewMode::Month, true) => anchor.checked_add_months(Months::new(n)),
        (ViewMode::Month, false) => anchor.checked_sub_months(Months::new(n)),
    };
    moved.unwrap_or(anchor)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    last_of_month(date).day()
}

fn week_start_on_or_before(anchor: NaiveDate, week_start: Weekday) -> NaiveDate {
    let back = (7 + anchor.weekday().num_days_from_sunday() - week_start.num_days_from_sunday()) % 7;
    anchor - Days::new(back as u64)
}
