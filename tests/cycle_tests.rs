// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cardcycle::calendar::{CalendarError, YearMonth};
use cardcycle::projection::current_statement_window;
use chrono::{Days, NaiveDate};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn window_runs_from_previous_closing_to_day_before_next_closing() {
    let w = current_statement_window(d(2024, 6, 15), 10, 5).unwrap();
    assert_eq!(w.start, d(2024, 6, 5));
    assert_eq!(w.end, d(2024, 7, 4));
    assert_eq!(w.closing, d(2024, 7, 5));
    assert_eq!(w.due, d(2024, 7, 10));
    assert_eq!(w.previous_closing(), d(2024, 6, 5));
    assert_eq!(w.days(), 30);
}

#[test]
fn window_end_is_offset_plus_one_days_before_next_due() {
    for day in 1..=30 {
        let w = current_statement_window(d(2024, 6, day), 10, 5).unwrap();
        assert_eq!(w.end.checked_add_days(Days::new(6)).unwrap(), w.due);
        assert_eq!(w.due, d(2024, 7, 10));
    }
}

#[test]
fn closing_day_opens_the_next_cycle() {
    let june = current_statement_window(d(2024, 6, 15), 10, 5).unwrap();
    let july = current_statement_window(d(2024, 7, 15), 10, 5).unwrap();
    let closing = d(2024, 7, 5);
    assert!(!june.contains(closing));
    assert!(july.contains(closing));
    assert!(june.contains(d(2024, 7, 4)));
    assert!(june.contains(d(2024, 6, 5)));
    assert!(!june.contains(d(2024, 6, 4)));
}

#[test]
fn consecutive_windows_tile_the_calendar() {
    let mut day = d(2023, 1, 1);
    let mut prev = current_statement_window(day, 10, 5).unwrap();
    while day < d(2026, 1, 1) {
        day = day.succ_opt().unwrap();
        let w = current_statement_window(day, 10, 5).unwrap();
        if w != prev {
            assert_eq!(prev.end.succ_opt().unwrap(), w.start, "gap/overlap at {}", day);
            assert_eq!(prev.closing, w.start);
        }
        prev = w;
    }
}

#[test]
fn windows_tile_with_offsets_crossing_month_start() {
    // due on the 2nd, closing 5 days earlier lands in the previous month
    let mut month = YearMonth::new(2023, 1).unwrap();
    let mut prev = current_statement_window(month.day(15).unwrap(), 2, 5).unwrap();
    for _ in 0..36 {
        month = month.succ();
        let w = current_statement_window(month.day(15).unwrap(), 2, 5).unwrap();
        assert_eq!(prev.end.succ_opt().unwrap(), w.start);
        prev = w;
    }
}

#[test]
fn december_rolls_into_next_year() {
    let w = current_statement_window(d(2024, 12, 20), 10, 5).unwrap();
    assert_eq!(w.start, d(2024, 12, 5));
    assert_eq!(w.end, d(2025, 1, 4));
    assert_eq!(w.due, d(2025, 1, 10));

    let jan = current_statement_window(d(2025, 1, 15), 2, 5).unwrap();
    assert_eq!(jan.start, d(2024, 12, 28));
    assert_eq!(jan.end, d(2025, 1, 27));
    assert_eq!(jan.closing, d(2025, 1, 28));
}

#[test]
fn leap_february_is_respected() {
    let w = current_statement_window(d(2024, 3, 10), 3, 5).unwrap();
    assert_eq!(w.start, d(2024, 2, 27));
    assert_eq!(w.end, d(2024, 3, 28));

    let feb = current_statement_window(d(2024, 1, 10), 29, 0).unwrap();
    assert_eq!(feb.due, d(2024, 2, 29));
    assert!(current_statement_window(d(2023, 1, 10), 29, 0).is_err());
}

#[test]
fn due_day_missing_from_month_fails_closed() {
    let err = current_statement_window(d(2024, 4, 10), 31, 5).unwrap_err();
    assert_eq!(
        err,
        CalendarError::DayOutOfMonth {
            day: 31,
            month: YearMonth::new(2024, 4).unwrap()
        }
    );

    let err = current_statement_window(d(2024, 3, 10), 31, 5).unwrap_err();
    assert_eq!(
        err,
        CalendarError::DayOutOfMonth {
            day: 31,
            month: YearMonth::new(2024, 4).unwrap()
        }
    );
    assert!(current_statement_window(d(2024, 7, 10), 31, 5).is_ok());
}

#[test]
fn year_month_arithmetic_wraps() {
    let m: YearMonth = "2024-11".parse().unwrap();
    assert_eq!(m.add_months(2).to_string(), "2025-01");
    assert_eq!(m.add_months(-11).to_string(), "2023-12");
    assert_eq!(m.months_until("2025-03".parse().unwrap()), 4);
    assert_eq!(m.last_day(), d(2024, 11, 30));
    assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
    assert!("2024-13".parse::<YearMonth>().is_err());
    assert!(YearMonth::new(2024, 0).is_err());
}
