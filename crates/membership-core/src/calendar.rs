//! Week-Boundary Calendar Arithmetic
//!
//! Pure date functions behind the weekly payout cadence: a commission week
//! runs Monday through Sunday, and payouts captured during that week become
//! eligible for disbursement on the Friday that follows it.
//!
//! All functions here are total - any valid date maps to exactly one week
//! and one eligible Friday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// The Monday..Sunday week (both ends inclusive) containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// The Friday immediately following the Sunday that ends `date`'s week.
///
/// Always strictly after `date`, by between 5 days (a Sunday capture) and
/// 11 days (a Monday capture). A Friday capture still rolls to the *next*
/// Friday - the eligible date is never the capture date itself.
pub fn payment_eligible_date(date: NaiveDate) -> NaiveDate {
    let (_, sunday) = week_bounds(date);
    sunday + Duration::days(5)
}

/// First calendar day of the month containing `ts` - the payout month a
/// captured payment covers.
pub fn payout_month(ts: DateTime<Utc>) -> NaiveDate {
    let date = ts.date_naive();
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_bounds_midweek() {
        // Wed 2025-06-11 -> Mon 2025-06-09 .. Sun 2025-06-15
        let (monday, sunday) = week_bounds(date(2025, 6, 11));
        assert_eq!(monday, date(2025, 6, 9));
        assert_eq!(sunday, date(2025, 6, 15));
    }

    #[test]
    fn test_week_bounds_on_boundaries() {
        // Monday maps to its own week start
        let (monday, sunday) = week_bounds(date(2025, 6, 9));
        assert_eq!(monday, date(2025, 6, 9));
        assert_eq!(sunday, date(2025, 6, 15));

        // Sunday belongs to the week it ends
        let (monday, sunday) = week_bounds(date(2025, 6, 15));
        assert_eq!(monday, date(2025, 6, 9));
        assert_eq!(sunday, date(2025, 6, 15));
    }

    #[test]
    fn test_eligible_date_is_following_friday() {
        // Every day of the week 2025-06-09..15 rolls to Fri 2025-06-20
        for d in 9..=15 {
            let eligible = payment_eligible_date(date(2025, 6, d));
            assert_eq!(eligible, date(2025, 6, 20));
            assert_eq!(eligible.weekday(), Weekday::Fri);
        }
    }

    #[test]
    fn test_friday_capture_rolls_to_next_friday() {
        // Fri 2025-06-13 is eligible Fri 2025-06-20, never same-day
        let eligible = payment_eligible_date(date(2025, 6, 13));
        assert_eq!(eligible, date(2025, 6, 20));
        assert_ne!(eligible, date(2025, 6, 13));
    }

    #[test]
    fn test_eligible_date_window_invariant() {
        // For any capture date: eligible is a Friday, strictly later,
        // and between 5 and 11 days out.
        let start = date(2025, 1, 1);
        for offset in 0..60 {
            let d = start + Duration::days(offset);
            let eligible = payment_eligible_date(d);
            let gap = (eligible - d).num_days();
            assert_eq!(eligible.weekday(), Weekday::Fri);
            assert!(eligible > d);
            assert!((5..=11).contains(&gap), "gap {gap} for {d}");
        }
    }

    #[test]
    fn test_eligible_date_crosses_month_end() {
        // Tue 2025-07-29 -> week ends Sun 2025-08-03 -> Fri 2025-08-08
        let eligible = payment_eligible_date(date(2025, 7, 29));
        assert_eq!(eligible, date(2025, 8, 8));
    }

    #[test]
    fn test_payout_month() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 17, 14, 30, 0).unwrap();
        assert_eq!(payout_month(ts), date(2025, 6, 1));

        let first = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(payout_month(first), date(2025, 6, 1));
    }
}
