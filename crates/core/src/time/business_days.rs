use chrono::{Datelike, Duration, NaiveDate};

const BUSINESS_DAYS_PER_WEEK: i64 = 5;

/// Number of weekdays between two dates, walking from `earlier` toward `later`.
///
/// The start day is counted and the end day is not, so Friday to the following Monday is 1
/// and Saturday to Monday is 0. Negative when `later` precedes `earlier`. Holidays are not
/// excluded.
pub fn business_days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    let calendar_days = (later - earlier).num_days();
    let step = if calendar_days < 0 { -1 } else { 1 };

    // Whole weeks always hold five weekdays; only the remainder needs walking.
    let weeks = calendar_days / 7;
    let mut out = weeks * BUSINESS_DAYS_PER_WEEK;
    let mut cursor = earlier + Duration::days(weeks * 7);

    while cursor != later {
        if !is_weekend(cursor) {
            out += step;
        }
        cursor = cursor + Duration::days(step);
    }

    out
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn same_day_is_zero() {
        assert_eq!(business_days_between(d(2026, 1, 5), d(2026, 1, 5)), 0);
        // 2026-01-03 is Saturday.
        assert_eq!(business_days_between(d(2026, 1, 3), d(2026, 1, 3)), 0);
    }

    #[test]
    fn skips_weekend_over_friday_to_monday() {
        // 2026-01-02 is Friday, 2026-01-05 is Monday.
        assert_eq!(business_days_between(d(2026, 1, 5), d(2026, 1, 2)), 1);
    }

    #[test]
    fn weekend_start_counts_nothing_until_monday() {
        assert_eq!(business_days_between(d(2026, 1, 5), d(2026, 1, 3)), 0);
        assert_eq!(business_days_between(d(2026, 1, 6), d(2026, 1, 3)), 1);
    }

    #[test]
    fn whole_weeks_count_five_each() {
        assert_eq!(business_days_between(d(2026, 1, 12), d(2026, 1, 5)), 5);
        assert_eq!(business_days_between(d(2026, 2, 2), d(2026, 1, 5)), 20);
        // Four weeks plus Monday..Wednesday.
        assert_eq!(business_days_between(d(2026, 2, 4), d(2026, 1, 5)), 22);
    }

    #[test]
    fn reversed_order_is_negative() {
        assert_eq!(business_days_between(d(2026, 1, 2), d(2026, 1, 5)), -1);
        assert_eq!(business_days_between(d(2026, 1, 5), d(2026, 1, 12)), -5);
    }

    #[test]
    fn detects_weekends() {
        assert!(is_weekend(d(2026, 1, 3)));
        assert!(is_weekend(d(2026, 1, 4)));
        assert!(!is_weekend(d(2026, 1, 2)));
        assert!(!is_weekend(d(2026, 1, 5)));
    }
}
