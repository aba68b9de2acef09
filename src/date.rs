use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Canonical calendar ordering. Month numbers are always resolved against
/// this list, never against a restricted subset of it.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar fields derived from the picked date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateParts {
    pub day: u32,
    pub year: i32,
    /// Month names the user may pick for this date, in calendar order.
    pub months: Vec<&'static str>,
}

/// Months selectable for `selected`: from the current month through December
/// when `selected` falls in the current year, all twelve otherwise.
pub fn legal_month_range(selected: NaiveDate, today: NaiveDate) -> Vec<&'static str> {
    if selected.year() == today.year() {
        // month0() is 0..=11
        MONTHS[today.month0() as usize..].to_vec()
    } else {
        MONTHS.to_vec()
    }
}

pub fn decompose(selected: NaiveDate, today: NaiveDate) -> DateParts {
    DateParts {
        day: selected.day(),
        year: selected.year(),
        months: legal_month_range(selected, today),
    }
}

/// 1-based calendar number of a month name.
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

impl DateParts {
    /// Resolves a picked month name to its calendar number, only if the name
    /// is one this date allows.
    pub fn resolve_month(&self, name: &str) -> Option<u32> {
        if self.months.contains(&name) {
            month_number(name)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn current_year_starts_at_current_month() {
        let months = legal_month_range(d(2025, 8, 1), d(2025, 6, 15));
        assert_eq!(months.first(), Some(&"June"));
        assert_eq!(months.last(), Some(&"December"));
        assert_eq!(months.len(), 7);
        for past in &MONTHS[..5] {
            assert!(!months.contains(past), "{past} should not be selectable");
        }
    }

    #[test]
    fn december_leaves_one_month() {
        assert_eq!(legal_month_range(d(2025, 12, 31), d(2025, 12, 1)), vec!["December"]);
    }

    #[test]
    fn other_years_get_all_months() {
        for today_month in 1..=12 {
            let months = legal_month_range(d(2026, 3, 1), d(2025, today_month, 1));
            assert_eq!(months, MONTHS.to_vec());
        }
    }

    #[test]
    fn month_number_uses_canonical_order() {
        let restricted = legal_month_range(d(2025, 10, 1), d(2025, 9, 3));
        // "October" sits at index 1 of the restricted list
        assert_eq!(restricted.iter().position(|m| *m == "October"), Some(1));
        assert_eq!(month_number("October"), Some(10));

        for (i, name) in MONTHS.iter().enumerate() {
            assert_eq!(month_number(name), Some(i as u32 + 1));
        }
        assert_eq!(month_number("Smarch"), None);
    }

    #[test]
    fn decompose_reads_day_and_year() {
        let parts = decompose(d(2025, 6, 15), d(2025, 6, 1));
        assert_eq!(parts.day, 15);
        assert_eq!(parts.year, 2025);
        assert_eq!(parts.resolve_month("June"), Some(6));
        assert_eq!(parts.resolve_month("May"), None);
    }
}
