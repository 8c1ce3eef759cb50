//! Birthday arithmetic for the search post-filter.
//!
//! Age and days-to-next-birthday cannot go into the SQL predicates because
//! both derive from "today"; the store computes them here for every row the
//! query returns.

use chrono::{Datelike, NaiveDate};

use crate::model::BIRTHDAY_FORMAT;

/// Parse a stored `"dd-mm-yyyy"` birthday column value.
pub fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, BIRTHDAY_FORMAT).ok()
}

/// Whole calendar years elapsed between `birthday` and `today`.
///
/// A birthday later in the year than today counts one year less than plain
/// year subtraction.
pub fn age_in_years(birthday: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birthday.year();
    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        years -= 1;
    }
    years
}

/// Days from `today` to the next occurrence of `birthday`'s month and day,
/// in [0, 365]. An occurrence already past this calendar year rolls over to
/// next year; today itself counts as 0.
pub fn days_until_birthday(birthday: NaiveDate, today: NaiveDate) -> i64 {
    let this_year = occurrence_in(today.year(), birthday);
    let next = if this_year < today {
        occurrence_in(today.year() + 1, birthday)
    } else {
        this_year
    };
    (next - today).num_days()
}

/// The birthday's occurrence within `year`. 29 February lands on 1 March
/// when `year` is not a leap year.
fn occurrence_in(year: i32, birthday: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 3, 1).expect("1 March always exists"))
}
