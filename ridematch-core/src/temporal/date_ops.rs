use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Fuzziness;

/// number of calendar days either side of a date covered by [`Fuzziness::Week`].
pub const WEEK_DAYS: i64 = 7;

/// decides whether two departure times should be treated as the same time.
///
/// the looser of the two fuzziness values governs. for the hour-based
/// tolerances, the window is centered on `date1` only: `date2` must fall in
/// `[date1 - N hours, date1 + N hours]`. all comparisons are timezone-naive.
///
/// # Arguments
///
/// * `date1`  - departure time the window is centered on
/// * `fuzzy1` - tolerance attached to `date1`
/// * `date2`  - departure time being tested
/// * `fuzzy2` - tolerance attached to `date2`
///
/// # Returns
///
/// * true if the two times overlap under the effective tolerance
pub fn dates_match(
    date1: &NaiveDateTime,
    fuzzy1: Fuzziness,
    date2: &NaiveDateTime,
    fuzzy2: Fuzziness,
) -> bool {
    match fuzzy1.loosest(fuzzy2) {
        Fuzziness::Anytime => true,
        Fuzziness::Week => calendar_days_between(&date1.date(), &date2.date()) <= WEEK_DAYS,
        Fuzziness::Day => date1.date() == date2.date(),
        hourly => {
            let window = DateWindow::around(date1, hourly.hours().unwrap_or_default());
            window.contains(date2)
        }
    }
}

/// an inclusive range of departure times used as a storage pre-filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// earliest departure time (inclusive)
    pub earliest: NaiveDateTime,
    /// latest departure time (inclusive)
    pub latest: NaiveDateTime,
}

impl DateWindow {
    pub fn new(earliest: NaiveDateTime, latest: NaiveDateTime) -> DateWindow {
        DateWindow { earliest, latest }
    }

    /// `[date - hours, date + hours]`, saturating at the representable range.
    pub fn around(date: &NaiveDateTime, hours: i64) -> DateWindow {
        let delta = Duration::hours(hours);
        DateWindow {
            earliest: date.checked_sub_signed(delta).unwrap_or(NaiveDateTime::MIN),
            latest: date.checked_add_signed(delta).unwrap_or(NaiveDateTime::MAX),
        }
    }

    /// every instant of the calendar days `[from, to]`.
    pub fn days(from: &NaiveDate, to: &NaiveDate) -> DateWindow {
        DateWindow {
            earliest: start_of_day(from),
            latest: end_of_day(to),
        }
    }

    pub fn contains(&self, date: &NaiveDateTime) -> bool {
        self.earliest <= *date && *date <= self.latest
    }
}

/// the coarse departure window a storage query may use before the exact
/// [`dates_match`] check is applied. `None` means no time pre-filter.
///
/// this window only considers the searcher's own fuzziness, so listings whose
/// looser tolerance would admit them under [`dates_match`] can still fall
/// outside of it.
pub fn candidate_window(date: &NaiveDateTime, fuzziness: Fuzziness) -> Option<DateWindow> {
    match fuzziness {
        Fuzziness::Anytime => None,
        Fuzziness::Week => {
            let day = date.date();
            let from = day
                .checked_sub_signed(Duration::days(WEEK_DAYS))
                .unwrap_or(NaiveDate::MIN);
            let to = day
                .checked_add_signed(Duration::days(WEEK_DAYS))
                .unwrap_or(NaiveDate::MAX);
            Some(DateWindow::days(&from, &to))
        }
        Fuzziness::Day => Some(DateWindow::days(&date.date(), &date.date())),
        hourly => Some(DateWindow::around(date, hourly.hours().unwrap_or_default())),
    }
}

fn calendar_days_between(d1: &NaiveDate, d2: &NaiveDate) -> i64 {
    d1.signed_duration_since(*d2).num_days().abs()
}

fn start_of_day(date: &NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

fn end_of_day(date: &NaiveDate) -> NaiveDateTime {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_else(|| start_of_day(date))
}
