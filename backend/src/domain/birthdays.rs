//! Upcoming-birthday window arithmetic.
//!
//! A contact's birthday is "upcoming" when its next anniversary, counted from
//! today, falls within `[today, today + days]`. Anniversaries roll over into
//! the following year once this year's date has passed, so a window opened in
//! late December naturally includes early-January birthdays. People born on
//! 29 February celebrate on 28 February in common years.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};

use super::contact::Contact;

/// Default look-ahead when the caller does not specify one.
pub const DEFAULT_WINDOW_DAYS: u16 = 7;
/// Largest accepted look-ahead.
pub const MAX_WINDOW_DAYS: u16 = 365;

/// Rejected window sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdayWindowError {
    TooLong { max: u16 },
}

impl fmt::Display for BirthdayWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { max } => write!(f, "days must be between 0 and {max}"),
        }
    }
}

impl std::error::Error for BirthdayWindowError {}

/// Number of days to look ahead, inclusive of today.
///
/// # Examples
/// ```
/// use contacts_api::domain::BirthdayWindow;
///
/// assert_eq!(BirthdayWindow::default().days(), 7);
/// assert!(BirthdayWindow::new(366).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdayWindow(u16);

impl BirthdayWindow {
    pub fn new(days: u16) -> Result<Self, BirthdayWindowError> {
        if days > MAX_WINDOW_DAYS {
            return Err(BirthdayWindowError::TooLong {
                max: MAX_WINDOW_DAYS,
            });
        }
        Ok(Self(days))
    }

    pub fn days(self) -> u16 {
        self.0
    }

    /// Last day included in the window starting at `today`.
    pub fn end(self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(u64::from(self.0)))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl Default for BirthdayWindow {
    fn default() -> Self {
        Self(DEFAULT_WINDOW_DAYS)
    }
}

/// Date on which `birthday` is celebrated in `year`.
fn anniversary_in(birthday: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
}

/// First anniversary of `birthday` on or after `today`.
pub fn next_anniversary(birthday: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = anniversary_in(birthday, today.year())?;
    if this_year >= today {
        return Some(this_year);
    }
    anniversary_in(birthday, today.year().checked_add(1)?)
}

/// Keep contacts whose next anniversary falls in the window, soonest first.
pub fn upcoming_birthdays(
    contacts: Vec<Contact>,
    today: NaiveDate,
    window: BirthdayWindow,
) -> Vec<Contact> {
    let end = window.end(today);
    let mut upcoming: Vec<(NaiveDate, Contact)> = contacts
        .into_iter()
        .filter_map(|contact| {
            next_anniversary(contact.birthday(), today)
                .filter(|next| *next <= end)
                .map(|next| (next, contact))
        })
        .collect();
    upcoming.sort_by(|(a, left), (b, right)| {
        a.cmp(b)
            .then_with(|| left.fields().last_name().cmp(right.fields().last_name()))
            .then_with(|| left.fields().first_name().cmp(right.fields().first_name()))
    });
    upcoming.into_iter().map(|(_, contact)| contact).collect()
}
