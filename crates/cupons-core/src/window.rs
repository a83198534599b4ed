//! # Date Windows
//!
//! A coupon is valid from `data_inicio` to `data_fim`, both days included.
//! Comparison happens on calendar days: every input is truncated to its
//! date in the local time zone before comparing.
//!
//! ```text
//!        start                       end
//!   ──────[═══════════════════════════]──────►
//!    false  true       true        true  false
//! ```
//!
//! An inverted window (`start > end`) matches no day. Nothing here rejects
//! it; coupon forms are validated in [`crate::validation`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

use crate::error::ValidationError;

// =============================================================================
// Calendar Date Normalization
// =============================================================================

/// Anything that can be reduced to a calendar day.
pub trait CalendarDate {
    /// The day this value falls on, in the local time zone.
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl CalendarDate for DateTime<Local> {
    fn calendar_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl CalendarDate for DateTime<Utc> {
    fn calendar_date(&self) -> NaiveDate {
        self.with_timezone(&Local).date_naive()
    }
}

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a date string.
///
/// Accepts `2024-06-15`, RFC 3339 (`2024-06-15T10:30:00-03:00`) and a bare
/// `2024-06-15T10:30:00`. Timestamps are reduced to their local calendar day.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Local).date_naive());
    }

    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// True iff `start <= reference <= end`, compared by calendar day.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use cupons_core::window::is_within_date_window;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// assert!(is_within_date_window(d(1, 1), d(12, 31), d(6, 15)));
/// assert!(!is_within_date_window(d(1, 1), d(1, 31), d(6, 15)));
/// assert!(!is_within_date_window(d(12, 31), d(1, 1), d(6, 15)));
/// ```
pub fn is_within_date_window<S, E, R>(start: S, end: E, reference: R) -> bool
where
    S: CalendarDate,
    E: CalendarDate,
    R: CalendarDate,
{
    DateWindow::new(start.calendar_date(), end.calendar_date()).contains(reference)
}

// =============================================================================
// Date Window
// =============================================================================

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateWindow { start, end }
    }

    /// Parses both bounds, naming the offending field on failure.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start = parse_calendar_date(start)
            .ok_or_else(|| ValidationError::invalid_format("dataInicio", "esperado AAAA-MM-DD"))?;
        let end = parse_calendar_date(end)
            .ok_or_else(|| ValidationError::invalid_format("dataFim", "esperado AAAA-MM-DD"))?;
        Ok(DateWindow { start, end })
    }

    /// Whether `reference` falls on a day inside the window.
    pub fn contains(&self, reference: impl CalendarDate) -> bool {
        let day = reference.calendar_date();
        self.start <= day && day <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
