//! Human-readable renderings of event times. All of these are pure functions
//! of the stored start/end instants.

use chrono::{DateTime, Datelike, Timelike, Utc};

use super::domain::Event;

impl Event {
    /// Compact 12-hour start time: hour without a leading zero, minutes only
    /// when nonzero, and an `a`/`p` suffix. `19:30` renders as `730p`.
    pub fn short_start_time(&self) -> String {
        short_time(self.start_time)
    }

    /// The start date as `YYYY MM/DD`.
    pub fn start_date(&self) -> String {
        self.start_time.format("%Y %m/%d").to_string()
    }

    /// The full range, e.g. `Wed 10/01 07:00PM - 09:00PM`. The end's date
    /// portion is repeated only when the event spans more than one calendar
    /// date; `with_year` appends a two-digit year to the date portions.
    pub fn nice_time_range(&self, with_year: bool) -> String {
        nice_time_range(self.start_time, self.end_time, with_year)
    }
}

pub(crate) fn short_time(at: DateTime<Utc>) -> String {
    let suffix = if at.hour() >= 12 { "p" } else { "a" };
    let minutes = if at.minute() > 0 {
        format!("{:02}", at.minute())
    } else {
        String::new()
    };
    let hour = match at.hour() {
        0 => 12,
        hour if hour > 12 => hour - 12,
        hour => hour,
    };
    format!("{hour}{minutes}{suffix}")
}

pub(crate) fn nice_time_range(start: DateTime<Utc>, end: DateTime<Utc>, with_year: bool) -> String {
    let date_format = if with_year { "%a %m/%d/%y" } else { "%a %m/%d" };
    let time_format = "%I:%M%p";
    let full_format = format!("{date_format} {time_format}");

    let start_rendered = start.format(&full_format);
    let end_rendered = if start.date_naive() == end.date_naive() {
        end.format(time_format).to_string()
    } else {
        end.format(&full_format).to_string()
    };

    format!("{start_rendered} - {end_rendered}")
}
