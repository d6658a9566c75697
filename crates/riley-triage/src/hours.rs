// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opening hours and the after-hours notice.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use riley_config::model::BusinessHoursConfig;
use riley_config::validation::parse_hhmm;
use riley_core::RileyError;

const DAY_LABELS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Weekly schedule at a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct BusinessHours {
    enabled: bool,
    offset: FixedOffset,
    /// `(open, close)` in minutes past midnight, indexed from Sunday.
    days: [Option<(u32, u32)>; 7],
    message: String,
}

impl BusinessHours {
    pub fn from_config(config: &BusinessHoursConfig) -> Result<Self, RileyError> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            RileyError::Config(format!(
                "business_hours.utc_offset_minutes {} is out of range",
                config.utc_offset_minutes
            ))
        })?;

        let mut days = [None; 7];
        for (slot, day) in days.iter_mut().zip(config.schedule.days()) {
            let Some(day) = day else { continue };
            let (Some(open), Some(close)) = (parse_hhmm(&day.open), parse_hhmm(&day.close)) else {
                return Err(RileyError::Config(format!(
                    "invalid business hours `{}`-`{}`",
                    day.open, day.close
                )));
            };
            *slot = (open < close).then_some((open, close));
        }

        Ok(Self {
            enabled: config.enabled,
            offset,
            days,
            message: config.after_hours_message.clone(),
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Day index (Sunday = 0) and minutes past local midnight.
    fn local(&self, now: DateTime<Utc>) -> (usize, u32) {
        let local = now.with_timezone(&self.offset);
        (
            local.weekday().num_days_from_sunday() as usize,
            local.hour() * 60 + local.minute(),
        )
    }

    /// Whether the business is open at `now`. Open is inclusive, close exclusive.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let (day, minute) = self.local(now);
        matches!(self.days[day], Some((open, close)) if minute >= open && minute < close)
    }

    /// Human description of the next opening, e.g. "today at 8:00 AM" or
    /// "Monday at 8:00 AM". Only the coming six days are considered.
    pub fn next_open(&self, now: DateTime<Utc>) -> String {
        let (today, minute) = self.local(now);
        for ahead in 0..7 {
            let day = (today + ahead) % 7;
            let Some((open, _)) = self.days[day] else {
                continue;
            };
            if ahead == 0 {
                if minute < open {
                    return format!("today at {}", format_time(open));
                }
            } else {
                return format!("{} at {}", DAY_LABELS[day], format_time(open));
            }
        }
        "our next business day".to_string()
    }

    /// The notice to append to a reply sent while closed, if any.
    pub fn after_hours_notice(
        &self,
        now: DateTime<Utc>,
        company_name: &str,
        customer_name: Option<&str>,
    ) -> Option<String> {
        if !self.enabled || self.is_open(now) {
            return None;
        }
        Some(
            self.message
                .replace("[[Next Open Time]]", &self.next_open(now))
                .replace("[[Company Name]]", company_name)
                .replace("[[Customer Name]]", customer_name.unwrap_or("")),
        )
    }
}

/// `480` -> `"8:00 AM"`.
fn format_time(minutes: u32) -> String {
    let (hour, minute) = (minutes / 60, minutes % 60);
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:{minute:02} {suffix}")
}
