//! Expansion of calendar.txt and calendar_dates.txt into the list of service
//! keys active on each date.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::CompileError;
use crate::gtfs_tables::{GtfsCalendar, GtfsCalendarDate, GtfsExceptionType};
use crate::gtfs_time::ServiceDate;
use crate::keys::ServiceKey;

/// Active services per date, in the order they were activated. A key can
/// appear more than once on a date.
pub type ServicesByDate = HashMap<ServiceDate, Vec<ServiceKey>>;

fn runs_on(calendar: &GtfsCalendar, date: NaiveDate) -> bool {
    match date.weekday() {
        Weekday::Mon => calendar.monday,
        Weekday::Tue => calendar.tuesday,
        Weekday::Wed => calendar.wednesday,
        Weekday::Thu => calendar.thursday,
        Weekday::Fri => calendar.friday,
        Weekday::Sat => calendar.saturday,
        Weekday::Sun => calendar.sunday,
    }
}

pub fn expand_calendar(
    calendars: Option<&[GtfsCalendar]>,
    calendar_dates: Option<&[GtfsCalendarDate]>,
) -> Result<ServicesByDate, CompileError> {
    if calendars.is_none() && calendar_dates.is_none() {
        return Err(CompileError::MissingCalendar);
    }

    let mut services_by_date = ServicesByDate::new();

    for calendar in calendars.unwrap_or_default() {
        let service_key = ServiceKey::derive(&calendar.service_id);
        for date in calendar.start_date.iter_days() {
            if date > calendar.end_date {
                break;
            }
            // Every covered date is listed, even when nothing runs on it.
            let active = services_by_date.entry(date.into()).or_default();
            if runs_on(calendar, date) {
                active.push(service_key);
            }
        }
    }

    for calendar_date in calendar_dates.unwrap_or_default() {
        let service_key = ServiceKey::derive(&calendar_date.service_id);
        let date = ServiceDate::from(calendar_date.date);
        match calendar_date.exception_type {
            GtfsExceptionType::Added => {
                services_by_date.entry(date).or_default().push(service_key);
            }
            GtfsExceptionType::Deleted => {
                let Some(active) = services_by_date.get_mut(&date) else {
                    continue;
                };
                if let Some(position) = active.iter().position(|key| *key == service_key) {
                    active.remove(position);
                }
            }
        }
    }

    log::info!("Expanded calendars to {} dates.", services_by_date.len());
    Ok(services_by_date)
}
