use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::error::CompileError;

/// Seconds since the start of the service day. Hours can go past 23 for
/// trips running after midnight on the same service day.
#[derive(
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[rkyv(derive(Debug))]
pub struct GtfsTime(pub u32);

impl GtfsTime {
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        GtfsTime(hours * 3600 + minutes * 60 + seconds)
    }

    pub fn seconds(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 3600
    }
}

impl fmt::Display for GtfsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

impl serde::Serialize for GtfsTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A calendar day, stored as `YYYYMMDD`.
#[derive(
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[rkyv(derive(Debug, Hash, PartialEq, Eq))]
pub struct ServiceDate(pub u32);

impl ServiceDate {
    pub fn from_naive(date: NaiveDate) -> Self {
        ServiceDate(date.year() as u32 * 10_000 + date.month() * 100 + date.day())
    }
}

impl From<NaiveDate> for ServiceDate {
    fn from(date: NaiveDate) -> Self {
        ServiceDate::from_naive(date)
    }
}

impl FromStr for ServiceDate {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(ServiceDate::from_naive)
            .map_err(|_| CompileError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_run_past_midnight() {
        let time = GtfsTime::from_hms(25, 10, 30);
        assert_eq!(time.seconds(), 25 * 3600 + 630);
        assert_eq!(time.hour(), 25);
        assert_eq!(GtfsTime::from_hms(8, 5, 0), GtfsTime(8 * 3600 + 300));
    }

    #[test]
    fn formats_past_midnight() {
        assert_eq!(GtfsTime::from_hms(24, 1, 2).to_string(), "24:01:02");
        assert_eq!(GtfsTime(0).to_string(), "00:00:00");
    }

    #[test]
    fn service_date_round_trips_through_text() {
        let date: ServiceDate = "20240304".parse().unwrap();
        assert_eq!(date, ServiceDate(20240304));
        assert_eq!(date.to_string(), "20240304");
        assert_eq!(
            ServiceDate::from(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()),
            date
        );
        assert!("2024-03-04".parse::<ServiceDate>().is_err());
    }
}
