//! Plain GTFS table rows, as read from the feed and before any validation.
//!
//! The pipeline stages only ever see these structs, never the reader's own
//! types, so they can be built by hand in tests.

use chrono::NaiveDate;

use crate::gtfs_time::GtfsTime;

#[derive(Debug, Clone, Default)]
pub struct GtfsTables {
    /// `None` when calendar.txt is absent.
    pub calendars: Option<Vec<GtfsCalendar>>,
    /// `None` when calendar_dates.txt is absent.
    pub calendar_dates: Option<Vec<GtfsCalendarDate>>,
    pub routes: Vec<GtfsRoute>,
    /// `None` when shapes.txt is absent.
    pub shapes: Option<Vec<GtfsShapePoint>>,
    pub stops: Vec<GtfsStop>,
    pub trips: Vec<GtfsTrip>,
    pub stop_times: Vec<GtfsStopTime>,
}

#[derive(Debug, Clone)]
pub struct GtfsCalendar {
    pub service_id: String,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct GtfsCalendarDate {
    pub service_id: String,
    pub date: NaiveDate,
    pub exception_type: GtfsExceptionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GtfsExceptionType {
    Added,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct GtfsRoute {
    pub id: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub route_type: RouteType,
}

#[derive(
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
)]
#[rkyv(derive(Debug))]
pub enum RouteType {
    Tramway,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
    Coach,
    Air,
    Taxi,
    Other(i16),
}

#[derive(Debug, Clone)]
pub struct GtfsShapePoint {
    pub shape_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub sequence: u64,
}

#[derive(Debug, Clone)]
pub struct GtfsStop {
    pub id: String,
    pub name: Option<String>,
    /// True for `location_type` empty or `0`.
    pub is_stop_point: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct GtfsTrip {
    pub id: String,
    pub route_id: String,
    pub service_id: String,
    pub shape_id: Option<String>,
    pub headsign: Option<String>,
    pub short_name: Option<String>,
    pub block_id: Option<String>,
    pub direction_id: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct GtfsStopTime {
    pub trip_id: String,
    pub arrival_time: Option<GtfsTime>,
    pub departure_time: Option<GtfsTime>,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub stop_headsign: Option<String>,
}
