//! Fatal compile errors.
//!
//! Any of these aborts the whole run; nothing is written. Referential gaps
//! (unknown trips, stops, routes) are not errors and are only counted in
//! [`crate::compile_feed::CompileStats`].

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("could not read GTFS feed at {path:?}")]
    UnreadableFeed {
        path: PathBuf,
        #[source]
        source: gtfs_structures::Error,
    },

    /// A mandatory table is absent or one of its rows could not be parsed.
    #[error("could not read {file}")]
    UnreadableTable {
        file: &'static str,
        #[source]
        source: gtfs_structures::Error,
    },

    #[error("no calendar.txt or calendar_dates.txt found")]
    MissingCalendar,

    #[error("route {route_id} has neither route_short_name nor route_long_name")]
    MissingRouteName { route_id: String },

    #[error("stop {stop_id} is missing {field}")]
    MissingStopField {
        stop_id: String,
        field: &'static str,
    },

    #[error("trip {trip_id} has no {field} at stop_sequence {stop_sequence}")]
    MissingTripTime {
        trip_id: String,
        field: &'static str,
        stop_sequence: u32,
    },

    #[error("'{0}' is not a valid date; YYYYMMDD format is expected")]
    InvalidDate(String),
}
