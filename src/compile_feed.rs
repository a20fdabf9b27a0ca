use std::collections::HashMap;

use crate::calendar::expand_calendar;
use crate::error::CompileError;
use crate::gtfs_tables::GtfsTables;
use crate::gtfs_time::ServiceDate;
use crate::itineraries::{compile_itineraries, HourBuckets, Itinerary, SampleTrips, TripSummary};
use crate::keys::{ItineraryKey, RouteKey, RouteServiceKey, ServiceKey, ShapeKey, TripKey};
use crate::routes::{build_route_catalog, Route};
use crate::shapes::{compile_shapes, Polyline};
use crate::stop_times::attach_stop_times;
use crate::stops::{build_stop_catalog, Stop};
use crate::trips::load_trips;

/// Everything the serving side needs, built once per run.
#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, Debug, Default)]
pub struct CompiledFeed {
    pub services_by_date: HashMap<ServiceDate, Vec<ServiceKey>>,
    pub routes: HashMap<RouteKey, Route>,
    pub shapes: HashMap<ShapeKey, Polyline>,
    /// Keyed by raw `stop_id`.
    pub stops: HashMap<String, Stop>,
    pub trips: HashMap<TripKey, TripSummary>,
    /// Raw `trip_id` → key, for every row of trips.txt.
    pub trip_keys_by_id: HashMap<String, TripKey>,
    pub itineraries: HashMap<ItineraryKey, Itinerary>,
    pub trips_by_hour: HashMap<RouteServiceKey, HourBuckets>,
    pub sample_trips: HashMap<RouteKey, SampleTrips>,
    pub stats: CompileStats,
}

/// Records that were dropped without aborting, and output sizes.
#[derive(
    rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, serde::Serialize, Debug, Default, Clone, PartialEq, Eq,
)]
#[rkyv(derive(Debug))]
pub struct CompileStats {
    pub skipped_non_stop_locations: u64,
    pub trips_with_unknown_route: u64,
    pub stop_times_with_unknown_trip: u64,
    pub stop_times_with_unknown_stop: u64,
    pub trips_without_stop_times: u64,
    pub conflicting_itinerary_shapes: u64,
    pub compiled_trips: u64,
    pub itineraries: u64,
}

/// Runs every stage in order. The first fatal error aborts the run and no
/// feed is returned.
pub fn compile_feed(tables: &GtfsTables) -> Result<CompiledFeed, CompileError> {
    log::info!("Expanding calendars.");
    let services_by_date =
        expand_calendar(tables.calendars.as_deref(), tables.calendar_dates.as_deref())?;

    log::info!("Building routes, shapes and stops.");
    let routes = build_route_catalog(&tables.routes)?;
    let shapes = compile_shapes(tables.shapes.as_deref());
    let stops = build_stop_catalog(&tables.stops)?;

    log::info!("Loading trips.");
    let trips = load_trips(&tables.trips, &routes);
    let trip_keys_by_id = trips.keys_by_raw_id.clone();
    let trips_with_unknown_route = trips.dropped_unknown_route;

    log::info!("Attaching stop times.");
    let attached = attach_stop_times(&tables.stop_times, trips, &stops);
    let stop_times_with_unknown_trip = attached.dropped_unknown_trip;
    let stop_times_with_unknown_stop = attached.dropped_unknown_stop;

    log::info!("Compiling itineraries.");
    let compiled = compile_itineraries(attached, &stops)?;

    let stats = CompileStats {
        skipped_non_stop_locations: stops.skipped,
        trips_with_unknown_route,
        stop_times_with_unknown_trip,
        stop_times_with_unknown_stop,
        trips_without_stop_times: compiled.dropped_without_stop_times,
        conflicting_itinerary_shapes: compiled.conflicting_shapes,
        compiled_trips: compiled.trips.len() as u64,
        itineraries: compiled.itineraries.len() as u64,
    };
    log::info!("Compile stats: {:?}", stats);

    Ok(CompiledFeed {
        services_by_date,
        routes,
        shapes,
        stops: stops.into_published(),
        trips: compiled.trips,
        trip_keys_by_id,
        itineraries: compiled.itineraries,
        trips_by_hour: compiled.trips_by_hour,
        sample_trips: compiled.sample_trips,
        stats,
    })
}
