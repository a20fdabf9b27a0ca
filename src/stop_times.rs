use indicatif::ProgressIterator;

use crate::gtfs_tables::GtfsStopTime;
use crate::gtfs_time::GtfsTime;
use crate::keys::TripKey;
use crate::progress::progress_style;
use crate::stops::{StopCatalog, StopId};
use crate::trips::TripCatalog;

#[derive(Debug, Clone)]
pub struct StopTimeEvent {
    pub arrival_time: Option<GtfsTime>,
    pub departure_time: Option<GtfsTime>,
    pub stop_id: StopId,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub stop_sequence: u32,
    pub stop_headsign: Option<String>,
}

/// Trips together with their stop time events. `events[i]` belongs to
/// `trips.trips[i]` and is in file order, not yet sorted.
pub struct AttachedTrips {
    pub trips: TripCatalog,
    pub events: Vec<Vec<StopTimeEvent>>,
    pub dropped_unknown_trip: u64,
    pub dropped_unknown_stop: u64,
}

/// Attaches every stop time to its trip. Stop times referring to a trip that
/// was not loaded or to a stop that is not in the catalog are dropped.
pub fn attach_stop_times(
    stop_times: &[GtfsStopTime],
    trips: TripCatalog,
    stops: &StopCatalog,
) -> AttachedTrips {
    let mut attached = AttachedTrips {
        events: vec![vec![]; trips.trips.len()],
        trips,
        dropped_unknown_trip: 0,
        dropped_unknown_stop: 0,
    };

    for stop_time in stop_times
        .iter()
        .progress_with_style(progress_style())
        .with_message("Attach stop times to trips.")
        .with_finish(indicatif::ProgressFinish::AndLeave)
    {
        let Some(trip_index) = attached
            .trips
            .index_of(&TripKey::derive(&stop_time.trip_id))
        else {
            log::debug!(
                "Stop time refers to unknown trip {}; dropped.",
                stop_time.trip_id
            );
            attached.dropped_unknown_trip += 1;
            continue;
        };
        let stop_id = StopId::new(&stop_time.stop_id);
        let Some(stop) = stops.get(&stop_id) else {
            log::debug!(
                "Stop time of trip {} refers to unknown stop {}; dropped.",
                stop_time.trip_id,
                stop_time.stop_id
            );
            attached.dropped_unknown_stop += 1;
            continue;
        };
        attached.events[trip_index].push(StopTimeEvent {
            arrival_time: stop_time.arrival_time,
            departure_time: stop_time.departure_time,
            stop_id,
            stop_lat: stop.lat,
            stop_lon: stop.lon,
            stop_sequence: stop_time.stop_sequence,
            stop_headsign: stop_time.stop_headsign.clone(),
        });
    }

    log::info!(
        "Attached stop times; dropped {} with unknown trips and {} with unknown stops.",
        attached.dropped_unknown_trip,
        attached.dropped_unknown_stop
    );
    attached
}
