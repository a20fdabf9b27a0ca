//! Itinerary deduplication and temporal indexing of trips.
//!
//! Trips of a route that visit the same ordered stops share one itinerary, so
//! stop lists are stored once per itinerary and a trip only keeps its timing
//! offsets. Trips are also bucketed by route, service and departure hour.

use std::collections::HashMap;

use indicatif::ProgressIterator;

use crate::error::CompileError;
use crate::gtfs_time::GtfsTime;
use crate::keys::{
    ItineraryKey, RouteKey, RouteServiceKey, SequenceDigest, ServiceKey, ShapeKey, TripKey,
};
use crate::progress::progress_style;
use crate::stop_times::{AttachedTrips, StopTimeEvent};
use crate::stops::StopCatalog;
use crate::trips::LoadedTrip;

pub const SAMPLE_TRIPS_PER_ITINERARY: usize = 3;

#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[rkyv(derive(Debug))]
pub struct ItineraryStop {
    pub stop_id: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[rkyv(derive(Debug))]
pub struct Itinerary {
    pub key: ItineraryKey,
    pub stops: Vec<ItineraryStop>,
    pub shape_key: Option<ShapeKey>,
    pub name: String,
}

#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[rkyv(derive(Debug))]
pub struct TripSummary {
    pub key: TripKey,
    pub raw_id: String,
    pub route_key: RouteKey,
    pub service_key: ServiceKey,
    pub itinerary_key: ItineraryKey,
    /// Seconds since the first time of the trip, one entry per stop.
    pub timing_list: Vec<u32>,
    pub departure_time: GtfsTime,
    pub departure_hour: u32,
    pub shape_key: Option<ShapeKey>,
    pub headsign: Option<String>,
    pub short_name: Option<String>,
    pub block_id: Option<String>,
    pub direction_id: Option<u8>,
    /// Per-stop headsigns; empty when no stop time of the trip has one.
    pub stop_headsigns: Vec<Option<String>>,
}

/// Departure hour → trip keys, ascending by departure time.
pub type HourBuckets = HashMap<u32, Vec<TripKey>>;

pub type SampleTrips = HashMap<ItineraryKey, Vec<TripKey>>;

#[derive(Debug, Default)]
pub struct CompiledItineraries {
    pub trips: HashMap<TripKey, TripSummary>,
    pub itineraries: HashMap<ItineraryKey, Itinerary>,
    pub trips_by_hour: HashMap<RouteServiceKey, HourBuckets>,
    pub sample_trips: HashMap<RouteKey, SampleTrips>,
    pub dropped_without_stop_times: u64,
    pub conflicting_shapes: u64,
}

/// Builds itineraries and indexes one trip at a time; [`Self::finish`]
/// publishes the result.
pub struct ItineraryCompiler<'a> {
    stops: &'a StopCatalog,
    compiled: CompiledItineraries,
}

impl<'a> ItineraryCompiler<'a> {
    pub fn new(stops: &'a StopCatalog) -> Self {
        ItineraryCompiler {
            stops,
            compiled: CompiledItineraries::default(),
        }
    }

    pub fn add_trip(
        &mut self,
        trip: LoadedTrip,
        mut events: Vec<StopTimeEvent>,
    ) -> Result<(), CompileError> {
        events.sort_by_key(|event| event.stop_sequence);
        let (Some(first), Some(last)) = (events.first(), events.last()) else {
            log::debug!("Trip {} has no usable stop times; dropped.", trip.raw_id);
            self.compiled.dropped_without_stop_times += 1;
            return Ok(());
        };
        let departure_time = first
            .departure_time
            .ok_or_else(|| missing_time(&trip, "departure_time", first))?;
        if last.arrival_time.is_none() {
            return Err(missing_time(&trip, "arrival_time", last));
        }
        let timing_list = timing_offsets(&events);

        let itinerary_key = ItineraryKey {
            route: trip.route_key,
            sequence: sequence_digest(&events),
        };
        let shape_key = trip
            .shape_id
            .as_deref()
            .filter(|shape_id| !shape_id.is_empty())
            .map(ShapeKey::derive);

        let stops = self.stops;
        let itinerary = self
            .compiled
            .itineraries
            .entry(itinerary_key)
            .or_insert_with(|| Itinerary {
                key: itinerary_key,
                stops: events
                    .iter()
                    .map(|event| ItineraryStop {
                        stop_id: event.stop_id.as_str().to_string(),
                        lat: event.stop_lat,
                        lon: event.stop_lon,
                    })
                    .collect(),
                shape_key: None,
                name: itinerary_name(stops, &events),
            });
        if let Some(shape_key) = shape_key {
            // The last trip with a shape decides the itinerary's shape.
            if itinerary.shape_key.is_some_and(|previous| previous != shape_key) {
                log::warn!(
                    "Trips of itinerary {} use different shapes; using the shape of trip {}.",
                    itinerary_key,
                    trip.raw_id
                );
                self.compiled.conflicting_shapes += 1;
            }
            itinerary.shape_key = Some(shape_key);
        }

        let samples = self
            .compiled
            .sample_trips
            .entry(trip.route_key)
            .or_default()
            .entry(itinerary_key)
            .or_default();
        if samples.len() < SAMPLE_TRIPS_PER_ITINERARY {
            samples.push(trip.key);
        }

        let departure_hour = departure_time.hour();
        self.compiled
            .trips_by_hour
            .entry(RouteServiceKey {
                route: trip.route_key,
                service: trip.service_key,
            })
            .or_default()
            .entry(departure_hour)
            .or_default()
            .push(trip.key);

        let stop_headsigns = if events.iter().any(|event| event.stop_headsign.is_some()) {
            events
                .iter_mut()
                .map(|event| event.stop_headsign.take())
                .collect()
        } else {
            vec![]
        };

        self.compiled.trips.insert(
            trip.key,
            TripSummary {
                key: trip.key,
                raw_id: trip.raw_id,
                route_key: trip.route_key,
                service_key: trip.service_key,
                itinerary_key,
                timing_list,
                departure_time,
                departure_hour,
                shape_key,
                headsign: trip.headsign,
                short_name: trip.short_name,
                block_id: trip.block_id,
                direction_id: trip.direction_id,
                stop_headsigns,
            },
        );
        Ok(())
    }

    /// Sorts every hour bucket by departure time and returns the result.
    pub fn finish(self) -> CompiledItineraries {
        let mut compiled = self.compiled;
        let trips = &compiled.trips;
        for buckets in compiled.trips_by_hour.values_mut() {
            for bucket in buckets.values_mut() {
                bucket.sort_by_key(|key| trips.get(key).map(|trip| trip.departure_time));
            }
        }
        compiled
    }
}

/// Compiles every attached trip, in trips.txt order.
pub fn compile_itineraries(
    attached: AttachedTrips,
    stops: &StopCatalog,
) -> Result<CompiledItineraries, CompileError> {
    let mut compiler = ItineraryCompiler::new(stops);
    for (trip, events) in attached
        .trips
        .trips
        .into_iter()
        .zip(attached.events)
        .progress_with_style(progress_style())
        .with_message("Compile itineraries.")
        .with_finish(indicatif::ProgressFinish::AndLeave)
    {
        compiler.add_trip(trip, events)?;
    }
    let compiled = compiler.finish();
    log::info!(
        "|itineraries| = {}, |trips| = {}, dropped {} trips without stop times.",
        compiled.itineraries.len(),
        compiled.trips.len(),
        compiled.dropped_without_stop_times
    );
    Ok(compiled)
}

fn missing_time(trip: &LoadedTrip, field: &'static str, event: &StopTimeEvent) -> CompileError {
    CompileError::MissingTripTime {
        trip_id: trip.raw_id.clone(),
        field,
        stop_sequence: event.stop_sequence,
    }
}

/// Running offsets from the first known time. Arrival is preferred over
/// departure; stops without any time repeat the previous offset. The total
/// never decreases.
pub fn timing_offsets(events: &[StopTimeEvent]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(events.len());
    let mut total = 0;
    let mut last_time: Option<GtfsTime> = None;
    for event in events {
        if let Some(time) = event.arrival_time.or(event.departure_time) {
            if let Some(last_time) = last_time {
                total += time.seconds().saturating_sub(last_time.seconds());
            }
            last_time = Some(time);
        }
        offsets.push(total);
    }
    offsets
}

/// Digest of the ordered (stop_id, lat, lon) tuples.
pub fn sequence_digest(events: &[StopTimeEvent]) -> SequenceDigest {
    let identity = events
        .iter()
        .map(|event| format!("{}___{}___{}", event.stop_id.as_str(), event.stop_lat, event.stop_lon))
        .collect::<Vec<_>>()
        .join("-");
    SequenceDigest::derive(&identity)
}

fn stop_name<'a>(stops: &'a StopCatalog, event: Option<&StopTimeEvent>) -> &'a str {
    event
        .and_then(|event| stops.get(&event.stop_id))
        .map_or("", |stop| stop.name.as_str())
}

/// `"<first stop> → <last stop>, <n> stops"`
fn itinerary_name(stops: &StopCatalog, events: &[StopTimeEvent]) -> String {
    format!(
        "{} → {}, {} stops",
        stop_name(stops, events.first()),
        stop_name(stops, events.last()),
        events.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_tables::GtfsStop;
    use crate::keys::ServiceKey;
    use crate::stops::{build_stop_catalog, StopId};

    fn stops() -> StopCatalog {
        let stop = |id: &str, name: &str, lat: f64| GtfsStop {
            id: id.to_string(),
            name: Some(name.to_string()),
            is_stop_point: true,
            latitude: Some(lat),
            longitude: Some(13.0),
        };
        build_stop_catalog(&[
            stop("A", "Alpha", 52.1),
            stop("B", "Bravo", 52.2),
            stop("C", "Charlie", 52.3),
        ])
        .unwrap()
    }

    fn trip(id: &str, route_id: &str, shape_id: Option<&str>) -> LoadedTrip {
        LoadedTrip {
            key: TripKey::derive(id),
            raw_id: id.to_string(),
            route_key: RouteKey::derive(route_id),
            service_key: ServiceKey::derive("WK"),
            shape_id: shape_id.map(str::to_string),
            headsign: None,
            short_name: None,
            block_id: None,
            direction_id: None,
        }
    }

    fn at(hours: u32, minutes: u32) -> Option<GtfsTime> {
        Some(GtfsTime::from_hms(hours, minutes, 0))
    }

    fn event(stops: &StopCatalog, stop_id: &str, sequence: u32, time: Option<GtfsTime>) -> StopTimeEvent {
        let stop = stops.get(&StopId::new(stop_id)).unwrap();
        StopTimeEvent {
            arrival_time: time,
            departure_time: time,
            stop_id: StopId::new(stop_id),
            stop_lat: stop.lat,
            stop_lon: stop.lon,
            stop_sequence: sequence,
            stop_headsign: None,
        }
    }

    fn run(stops: &StopCatalog, trips: Vec<(LoadedTrip, Vec<StopTimeEvent>)>) -> CompiledItineraries {
        let mut compiler = ItineraryCompiler::new(stops);
        for (trip, events) in trips {
            compiler.add_trip(trip, events).unwrap();
        }
        compiler.finish()
    }

    fn abc(stops: &StopCatalog, start_hour: u32, start_minute: u32) -> Vec<StopTimeEvent> {
        let after = |minutes: u32| at(start_hour, start_minute + minutes);
        vec![
            event(stops, "A", 1, after(0)),
            event(stops, "B", 2, after(5)),
            event(stops, "C", 3, after(12)),
        ]
    }

    #[test]
    fn timing_offsets_follow_first_time() {
        let stops = stops();
        assert_eq!(timing_offsets(&abc(&stops, 8, 0)), vec![0, 300, 720]);
    }

    #[test]
    fn stops_without_time_inherit_previous_offset() {
        let stops = stops();
        let events = vec![
            event(&stops, "A", 1, at(8, 0)),
            event(&stops, "B", 2, None),
            event(&stops, "C", 3, at(8, 10)),
        ];
        assert_eq!(timing_offsets(&events), vec![0, 0, 600]);
    }

    #[test]
    fn arrival_is_preferred_over_departure() {
        let stops = stops();
        let mut events = abc(&stops, 8, 0);
        events[1].arrival_time = None;
        events[1].departure_time = Some(GtfsTime::from_hms(8, 6, 0));
        events[2].departure_time = Some(GtfsTime::from_hms(8, 20, 0));
        assert_eq!(timing_offsets(&events), vec![0, 360, 720]);
    }

    #[test]
    fn offsets_never_decrease() {
        let stops = stops();
        let events = vec![
            event(&stops, "A", 1, at(8, 10)),
            event(&stops, "B", 2, at(8, 5)),
            event(&stops, "C", 3, at(8, 7)),
        ];
        assert_eq!(timing_offsets(&events), vec![0, 0, 120]);
    }

    #[test]
    fn events_are_sorted_by_sequence() {
        let stops = stops();
        let mut events = abc(&stops, 8, 0);
        events.reverse();
        let compiled = run(&stops, vec![(trip("T1", "R1", None), events)]);
        let summary = &compiled.trips[&TripKey::derive("T1")];
        assert_eq!(summary.timing_list, vec![0, 300, 720]);
        assert_eq!(summary.departure_time, GtfsTime::from_hms(8, 0, 0));
        let itinerary = &compiled.itineraries[&summary.itinerary_key];
        let ids: Vec<&str> = itinerary.stops.iter().map(|stop| stop.stop_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(itinerary.name, "Alpha → Charlie, 3 stops");
    }

    #[test]
    fn identical_stop_sequences_share_an_itinerary() {
        let stops = stops();
        let compiled = run(
            &stops,
            vec![
                (trip("T1", "R1", None), abc(&stops, 8, 0)),
                (trip("T2", "R1", None), abc(&stops, 9, 0)),
            ],
        );
        assert_eq!(compiled.itineraries.len(), 1);
        assert_eq!(
            compiled.trips[&TripKey::derive("T1")].itinerary_key,
            compiled.trips[&TripKey::derive("T2")].itinerary_key
        );
    }

    #[test]
    fn one_differing_stop_gives_a_new_itinerary() {
        let stops = stops();
        let mut other = abc(&stops, 9, 0);
        other[1] = event(&stops, "A", 2, at(9, 5));
        let compiled = run(
            &stops,
            vec![
                (trip("T1", "R1", None), abc(&stops, 8, 0)),
                (trip("T2", "R1", None), other),
            ],
        );
        assert_eq!(compiled.itineraries.len(), 2);
    }

    #[test]
    fn itineraries_are_scoped_by_route() {
        let stops = stops();
        let compiled = run(
            &stops,
            vec![
                (trip("T1", "R1", None), abc(&stops, 8, 0)),
                (trip("T2", "R2", None), abc(&stops, 8, 0)),
            ],
        );
        assert_eq!(compiled.itineraries.len(), 2);
        assert_eq!(compiled.sample_trips.len(), 2);
    }

    #[test]
    fn only_first_three_trips_are_samples() {
        let stops = stops();
        let trips = (0..5)
            .map(|i| (trip(&format!("T{i}"), "R1", None), abc(&stops, 6 + i, 0)))
            .collect();
        let compiled = run(&stops, trips);
        let samples = &compiled.sample_trips[&RouteKey::derive("R1")];
        assert_eq!(samples.len(), 1);
        let kept = samples.values().next().unwrap();
        assert_eq!(
            kept,
            &vec![TripKey::derive("T0"), TripKey::derive("T1"), TripKey::derive("T2")]
        );
    }

    #[test]
    fn hour_buckets_are_sorted_by_departure() {
        let stops = stops();
        let compiled = run(
            &stops,
            vec![
                (trip("T0810", "R1", None), abc(&stops, 8, 10)),
                (trip("T0805", "R1", None), abc(&stops, 8, 5)),
                (trip("T0900", "R1", None), abc(&stops, 9, 0)),
            ],
        );
        let buckets = &compiled.trips_by_hour[&RouteServiceKey {
            route: RouteKey::derive("R1"),
            service: ServiceKey::derive("WK"),
        }];
        assert_eq!(
            buckets[&8],
            vec![TripKey::derive("T0805"), TripKey::derive("T0810")]
        );
        assert_eq!(buckets[&9], vec![TripKey::derive("T0900")]);
    }

    #[test]
    fn post_midnight_departures_get_their_own_hour() {
        let stops = stops();
        let compiled = run(&stops, vec![(trip("LATE", "R1", None), abc(&stops, 24, 30))]);
        assert_eq!(compiled.trips[&TripKey::derive("LATE")].departure_hour, 24);
    }

    #[test]
    fn last_shape_wins_and_conflict_is_counted() {
        let stops = stops();
        let compiled = run(
            &stops,
            vec![
                (trip("T1", "R1", Some("SH1")), abc(&stops, 8, 0)),
                (trip("T2", "R1", Some("")), abc(&stops, 9, 0)),
                (trip("T3", "R1", Some("SH2")), abc(&stops, 10, 0)),
            ],
        );
        let itinerary = compiled.itineraries.values().next().unwrap();
        assert_eq!(itinerary.shape_key, Some(ShapeKey::derive("SH2")));
        assert_eq!(compiled.conflicting_shapes, 1);
    }

    #[test]
    fn trips_without_events_are_dropped() {
        let stops = stops();
        let compiled = run(&stops, vec![(trip("EMPTY", "R1", None), vec![])]);
        assert!(compiled.trips.is_empty());
        assert_eq!(compiled.dropped_without_stop_times, 1);
    }

    #[test]
    fn missing_first_departure_is_fatal() {
        let stops = stops();
        let mut events = abc(&stops, 8, 0);
        events[0].departure_time = None;
        let mut compiler = ItineraryCompiler::new(&stops);
        let result = compiler.add_trip(trip("T1", "R1", None), events);
        assert!(matches!(
            result,
            Err(CompileError::MissingTripTime { field: "departure_time", stop_sequence: 1, .. })
        ));
    }

    #[test]
    fn missing_last_arrival_is_fatal() {
        let stops = stops();
        let mut events = abc(&stops, 8, 0);
        events[2].arrival_time = None;
        let mut compiler = ItineraryCompiler::new(&stops);
        assert!(compiler.add_trip(trip("T1", "R1", None), events).is_err());
    }

    #[test]
    fn stop_headsigns_are_kept_when_present() {
        let stops = stops();
        let mut events = abc(&stops, 8, 0);
        events[0].stop_headsign = Some("Charlie".to_string());
        let compiled = run(&stops, vec![(trip("T1", "R1", None), events)]);
        assert_eq!(
            compiled.trips[&TripKey::derive("T1")].stop_headsigns,
            vec![Some("Charlie".to_string()), None, None]
        );
    }
}
