//! Read-side lookups over a compiled feed, as used by the serving backend.

use crate::compile_feed::CompiledFeed;
use crate::gtfs_time::ServiceDate;
use crate::itineraries::{HourBuckets, Itinerary, SampleTrips, TripSummary};
use crate::keys::{ItineraryKey, RouteKey, RouteServiceKey, ServiceKey, TripKey};
use crate::routes::Route;

impl CompiledFeed {
    pub fn trip(&self, key: &TripKey) -> Option<&TripSummary> {
        self.trips.get(key)
    }

    pub fn trip_key(&self, raw_id: &str) -> Option<TripKey> {
        self.trip_keys_by_id.get(raw_id).copied()
    }

    /// `None` also for trips that exist in trips.txt but were dropped.
    pub fn trip_by_raw_id(&self, raw_id: &str) -> Option<&TripSummary> {
        self.trip_key(raw_id).and_then(|key| self.trip(&key))
    }

    pub fn itinerary(&self, key: &ItineraryKey) -> Option<&Itinerary> {
        self.itineraries.get(key)
    }

    pub fn route(&self, key: &RouteKey) -> Option<&Route> {
        self.routes.get(key)
    }

    pub fn route_by_raw_id(&self, raw_id: &str) -> Option<&Route> {
        self.route(&RouteKey::derive(raw_id))
    }

    pub fn service_keys_on(&self, date: ServiceDate) -> &[ServiceKey] {
        self.services_by_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn hour_buckets(&self, route: RouteKey, service: ServiceKey) -> Option<&HourBuckets> {
        self.trips_by_hour.get(&RouteServiceKey { route, service })
    }

    /// Hour buckets of a route for every service running on `date`, in the
    /// order the services are listed for that date.
    pub fn trips_by_date(&self, date: ServiceDate, route: RouteKey) -> Vec<&HourBuckets> {
        self.service_keys_on(date)
            .iter()
            .filter_map(|service| self.hour_buckets(route, *service))
            .collect()
    }

    pub fn sample_trips(&self, route: &RouteKey) -> Option<&SampleTrips> {
        self.sample_trips.get(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn trips_by_date_combines_active_services() {
        let route = RouteKey::derive("R1");
        let weekday = ServiceKey::derive("WK");
        let extra = ServiceKey::derive("EXTRA");
        let idle = ServiceKey::derive("IDLE");

        let mut feed = CompiledFeed::default();
        feed.services_by_date
            .insert(ServiceDate(20240304), vec![weekday, idle, extra]);
        feed.trips_by_hour.insert(
            RouteServiceKey {
                route,
                service: weekday,
            },
            HashMap::from([(8, vec![TripKey::derive("T1")])]),
        );
        feed.trips_by_hour.insert(
            RouteServiceKey {
                route,
                service: extra,
            },
            HashMap::from([(9, vec![TripKey::derive("T2")])]),
        );

        let buckets = feed.trips_by_date(ServiceDate(20240304), route);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0][&8], vec![TripKey::derive("T1")]);
        assert_eq!(buckets[1][&9], vec![TripKey::derive("T2")]);

        assert!(feed.trips_by_date(ServiceDate(20240305), route).is_empty());
    }

    #[test]
    fn unknown_raw_ids_resolve_to_none() {
        let feed = CompiledFeed::default();
        assert!(feed.trip_by_raw_id("T1").is_none());
        assert!(feed.route_by_raw_id("R1").is_none());
        assert!(feed.service_keys_on(ServiceDate(20240101)).is_empty());
    }
}
