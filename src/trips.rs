use std::collections::HashMap;

use crate::gtfs_tables::GtfsTrip;
use crate::keys::{RouteKey, ServiceKey, TripKey};
use crate::routes::RouteCatalog;

#[derive(Debug, Clone)]
pub struct LoadedTrip {
    pub key: TripKey,
    pub raw_id: String,
    pub route_key: RouteKey,
    pub service_key: ServiceKey,
    pub shape_id: Option<String>,
    pub headsign: Option<String>,
    pub short_name: Option<String>,
    pub block_id: Option<String>,
    pub direction_id: Option<u8>,
}

/// Trips whose route is known, in trips.txt order.
#[derive(Debug, Default)]
pub struct TripCatalog {
    pub trips: Vec<LoadedTrip>,
    index_by_key: HashMap<TripKey, usize>,
    /// Every `trip_id` of trips.txt, including dropped trips.
    pub keys_by_raw_id: HashMap<String, TripKey>,
    pub dropped_unknown_route: u64,
}

impl TripCatalog {
    pub fn index_of(&self, key: &TripKey) -> Option<usize> {
        self.index_by_key.get(key).copied()
    }
}

/// Loads trips, dropping those that refer to a route missing from the catalog.
pub fn load_trips(trips: &[GtfsTrip], routes: &RouteCatalog) -> TripCatalog {
    let mut catalog = TripCatalog::default();
    for trip in trips {
        let key = TripKey::derive(&trip.id);
        catalog.keys_by_raw_id.insert(trip.id.clone(), key);

        let route_key = RouteKey::derive(&trip.route_id);
        if !routes.contains_key(&route_key) {
            log::debug!(
                "Trip {} refers to non-existent route {}; dropped.",
                trip.id,
                trip.route_id
            );
            catalog.dropped_unknown_route += 1;
            continue;
        }

        let loaded = LoadedTrip {
            key,
            raw_id: trip.id.clone(),
            route_key,
            service_key: ServiceKey::derive(&trip.service_id),
            shape_id: trip.shape_id.clone(),
            headsign: trip.headsign.clone(),
            short_name: trip.short_name.clone(),
            block_id: trip.block_id.clone(),
            direction_id: trip.direction_id,
        };
        // A repeated trip_id keeps its first position with the latest data.
        match catalog.index_by_key.get(&key) {
            Some(&index) => catalog.trips[index] = loaded,
            None => {
                catalog.index_by_key.insert(key, catalog.trips.len());
                catalog.trips.push(loaded);
            }
        }
    }
    log::info!(
        "Loaded {} trips, dropped {} with unknown routes.",
        catalog.trips.len(),
        catalog.dropped_unknown_route
    );
    catalog
}
