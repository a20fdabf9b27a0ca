use std::collections::HashMap;

use ustr::{ustr, Ustr};

use crate::error::CompileError;
use crate::gtfs_tables::GtfsStop;

/// Raw `stop_id`. Stops keep their raw id as key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StopId(pub Ustr);

impl StopId {
    pub fn new(raw: &str) -> Self {
        StopId(ustr(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[rkyv(derive(Debug))]
pub struct Stop {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

pub struct StopCatalog {
    pub stops: HashMap<StopId, Stop>,
    /// Rows with a location_type other than stop/platform.
    pub skipped: u64,
}

impl StopCatalog {
    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn into_published(self) -> HashMap<String, Stop> {
        self.stops
            .into_values()
            .map(|stop| (stop.id.clone(), stop))
            .collect()
    }
}

/// Builds the catalog of boarding locations. Stations, entrances and other
/// location types are skipped; boarding locations need a position and a name.
pub fn build_stop_catalog(stops: &[GtfsStop]) -> Result<StopCatalog, CompileError> {
    let mut catalog = StopCatalog {
        stops: HashMap::with_capacity(stops.len()),
        skipped: 0,
    };
    for stop in stops {
        if !stop.is_stop_point {
            catalog.skipped += 1;
            continue;
        }
        let missing = |field| CompileError::MissingStopField {
            stop_id: stop.id.clone(),
            field,
        };
        let lat = stop.latitude.ok_or_else(|| missing("stop_lat"))?;
        let lon = stop.longitude.ok_or_else(|| missing("stop_lon"))?;
        let name = stop.name.clone().ok_or_else(|| missing("stop_name"))?;
        catalog.stops.insert(
            StopId::new(&stop.id),
            Stop {
                id: stop.id.clone(),
                lat,
                lon,
                name,
            },
        );
    }
    log::info!(
        "Loaded {} stops, skipped {} other locations.",
        catalog.stops.len(),
        catalog.skipped
    );
    Ok(catalog)
}
