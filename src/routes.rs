use std::collections::HashMap;

use crate::error::CompileError;
use crate::gtfs_tables::{GtfsRoute, RouteType};
use crate::keys::RouteKey;

#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[rkyv(derive(Debug))]
pub struct Route {
    pub key: RouteKey,
    pub raw_id: String,
    pub route_type: RouteType,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
}

pub type RouteCatalog = HashMap<RouteKey, Route>;

fn non_empty(name: Option<String>) -> Option<String> {
    name.filter(|name| !name.is_empty())
}

/// Builds the route catalog. A route needs a short or a long name; an empty
/// name counts as missing.
pub fn build_route_catalog(routes: &[GtfsRoute]) -> Result<RouteCatalog, CompileError> {
    let mut catalog = RouteCatalog::with_capacity(routes.len());
    for route in routes {
        let short_name = non_empty(route.short_name.clone());
        let long_name = non_empty(route.long_name.clone());
        if short_name.is_none() && long_name.is_none() {
            return Err(CompileError::MissingRouteName {
                route_id: route.id.clone(),
            });
        }
        let key = RouteKey::derive(&route.id);
        catalog.insert(
            key,
            Route {
                key,
                raw_id: route.id.clone(),
                route_type: route.route_type,
                short_name,
                long_name,
            },
        );
    }
    log::info!("Loaded {} routes.", catalog.len());
    Ok(catalog)
}
