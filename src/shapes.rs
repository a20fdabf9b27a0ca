use std::collections::HashMap;

use crate::gtfs_tables::GtfsShapePoint;
use crate::keys::ShapeKey;

#[derive(
    rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, serde::Serialize, Debug, Clone, Copy, PartialEq,
)]
#[rkyv(derive(Debug))]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

/// Shape vertices, ordered by `shape_pt_sequence`.
pub type Polyline = Vec<LonLat>;

pub type ShapeCatalog = HashMap<ShapeKey, Polyline>;

/// Groups shape points by shape and orders each polyline by sequence.
/// A feed without shapes.txt gets an empty catalog.
pub fn compile_shapes(points: Option<&[GtfsShapePoint]>) -> ShapeCatalog {
    let Some(points) = points else {
        log::info!("No shapes.txt file found. Shapes are skipped.");
        return ShapeCatalog::new();
    };

    let mut grouped: HashMap<ShapeKey, Vec<&GtfsShapePoint>> = HashMap::new();
    for point in points {
        grouped
            .entry(ShapeKey::derive(&point.shape_id))
            .or_default()
            .push(point);
    }

    let catalog: ShapeCatalog = grouped
        .into_iter()
        .map(|(key, mut points)| {
            points.sort_by_key(|point| point.sequence);
            let polyline = points
                .iter()
                .map(|point| LonLat {
                    lon: point.longitude,
                    lat: point.latitude,
                })
                .collect();
            (key, polyline)
        })
        .collect();
    log::info!("Compiled {} shapes.", catalog.len());
    catalog
}
