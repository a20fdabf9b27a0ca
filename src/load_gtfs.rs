use std::path::Path;

use crate::error::CompileError;
use crate::gtfs_tables::*;
use crate::gtfs_time::GtfsTime;

type TableResult<T> = Result<Vec<T>, gtfs_structures::Error>;

/// Reads a GTFS directory into plain table rows.
///
/// Mandatory tables that are missing or contain an unparsable row are fatal.
/// Times, dates and numbers are parsed by the reader, so malformed values
/// surface as [`CompileError::UnreadableTable`].
/// At least one of calendar.txt and calendar_dates.txt has to be present.
pub fn load_gtfs_tables(gtfs_folder_path: &Path) -> Result<GtfsTables, CompileError> {
    log::info!("Loading original GTFS data from {:?}", gtfs_folder_path);
    let gtfs = gtfs_structures::RawGtfs::from_path(gtfs_folder_path).map_err(|source| {
        CompileError::UnreadableFeed {
            path: gtfs_folder_path.to_path_buf(),
            source,
        }
    })?;

    log::info!("Preparing calendars.");
    let calendars = optional_table("calendar.txt", gtfs.calendar)?.map(|calendars| {
        calendars
            .into_iter()
            .map(|calendar| GtfsCalendar {
                service_id: calendar.id,
                monday: calendar.monday,
                tuesday: calendar.tuesday,
                wednesday: calendar.wednesday,
                thursday: calendar.thursday,
                friday: calendar.friday,
                saturday: calendar.saturday,
                sunday: calendar.sunday,
                start_date: calendar.start_date,
                end_date: calendar.end_date,
            })
            .collect()
    });

    let calendar_dates =
        optional_table("calendar_dates.txt", gtfs.calendar_dates)?.map(|calendar_dates| {
            calendar_dates
                .into_iter()
                .map(|calendar_date| GtfsCalendarDate {
                    service_id: calendar_date.service_id,
                    date: calendar_date.date,
                    exception_type: match calendar_date.exception_type {
                        gtfs_structures::Exception::Added => GtfsExceptionType::Added,
                        gtfs_structures::Exception::Deleted => GtfsExceptionType::Deleted,
                    },
                })
                .collect()
        });

    if calendars.is_none() && calendar_dates.is_none() {
        return Err(CompileError::MissingCalendar);
    }

    log::info!("Preparing routes.");
    let mut routes = vec![];
    for route in mandatory_table("routes.txt", gtfs.routes)? {
        routes.push(GtfsRoute {
            id: route.id,
            short_name: route.short_name,
            long_name: route.long_name,
            route_type: match route.route_type {
                gtfs_structures::RouteType::Tramway => RouteType::Tramway,
                gtfs_structures::RouteType::Subway => RouteType::Subway,
                gtfs_structures::RouteType::Rail => RouteType::Rail,
                gtfs_structures::RouteType::Bus => RouteType::Bus,
                gtfs_structures::RouteType::Ferry => RouteType::Ferry,
                gtfs_structures::RouteType::CableCar => RouteType::CableCar,
                gtfs_structures::RouteType::Gondola => RouteType::Gondola,
                gtfs_structures::RouteType::Funicular => RouteType::Funicular,
                gtfs_structures::RouteType::Coach => RouteType::Coach,
                gtfs_structures::RouteType::Air => RouteType::Air,
                gtfs_structures::RouteType::Taxi => RouteType::Taxi,
                gtfs_structures::RouteType::Other(other) => RouteType::Other(other),
            },
        });
    }

    log::info!("Preparing shapes.");
    let shapes = optional_table("shapes.txt", gtfs.shapes)?.map(|shapes| {
        shapes
            .into_iter()
            .map(|point| GtfsShapePoint {
                shape_id: point.id,
                latitude: point.latitude,
                longitude: point.longitude,
                sequence: point.sequence as u64,
            })
            .collect()
    });

    log::info!("Preparing stops...");
    let mut stops = vec![];
    for stop in mandatory_table("stops.txt", gtfs.stops)? {
        stops.push(GtfsStop {
            is_stop_point: matches!(
                stop.location_type,
                gtfs_structures::LocationType::StopPoint
            ),
            id: stop.id,
            name: stop.name,
            latitude: stop.latitude,
            longitude: stop.longitude,
        });
    }

    log::info!("Preparing trips.");
    let mut trips = vec![];
    for trip in mandatory_table("trips.txt", gtfs.trips)? {
        trips.push(GtfsTrip {
            id: trip.id,
            route_id: trip.route_id,
            service_id: trip.service_id,
            shape_id: trip.shape_id,
            headsign: trip.trip_headsign,
            short_name: trip.trip_short_name,
            block_id: trip.block_id,
            direction_id: trip.direction_id.map(|direction| match direction {
                gtfs_structures::DirectionType::Outbound => 0,
                gtfs_structures::DirectionType::Inbound => 1,
            }),
        });
    }

    log::info!("Preparing stop times.");
    let mut stop_times = vec![];
    for stop_time in mandatory_table("stop_times.txt", gtfs.stop_times)? {
        stop_times.push(GtfsStopTime {
            trip_id: stop_time.trip_id,
            arrival_time: stop_time.arrival_time.map(GtfsTime),
            departure_time: stop_time.departure_time.map(GtfsTime),
            stop_id: stop_time.stop_id,
            stop_sequence: u32::from(stop_time.stop_sequence),
            stop_headsign: stop_time.stop_headsign,
        });
    }

    Ok(GtfsTables {
        calendars,
        calendar_dates,
        routes,
        shapes,
        stops,
        trips,
        stop_times,
    })
}

fn mandatory_table<T>(file: &'static str, table: TableResult<T>) -> Result<Vec<T>, CompileError> {
    table.map_err(|source| CompileError::UnreadableTable { file, source })
}

fn optional_table<T>(
    file: &'static str,
    table: Option<TableResult<T>>,
) -> Result<Option<Vec<T>>, CompileError> {
    match table {
        None => {
            log::info!("No {} found.", file);
            Ok(None)
        }
        Some(table) => mandatory_table(file, table).map(Some),
    }
}
