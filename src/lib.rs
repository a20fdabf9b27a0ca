//! Compiles a GTFS feed into deduplicated itineraries and time-indexed trips
//! for a map visualization front end.

pub mod calendar;
pub mod compile_feed;
pub mod error;
pub mod gtfs_tables;
pub mod gtfs_time;
pub mod itineraries;
pub mod keys;
pub mod load_gtfs;
pub mod memory_mapped_rkyv;
pub mod prepare_compiled_feed;
mod progress;
pub mod queries;
pub mod routes;
pub mod shapes;
pub mod stop_times;
pub mod stops;
pub mod trips;

pub use compile_feed::{compile_feed, CompileStats, CompiledFeed};
pub use error::CompileError;
