//! Content-addressed keys for GTFS entities.
//!
//! Every textual GTFS id (service, route, shape, trip) is replaced by a 128-bit
//! key: the first 16 bytes of the SHA-256 digest of the id, read big-endian.
//! The same id always produces the same key, on every platform and run.

use sha2::{Digest, Sha256};
use std::fmt;

/// Derives the 128-bit digest used for all keys.
pub fn derive_digest(raw: &str) -> u128 {
    let digest = Sha256::digest(raw.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    u128::from_be_bytes(bytes)
}

macro_rules! impl_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            rkyv::Archive,
            rkyv::Serialize,
            rkyv::Deserialize,
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
        )]
        #[rkyv(derive(Debug, Hash, PartialEq, Eq))]
        pub struct $name(pub u128);

        impl $name {
            pub fn derive(raw: &str) -> Self {
                Self(derive_digest(raw))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:032x}", self.0)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

impl_key!(
    /// Key of a `service_id` from calendar.txt / calendar_dates.txt.
    ServiceKey
);
impl_key!(
    /// Key of a `route_id`.
    RouteKey
);
impl_key!(
    /// Key of a `shape_id`.
    ShapeKey
);
impl_key!(
    /// Key of a `trip_id`.
    TripKey
);
impl_key!(
    /// Digest of an ordered stop sequence.
    SequenceDigest
);

/// Identity of an itinerary: a stop sequence scoped to the route it runs on.
#[derive(
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[rkyv(derive(Debug, Hash, PartialEq, Eq))]
pub struct ItineraryKey {
    pub route: RouteKey,
    pub sequence: SequenceDigest,
}

impl fmt::Display for ItineraryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_jitin_{}", self.route, self.sequence)
    }
}

impl serde::Serialize for ItineraryKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Key of the hour-bucket index.
#[derive(
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[rkyv(derive(Debug, Hash, PartialEq, Eq))]
pub struct RouteServiceKey {
    pub route: RouteKey,
    pub service: ServiceKey,
}
