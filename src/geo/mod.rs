//! Geo module - distances and nearest-neighbour joins

mod distance;
mod matcher;

pub use distance::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use matcher::{GeoColumns, GeoMatcher, JoinResult, MatchError, DEFAULT_MAX_DISTANCE_KM};
