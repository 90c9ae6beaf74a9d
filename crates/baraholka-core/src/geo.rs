//! # Great-Circle Distance
//!
//! Haversine distance for the feed's distance filter.
//!
//! The filter compares each item's resolved coordinates with the viewer's
//! home coordinates and keeps items within a kilometer threshold. Items
//! without coordinates fail open (see [`crate::visibility`]).

use crate::types::Coordinates;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points, in meters.
///
/// Haversine formula:
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
/// `d = 2R·atan2(√a, √(1−a))`.
///
/// ## Example
/// ```rust
/// use baraholka_core::geo::haversine_meters;
/// use baraholka_core::Coordinates;
///
/// let moscow = Coordinates::new(55.7558, 37.6173);
/// assert_eq!(haversine_meters(moscow, moscow), 0.0);
/// ```
pub fn haversine_meters(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    EARTH_RADIUS_METERS * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_for_identical_points() {
        let p = Coordinates::new(55.7558, 37.6173);
        assert_eq!(haversine_meters(p, p), 0.0);
    }

    #[test]
    fn test_moscow_to_spb_roughly_634_km() {
        let moscow = Coordinates::new(55.7558, 37.6173);
        let spb = Coordinates::new(59.9343, 30.3351);
        let d = haversine_meters(moscow, spb);
        // Well-known reference distance, allow a percent of slack
        assert!((630_000.0..640_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_symmetry() {
        let a = Coordinates::new(55.75, 37.61);
        let b = Coordinates::new(55.80, 37.70);
        let ab = haversine_meters(a, b);
        let ba = haversine_meters(b, a);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_small_neighborhood_distance() {
        // ~1.11 km per 0.01° of latitude
        let a = Coordinates::new(55.75, 37.61);
        let b = Coordinates::new(55.76, 37.61);
        let d = haversine_meters(a, b);
        assert!((1_000.0..1_250.0).contains(&d), "got {d}");
    }
}
