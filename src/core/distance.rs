use crate::models::GeoPoint;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two points in kilometers
#[inline]
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Distance from `origin` to the closest of `locations`
///
/// Points that are not usable (NaN, out of range) are skipped. Returns
/// `f64::INFINITY` when no usable location remains.
pub fn nearest_distance_km(origin: &GeoPoint, locations: &[GeoPoint]) -> f64 {
    locations
        .iter()
        .filter(|p| p.is_usable())
        .map(|p| distance_km(origin, p))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_distance(london_lat, london_lon, paris_lat, paris_lon);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_same_point_and_symmetry() {
        let mumbai = GeoPoint::new(19.07, 72.87);
        let pune = GeoPoint::new(18.52, 73.86);

        assert_eq!(distance_km(&mumbai, &mumbai), 0.0);
        assert!((distance_km(&mumbai, &pune) - distance_km(&pune, &mumbai)).abs() < 1e-9);
        assert!(distance_km(&mumbai, &pune) > 100.0);
    }

    #[test]
    fn test_antipodal_points_stay_finite() {
        let d = distance_km(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_nearest_distance_picks_minimum() {
        let origin = GeoPoint::new(19.07, 72.87);
        let far = GeoPoint::new(18.52, 73.86);
        let near = GeoPoint::new(19.08, 72.88);

        let nearest = nearest_distance_km(&origin, &[far, near]);
        assert_eq!(nearest, distance_km(&origin, &near));
    }

    #[test]
    fn test_nearest_distance_without_usable_points() {
        let origin = GeoPoint::new(19.07, 72.87);

        assert!(nearest_distance_km(&origin, &[]).is_infinite());
        assert!(nearest_distance_km(&origin, &[GeoPoint::new(f64::NAN, 1.0)]).is_infinite());
    }
}
