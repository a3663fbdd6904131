//! Great-circle distance and bearing on a spherical Earth.

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance to `other`, in meters.
    pub fn distance_to(&self, other: LatLon) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Initial bearing from `self` to `other` in degrees, `[0, 360)`,
    /// 0° = north, clockwise.
    pub fn initial_bearing_to(&self, other: LatLon) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let y = delta_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

        y.atan2(x).to_degrees().rem_euclid(360.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = LatLon::new(51.47, -0.45);
        assert_eq!(p.distance_to(p), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree of latitude along a meridian is ~111.2 km.
        let d = LatLon::new(0.0, 0.0).distance_to(LatLon::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_london_to_paris() {
        let london = LatLon::new(51.5074, -0.1278);
        let paris = LatLon::new(48.8566, 2.3522);

        let d = london.distance_to(paris);
        assert!((d - 343_500.0).abs() < 2_000.0, "got {d}");

        let b = london.initial_bearing_to(paris);
        assert!((b - 156.0).abs() < 1.5, "got {b}");
    }

    #[test]
    fn test_cardinal_bearings() {
        let origin = LatLon::new(0.0, 0.0);
        assert!((origin.initial_bearing_to(LatLon::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((origin.initial_bearing_to(LatLon::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((origin.initial_bearing_to(LatLon::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((origin.initial_bearing_to(LatLon::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_is_normalized() {
        // A target to the west must come out near 270, never negative.
        let b = LatLon::new(51.0, 0.0).initial_bearing_to(LatLon::new(51.0, -2.0));
        assert!((0.0..360.0).contains(&b), "got {b}");
        assert!((b - 270.0).abs() < 1.0, "got {b}");
    }
}
