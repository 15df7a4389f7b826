use log::warn;
use serde::Serialize;

/// IUGG mean Earth radius in kilometers. A sphere of this radius is off by up to about 0.5%.
pub const EARTH_RADIUS_KM: f64 = 6371.009;

/// A latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    /// True iff latitude is in [-90, 90] and longitude in [-180, 180].
    /// NaN never passes. Logs a warning when the pair is rejected.
    pub fn is_valid(&self) -> bool {
        let valid = (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude);
        if !valid {
            warn!("{} are invalid coordinates.", self);
        }
        valid
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Great-circle distance using the spherical law of cosines.
/// Input in degrees, output in the unit of `radius`. `None` when either point is invalid.
pub fn great_circle_distance(a: Coordinate, b: Coordinate, radius: f64) -> Option<f64> {
    if !(a.is_valid() && b.is_valid()) {
        return None;
    }
    let (lat_a, lng_a, lat_b, lng_b) = (
        a.latitude.to_radians(),
        a.longitude.to_radians(),
        b.latitude.to_radians(),
        b.longitude.to_radians(),
    );
    let cos_angle =
        lat_a.sin() * lat_b.sin() + lat_a.cos() * lat_b.cos() * (lng_b - lng_a).cos();
    // Rounding can push coincident points just past 1.0
    Some(radius * cos_angle.clamp(-1.0, 1.0).acos())
}
