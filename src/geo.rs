//! Great-circle geometry and distance presentation.
//!
//! Everything here is a pure function over `f64` degrees. Distances are
//! kilometres on a spherical Earth of radius 6371 km.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VendorlyError};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Validated constructor.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !is_valid_coordinates(lat, lng) {
            return Err(VendorlyError::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_km(self.lat, self.lng, other.lat, other.lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_coords(self.lat, self.lng))
    }
}

/// Haversine distance between two points, in kilometres.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn is_valid_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// "850m" below one kilometre, "2.4km" above.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{:.1}km", km)
    }
}

/// "19.1356° N, 72.8262° E"
pub fn format_coords(lat: f64, lng: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lng >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0} {}, {:.4}\u{00B0} {}", lat.abs(), ns, lng.abs(), ew)
}

/// Coarse distance buckets used for badges next to vendor listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityBand {
    Nearby,
    Close,
    Moderate,
    Far,
}

impl ProximityBand {
    pub fn of(km: f64) -> Self {
        if km < 2.0 {
            Self::Nearby
        } else if km < 5.0 {
            Self::Close
        } else if km < 10.0 {
            Self::Moderate
        } else {
            Self::Far
        }
    }

    /// Badge text, e.g. "Close (3.2km)".
    pub fn label(km: f64) -> String {
        if km < 1.0 {
            return "<1 km away".to_string();
        }
        format!("{} ({})", Self::of(km), format_distance(km))
    }
}

impl fmt::Display for ProximityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearby => write!(f, "Nearby"),
            Self::Close => write!(f, "Close"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Far => write!(f, "Far"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const MUMBAI: (f64, f64) = (19.0760, 72.8777);

    #[test]
    fn test_distance_to_self_is_zero() {
        for &(lat, lng) in &[MUMBAI, (0.0, 0.0), (-33.8688, 151.2093), (89.9, -179.9)] {
            assert_abs_diff_eq!(distance_km(lat, lng, lat, lng), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_distance_symmetric() {
        let a = distance_km(19.1356, 72.8262, 28.6315, 77.2167);
        let b = distance_km(28.6315, 77.2167, 19.1356, 72.8262);
        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
    }

    #[test]
    fn test_mumbai_one_km_offset() {
        // One kilometre of latitude is 1 / 111.195 degrees on this sphere.
        let offset = 1.0 / (EARTH_RADIUS_KM.to_radians());
        let d = distance_km(MUMBAI.0, MUMBAI.1, MUMBAI.0 + offset, MUMBAI.1);
        assert_abs_diff_eq!(d, 1.0, epsilon = 0.001);
    }

    #[test]
    fn test_mumbai_to_delhi() {
        let d = distance_km(MUMBAI.0, MUMBAI.1, 28.6139, 77.2090);
        assert!((1140.0..1160.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_antimeridian() {
        let d = distance_km(0.0, 179.5, 0.0, -179.5);
        assert_abs_diff_eq!(d, 111.19, epsilon = 0.05);
    }

    #[test]
    fn test_validation() {
        assert!(is_valid_coordinates(90.0, 180.0));
        assert!(is_valid_coordinates(-90.0, -180.0));
        assert!(!is_valid_coordinates(90.01, 0.0));
        assert!(!is_valid_coordinates(0.0, -180.5));
        assert!(!is_valid_coordinates(f64::NAN, 0.0));
        assert!(Coordinates::new(100.0, 0.0).is_err());
        assert!(Coordinates::new(19.0, 72.0).is_ok());
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.85), "850m");
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(1.0), "1.0km");
        assert_eq!(format_distance(2.44), "2.4km");
    }

    #[test]
    fn test_proximity_band() {
        assert_eq!(ProximityBand::of(1.5), ProximityBand::Nearby);
        assert_eq!(ProximityBand::of(2.0), ProximityBand::Close);
        assert_eq!(ProximityBand::of(9.99), ProximityBand::Moderate);
        assert_eq!(ProximityBand::of(10.0), ProximityBand::Far);
        assert_eq!(ProximityBand::label(0.4), "<1 km away");
        assert_eq!(ProximityBand::label(3.2), "Close (3.2km)");
    }

    #[test]
    fn test_format_coords() {
        assert_eq!(format_coords(19.1356, 72.8262), "19.1356\u{00B0} N, 72.8262\u{00B0} E");
        assert_eq!(format_coords(-33.8688, -70.0), "33.8688\u{00B0} S, 70.0000\u{00B0} W");
    }
}
