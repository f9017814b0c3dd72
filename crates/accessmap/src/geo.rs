//! Coordinates, great-circle distance and the radius filter.
//!
//! Nearby queries fetch every candidate row that matches the static SQL
//! predicates and then keep the rows whose haversine distance to the query
//! point is within the radius. The datasets involved are small enough that a
//! linear scan is adequate.

use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Textual coordinates must fit a decimal(10,7) column.
static DECIMAL_COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d{1,3}(\.\d{1,7})?$").expect("coordinate pattern is valid")
});

/// A WGS84 position in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

impl LatLng {
    /// Build a position, rejecting out-of-range or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either component is out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::validation(
                "latitude",
                format!("{latitude} is outside [-90, 90]"),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::validation(
                "longitude",
                format!("{longitude} is outside [-180, 180]"),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse a position from decimal strings such as `"22.3193"`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either string is not a decimal with at
    /// most seven fractional digits, or is out of range.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = parse_decimal("latitude", latitude)?;
        let lng = parse_decimal("longitude", longitude)?;
        Self::new(lat, lng)
    }

    /// Parse a query point from any finite decimal notation, such as the
    /// full-precision output of browser geolocation or `2.2e1`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either string is not a finite number,
    /// or is out of range.
    pub fn parse_point(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = parse_finite("latitude", latitude)?;
        let lng = parse_finite("longitude", longitude)?;
        Self::new(lat, lng)
    }

    /// Haversine distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Parse one decimal coordinate string.
pub(crate) fn parse_decimal(field: &'static str, value: &str) -> Result<f64> {
    let value = value.trim();
    if !DECIMAL_COORDINATE.is_match(value) {
        return Err(Error::validation(
            field,
            format!("'{value}' is not a decimal coordinate"),
        ));
    }
    value
        .parse()
        .map_err(|_| Error::validation(field, format!("'{value}' is not a number")))
}

/// Parse a finite number in any notation `f64` accepts.
pub(crate) fn parse_finite(field: &'static str, value: &str) -> Result<f64> {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(Error::validation(
            field,
            format!("'{value}' is not a finite number"),
        )),
    }
}

/// Great-circle distance between two points in kilometres.
#[must_use]
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A record that may carry a position.
pub trait Located {
    /// The record's position, if it has one.
    fn position(&self) -> Option<LatLng>;
}

/// Validate a query radius against the configured cap.
///
/// # Errors
///
/// Returns a validation error for negative, non-finite or oversized radii.
pub fn check_radius(radius_km: f64, max_km: f64) -> Result<f64> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(Error::validation(
            "radiusKm",
            format!("{radius_km} is not a non-negative distance"),
        ));
    }
    if radius_km > max_km {
        return Err(Error::validation(
            "radiusKm",
            format!("{radius_km} exceeds the maximum of {max_km} km"),
        ));
    }
    Ok(radius_km)
}

/// Keep the rows within `radius_km` of `center`, preserving their order.
///
/// Rows without a position are dropped. The boundary is inclusive.
#[must_use]
pub fn within_radius<T: Located>(rows: Vec<T>, center: LatLng, radius_km: f64) -> Vec<T> {
    rows.into_iter()
        .filter(|row| {
            row.position()
                .is_some_and(|pos| center.distance_km(&pos) <= radius_km)
        })
        .collect()
}
