//! Geospatial helpers for proximity queries and map overlays.
//!
//! Everything here is a pure function over plain degree/meter values. Span
//! sizing uses flat meters-per-degree constants rather than an ellipsoid so
//! that the same radius always frames the same on-screen extent; distances use
//! the haversine formula on a spherical Earth.

use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG) in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

const METERS_PER_LAT_DEGREE: f64 = 111_000.0;
const METERS_PER_LON_DEGREE_AT_EQUATOR: f64 = 111_320.0;
/// Floor for the longitude cosine factor so spans don't blow up near the poles.
const MIN_LON_COS_FACTOR: f64 = 0.1;

const MIN_SPAN_RADIUS_METERS: f64 = 100.0;
const SPAN_PADDING_FACTOR: f64 = 2.2;
pub const MIN_SPAN_DEGREES: f64 = 0.005;
pub const MAX_SPAN_DEGREES: f64 = 60.0;

/// Smallest viewport span used as a divisor.
const SPAN_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `true` when both components are finite and inside WGS84 bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Returns the coordinate `meters` due north (negative moves south).
    ///
    /// Used by the CLI to simulate a moving anchor.
    #[must_use]
    pub fn offset_north(&self, meters: f64) -> Self {
        Self {
            latitude: (self.latitude + meters / METERS_PER_LAT_DEGREE).clamp(-90.0, 90.0),
            longitude: self.longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = String;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LON but got \"{s}\""))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid latitude \"{lat}\": {e}"))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid longitude \"{lon}\": {e}"))?;
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(format!("coordinate out of range: \"{s}\""))
        }
    }
}

/// Extent of a region in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSpan {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// A viewport extent: center plus span in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub span: CoordinateSpan,
}

impl Region {
    /// Region centered on `center` framing `radius_km` (see [`span_for_radius`]).
    #[must_use]
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        Self {
            center,
            span: span_for_radius(radius_km, center.latitude),
        }
    }
}

/// Viewport size in screen points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Great-circle distance between two coordinates in meters.
///
/// Symmetric, and exactly `0.0` for identical inputs.
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Meters spanned by one degree of longitude at `latitude`.
fn meters_per_lon_degree(latitude: f64) -> f64 {
    let cos = latitude.abs().to_radians().cos();
    METERS_PER_LON_DEGREE_AT_EQUATOR * cos.max(MIN_LON_COS_FACTOR)
}

/// Region span (degrees) that frames a circle of `radius_km` at `latitude`.
///
/// The radius is floored to 100 m, converted with flat per-degree constants,
/// padded by 2.2 (roughly a diameter plus margin) and clamped to
/// `[MIN_SPAN_DEGREES, MAX_SPAN_DEGREES]` on both axes.
#[must_use]
pub fn span_for_radius(radius_km: f64, latitude: f64) -> CoordinateSpan {
    let radius_meters = (radius_km * 1000.0).max(MIN_SPAN_RADIUS_METERS);

    let lat_delta = radius_meters / METERS_PER_LAT_DEGREE * SPAN_PADDING_FACTOR;
    let lon_delta = radius_meters / meters_per_lon_degree(latitude) * SPAN_PADDING_FACTOR;

    CoordinateSpan {
        latitude_delta: lat_delta.clamp(MIN_SPAN_DEGREES, MAX_SPAN_DEGREES),
        longitude_delta: lon_delta.clamp(MIN_SPAN_DEGREES, MAX_SPAN_DEGREES),
    }
}

/// On-screen size in points of a `meters` distance drawn at `latitude`.
///
/// Computes the extent on both axes and returns the smaller one, so a circle
/// of this radius never overflows the viewport in either direction. Never
/// less than one point.
#[must_use]
pub fn meters_to_pixels(
    meters: f64,
    latitude: f64,
    region: &Region,
    viewport: ViewportSize,
) -> f64 {
    let lat_delta = meters / METERS_PER_LAT_DEGREE;
    let lon_delta = meters / meters_per_lon_degree(latitude);

    let px_x = lon_delta / region.span.longitude_delta.max(SPAN_EPSILON) * viewport.width;
    let px_y = lat_delta / region.span.latitude_delta.max(SPAN_EPSILON) * viewport.height;
    px_x.min(px_y).max(1.0)
}

/// Projects a coordinate into viewport-local points (origin top-left, north up).
#[must_use]
pub fn coordinate_to_screen_point(
    coord: Coordinate,
    region: &Region,
    viewport: ViewportSize,
) -> ScreenPoint {
    let dx = coord.longitude - region.center.longitude;
    let dy = coord.latitude - region.center.latitude;
    ScreenPoint {
        x: viewport.width * 0.5 + dx / region.span.longitude_delta.max(SPAN_EPSILON) * viewport.width,
        y: viewport.height * 0.5
            - dy / region.span.latitude_delta.max(SPAN_EPSILON) * viewport.height,
    }
}

#[cfg(test)]
#[path = "geo_test.rs"]
mod tests;
