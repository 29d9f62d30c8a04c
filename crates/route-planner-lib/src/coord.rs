//! Geographic coordinates used by waypoints, routes and saved snapshots

use geo::{BoundingRect, MultiPoint, Point, Rect};
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees.
///
/// Serialized as `{"lat": .., "lng": ..}` so persisted routes stay
/// compatible with the records written by the browser widget.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Convert to a `geo` point (x = longitude, y = latitude)
    #[inline]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }

    /// `lng,lat` pair as expected in OSRM coordinate paths
    pub fn to_lng_lat_string(self) -> String {
        format!("{},{}", self.lng, self.lat)
    }
}

impl From<Point<f64>> for LatLng {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// Bounding box of a set of coordinates as (min_lat, min_lng, max_lat, max_lng)
///
/// Returns `None` for an empty slice.
pub fn bounding_box(coords: &[LatLng]) -> Option<(f64, f64, f64, f64)> {
    let points: MultiPoint<f64> = coords.iter().map(|c| c.to_point()).collect();
    let rect: Rect<f64> = points.bounding_rect()?;
    Some((rect.min().y, rect.min().x, rect.max().y, rect.max().x))
}
