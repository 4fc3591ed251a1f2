use bytes::Bytes;
use geo::Point;
use serde::{Deserialize, Serialize};

/// A geo-tagged marker ingested into the clustering index.
///
/// The marker carries an opaque payload handle back to caller-owned data
/// (the rendered marker widget, a database row, ...). The index never
/// interprets the payload; it only hands it back on singleton results.
/// Markers are immutable; a content change replaces the whole set.
///
/// # Examples
///
/// ```
/// use geocluster_types::MarkerPoint;
/// use bytes::Bytes;
///
/// let marker = MarkerPoint::new("nyc", -74.0060, 40.7128, Bytes::from("NYC"));
/// assert_eq!(marker.longitude(), -74.0060);
/// assert_eq!(marker.id(), "nyc");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPoint {
    /// Caller-supplied identifier, unique within one ingested set
    pub id: String,
    /// Geographic position (x = longitude, y = latitude)
    pub position: Point<f64>,
    /// Opaque reference back to caller-owned marker data
    pub payload: Bytes,
}

impl MarkerPoint {
    /// Create a new marker from an id, longitude, latitude, and payload.
    pub fn new(id: impl Into<String>, longitude: f64, latitude: f64, payload: Bytes) -> Self {
        Self {
            id: id.into(),
            position: Point::new(longitude, latitude),
            payload,
        }
    }

    /// Create a marker from an id and an existing point, with an empty payload.
    pub fn from_point(id: impl Into<String>, position: Point<f64>) -> Self {
        Self {
            id: id.into(),
            position,
            payload: Bytes::new(),
        }
    }

    /// Get the marker id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the longitude (x coordinate).
    pub fn longitude(&self) -> f64 {
        self.position.x()
    }

    /// Get the latitude (y coordinate).
    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    /// Get a reference to the underlying point.
    pub fn position(&self) -> &Point<f64> {
        &self.position
    }

    /// Get the opaque payload handle.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_accessors() {
        let marker = MarkerPoint::new("a", -74.0, 40.7, Bytes::from("data"));
        assert_eq!(marker.id(), "a");
        assert_eq!(marker.longitude(), -74.0);
        assert_eq!(marker.latitude(), 40.7);
        assert_eq!(marker.payload().as_ref(), b"data");
    }

    #[test]
    fn test_marker_from_point() {
        let marker = MarkerPoint::from_point("b", Point::new(10.0, 20.0));
        assert_eq!(marker.longitude(), 10.0);
        assert_eq!(marker.latitude(), 20.0);
        assert!(marker.payload().is_empty());
    }

    #[test]
    fn test_marker_serialization() {
        let marker = MarkerPoint::new("c", 1.5, -2.5, Bytes::new());
        let json = serde_json::to_string(&marker).unwrap();
        let back: MarkerPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, marker);
    }
}
