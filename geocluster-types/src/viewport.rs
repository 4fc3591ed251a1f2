use crate::bbox::BoundingBox;
use geo::Point;
use serde::{Deserialize, Serialize};

/// The currently visible map region: a center plus angular spans.
///
/// `longitude_delta` is the full visible longitude span in degrees and is
/// what drives the discretized zoom level. The engine treats viewports as
/// opaque snapshots handed over by the map widget on pan/zoom events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Center of the visible region (x = longitude, y = latitude)
    pub center: Point<f64>,
    /// Visible latitude span in degrees
    pub latitude_delta: f64,
    /// Visible longitude span in degrees
    pub longitude_delta: f64,
}

impl Viewport {
    /// Create a viewport from a center and angular spans.
    pub fn new(
        center_lng: f64,
        center_lat: f64,
        longitude_delta: f64,
        latitude_delta: f64,
    ) -> Self {
        Self {
            center: Point::new(center_lng, center_lat),
            latitude_delta,
            longitude_delta,
        }
    }

    /// Get the center longitude.
    pub fn longitude(&self) -> f64 {
        self.center.x()
    }

    /// Get the center latitude.
    pub fn latitude(&self) -> f64 {
        self.center.y()
    }

    /// The bounding box to run cluster queries against.
    ///
    /// Pads by the full delta on each side, yielding a box twice the
    /// visible span. The over-fetch keeps edge clusters populated while
    /// the user pans without triggering a re-query.
    pub fn query_bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.longitude() - self.longitude_delta,
            self.latitude() - self.latitude_delta,
            self.longitude() + self.longitude_delta,
            self.latitude() + self.latitude_delta,
        )
    }

    /// The region actually rendered on screen.
    ///
    /// Map widgets overscan the region they report; the spans here are
    /// trimmed back to the visible extent. Use this for marker
    /// visibility checks, and [`query_bounds`](Self::query_bounds)
    /// when issuing cluster queries.
    pub fn visible_bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.longitude() - self.longitude_delta / 2.1,
            self.latitude() - self.latitude_delta / 2.45,
            self.longitude() + self.longitude_delta / 2.1,
            self.latitude() + self.latitude_delta / 2.45,
        )
    }

    /// True if both deltas are positive, finite numbers and the center
    /// coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.longitude().is_finite()
            && self.latitude().is_finite()
            && self.longitude_delta.is_finite()
            && self.longitude_delta > 0.0
            && self.latitude_delta.is_finite()
            && self.latitude_delta > 0.0
    }

    /// Whether two viewports describe the same region along the axes the
    /// re-query gate inspects (center and longitude span).
    pub fn same_region(&self, other: &Viewport) -> bool {
        self.longitude() == other.longitude()
            && self.latitude() == other.latitude()
            && self.longitude_delta == other.longitude_delta
    }
}
