use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// The constructor normalizes the corners so `west <= east` and
/// `south <= north` (coordinates are swapped if supplied reversed).
///
/// Longitude does **not** wrap at the antimeridian: west and east are
/// compared numerically, with no modular arithmetic, so a region
/// crossing ±180° must be queried as two boxes.
///
/// # Examples
///
/// ```
/// use geocluster_types::BoundingBox;
///
/// let bbox = BoundingBox::new(-74.1, 40.6, -73.9, 40.8);
/// assert_eq!(bbox.west(), -74.1);
/// assert_eq!(bbox.north(), 40.8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl BoundingBox {
    /// The full world extent.
    pub const WORLD: BoundingBox = BoundingBox {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };

    /// Create a bounding box from west/south/east/north edges.
    ///
    /// Reversed edges are swapped into place.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        let (west, east) = if west <= east { (west, east) } else { (east, west) };
        let (south, north) = if south <= north {
            (south, north)
        } else {
            (north, south)
        };
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Get the west (minimum longitude) edge.
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Get the south (minimum latitude) edge.
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Get the east (maximum longitude) edge.
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Get the north (maximum latitude) edge.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Get the center point of the box.
    pub fn center(&self) -> Point<f64> {
        Point::new((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// True if all four edges are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.west.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.north.is_finite()
    }

    /// Check whether a point lies within the box (edges inclusive).
    pub fn contains(&self, point: &Point<f64>) -> bool {
        point.x() >= self.west
            && point.x() <= self.east
            && point.y() >= self.south
            && point.y() <= self.north
    }

    /// Check whether this box intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.east < other.west
            || self.west > other.east
            || self.north < other.south
            || self.south > other.north)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_creation() {
        let bbox = BoundingBox::new(-74.1, 40.6, -73.9, 40.8);
        assert_eq!(bbox.west(), -74.1);
        assert_eq!(bbox.south(), 40.6);
        assert_eq!(bbox.east(), -73.9);
        assert_eq!(bbox.north(), 40.8);
        assert!((bbox.width() - 0.2).abs() < 1e-12);
        assert!((bbox.height() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_bbox_normalizes_reversed_edges() {
        let bbox = BoundingBox::new(10.0, 20.0, -10.0, -20.0);
        assert_eq!(bbox.west(), -10.0);
        assert_eq!(bbox.east(), 10.0);
        assert_eq!(bbox.south(), -20.0);
        assert_eq!(bbox.north(), 20.0);
    }

    #[test]
    fn test_bbox_contains() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.contains(&Point::new(5.0, 5.0)));
        assert!(bbox.contains(&Point::new(0.0, 0.0)));
        assert!(bbox.contains(&Point::new(10.0, 10.0)));
        assert!(!bbox.contains(&Point::new(-0.1, 5.0)));
        assert!(!bbox.contains(&Point::new(5.0, 10.1)));
    }

    #[test]
    fn test_bbox_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_bbox_center() {
        let bbox = BoundingBox::new(-10.0, -20.0, 10.0, 20.0);
        let center = bbox.center();
        assert_eq!(center.x(), 0.0);
        assert_eq!(center.y(), 0.0);
    }

    #[test]
    fn test_world_extent() {
        assert!(BoundingBox::WORLD.contains(&Point::new(179.9, 89.9)));
        assert!(BoundingBox::WORLD.contains(&Point::new(-179.9, -89.9)));
    }
}
