use geo::Point;
use serde::{Deserialize, Serialize};

/// One entry of a cluster query result: an aggregate of one or more
/// nearby markers at the queried zoom level.
///
/// `point_count == 1` degenerates to a singleton standing for exactly one
/// marker at its own coordinate. `cluster_id` is assigned per query result
/// and is **not** durable: the same geographic cluster may carry a
/// different id after the next viewport change. UI callers should key
/// rendered elements by content (position + members + count), never by
/// `cluster_id` or result order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Representative coordinate (count-weighted centroid of the members)
    pub position: Point<f64>,
    /// Number of markers aggregated into this entry
    pub point_count: usize,
    /// Identifier valid only within the result set it arrived in
    pub cluster_id: u64,
    /// Ids of the aggregated markers
    pub member_ids: Vec<String>,
}

impl Cluster {
    /// Get the representative longitude.
    pub fn longitude(&self) -> f64 {
        self.position.x()
    }

    /// Get the representative latitude.
    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    /// True if this entry stands for exactly one marker.
    pub fn is_singleton(&self) -> bool {
        self.point_count == 1
    }

    /// A stable content key for UI reconciliation, combining geometry,
    /// membership, and count.
    pub fn content_key(&self) -> String {
        format!(
            "{:.7}:{:.7}:{}:{}",
            self.position.x(),
            self.position.y(),
            self.point_count,
            self.member_ids.len()
        )
    }
}
