//! Viewport-driven marker clustering for pannable, zoomable maps.
//!
//! Given a set of geo-tagged markers and a stream of viewport updates,
//! this crate groups nearby markers into zoom-dependent clusters: a
//! multi-resolution index precomputes one agglomerated level per zoom,
//! queries are a single spatial lookup, and a viewport policy decides
//! when a re-query is worth issuing at all.
//!
//! ```rust
//! use geocluster::{ClusterConfig, ClusterSession};
//! use geocluster_types::{MarkerPoint, Viewport};
//! use bytes::Bytes;
//!
//! let session = ClusterSession::new(ClusterConfig::default())?;
//! session.viewport_changed(Viewport::new(-74.0, 40.7, 0.5, 0.5))?;
//!
//! let markers = vec![
//!     MarkerPoint::new("cafe", -74.0060, 40.7128, Bytes::new()),
//!     MarkerPoint::new("bar", -74.0055, 40.7130, Bytes::new()),
//! ];
//! if let Some(request) = session.set_points(markers)? {
//!     let clusters = session.execute(&request)?;
//!     session.complete(&request, clusters);
//! }
//! # Ok::<(), geocluster::ClusterError>(())
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod policy;
mod projection;
pub mod session;

pub use config::ClusterConfig;
pub use error::{ClusterError, Result};
pub use index::ClusterIndex;
pub use session::{ClusterSession, QueryRequest, SessionState};

pub use geo::Point;

pub use geocluster_types::{BoundingBox, Cluster, MarkerPoint, Viewport};

pub use policy::{
    should_cluster, should_recompute_clusters, should_requery, zoom_for_bounds,
    zoom_for_longitude_delta,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterConfig, ClusterError, ClusterIndex, ClusterSession, Result};

    pub use geo::Point;

    pub use crate::{BoundingBox, Cluster, MarkerPoint, Viewport};

    pub use crate::policy::{should_cluster, should_requery, zoom_for_longitude_delta};

    pub use crate::{QueryRequest, SessionState};
}
