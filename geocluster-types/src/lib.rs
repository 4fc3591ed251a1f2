//! # geocluster-types
//!
//! Core data types for the geocluster marker-clustering engine.
//!
//! This crate provides the plain, serializable types shared between the
//! engine and its callers:
//!
//! - **Marker types**: [`MarkerPoint`], an ingested geo-tagged marker
//! - **Region types**: [`BoundingBox`], [`Viewport`]
//! - **Result types**: [`Cluster`], the ephemeral output of a cluster query
//!
//! All types are serializable with Serde and built on top of the `geo`
//! crate's geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use geocluster_types::{MarkerPoint, Viewport};
//! use bytes::Bytes;
//!
//! let marker = MarkerPoint::new("cafe-17", -74.0060, 40.7128, Bytes::new());
//! let viewport = Viewport::new(-74.0, 40.7, 0.1, 0.1);
//! assert!(viewport.query_bounds().contains(marker.position()));
//! ```

pub mod bbox;
pub mod cluster;
pub mod point;
pub mod viewport;

pub use bbox::BoundingBox;
pub use cluster::Cluster;
pub use point::MarkerPoint;
pub use viewport::Viewport;
