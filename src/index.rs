//! Multi-resolution cluster index backed by one R-tree per zoom level.
//!
//! The index ingests a full marker set once per content change and
//! precomputes, for every discrete zoom level, a greedy agglomeration of
//! the next-finer level: entries within the clustering radius (measured
//! in projected map-pixel space at that zoom) merge into a node whose
//! coordinate is the count-weighted running centroid. Queries are then a
//! single envelope lookup against the precomputed level rather than a
//! fresh agglomeration.

use geo::Point;
use rstar::{AABB, Point as RstarPoint, RTree};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::projection::{project_x, project_y, radius_in_world_units, unproject_x, unproject_y};
use geocluster_types::{BoundingBox, Cluster, MarkerPoint};

/// Process-wide generation counter; every built index gets a fresh tag.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A cluster node stored in one zoom level's R-tree.
///
/// Coordinates are projected world units in `[0, 1]`. `members` holds
/// indices into the index's marker slice; `seq` is the node's position
/// within its own level, used to mark neighbors during agglomeration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LevelEntry {
    x: f64,
    y: f64,
    point_count: usize,
    members: SmallVec<[u32; 8]>,
    seq: u32,
}

impl LevelEntry {
    fn leaf(x: f64, y: f64, marker_idx: u32) -> Self {
        Self {
            x,
            y,
            point_count: 1,
            members: SmallVec::from_slice(&[marker_idx]),
            seq: marker_idx,
        }
    }

    /// A bare coordinate carrier for envelope corners and distance probes.
    fn probe(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            point_count: 0,
            members: SmallVec::new(),
            seq: 0,
        }
    }
}

impl RstarPoint for LevelEntry {
    type Scalar = f64;
    const DIMENSIONS: usize = 2;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Self::probe(generator(0), generator(1))
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.x,
            1 => self.y,
            _ => unreachable!(),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => unreachable!(),
        }
    }
}

/// Immutable multi-resolution cluster index.
///
/// Built wholesale from a marker set; content changes are handled by
/// building a replacement index, never by mutating an existing one.
/// Each index carries a process-unique `generation` so that queries
/// issued against an older index can be recognized and discarded.
///
/// # Examples
///
/// ```
/// use geocluster::{ClusterConfig, ClusterIndex};
/// use geocluster_types::{BoundingBox, MarkerPoint};
/// use bytes::Bytes;
///
/// let markers = vec![
///     MarkerPoint::new("a", -74.0060, 40.7128, Bytes::new()),
///     MarkerPoint::new("b", -74.0050, 40.7130, Bytes::new()),
/// ];
/// let index = ClusterIndex::build(markers, &ClusterConfig::default())?;
/// let clusters = index.clusters(&BoundingBox::WORLD, 2)?;
/// assert_eq!(clusters.iter().map(|c| c.point_count).sum::<usize>(), 2);
/// # Ok::<(), geocluster::ClusterError>(())
/// ```
pub struct ClusterIndex {
    config: ClusterConfig,
    points: Vec<MarkerPoint>,
    ids: FxHashMap<String, u32>,
    levels: FxHashMap<i32, RTree<LevelEntry>>,
    generation: u64,
}

impl ClusterIndex {
    /// Build an index over a marker set.
    ///
    /// Precomputes one agglomerated level per zoom from `max_zoom` down
    /// to `min_zoom`. Fails with [`ClusterError::InvalidConfig`] when the
    /// config is malformed or a marker carries a non-finite or
    /// out-of-range coordinate. Zero markers produce an empty index, not
    /// an error.
    pub fn build(points: Vec<MarkerPoint>, config: &ClusterConfig) -> Result<Self> {
        config.validate().map_err(ClusterError::InvalidConfig)?;

        let mut ids = FxHashMap::default();
        for (idx, point) in points.iter().enumerate() {
            validate_marker(point)?;
            if ids.insert(point.id.clone(), idx as u32).is_some() {
                log::warn!("duplicate marker id '{}', keeping the later marker", point.id);
            }
        }

        let mut levels = FxHashMap::default();
        if !points.is_empty() {
            let mut current: Vec<LevelEntry> = points
                .iter()
                .enumerate()
                .map(|(idx, p)| {
                    LevelEntry::leaf(project_x(p.longitude()), project_y(p.latitude()), idx as u32)
                })
                .collect();

            for zoom in (config.min_zoom..=config.max_zoom).rev() {
                current = agglomerate(&current, radius_in_world_units(config.radius, zoom));
                levels.insert(zoom, RTree::bulk_load(current.clone()));
            }
        }

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "built cluster index generation {}: {} markers, zoom levels {}..={}",
            generation,
            points.len(),
            config.min_zoom,
            config.max_zoom
        );

        Ok(Self {
            config: config.clone(),
            points,
            ids,
            levels,
            generation,
        })
    }

    /// Query the clusters visible in `bbox` at the given zoom level.
    ///
    /// The zoom is clamped into `[min_zoom, max_zoom]`, so results are
    /// never finer than the finest precomputed level. The lookup envelope
    /// is widened by the level's merge radius: nodes whose geometry
    /// straddles a box edge are included (at-least policy), so callers
    /// must tolerate marginal over-inclusion near the edges.
    ///
    /// Result order is unspecified and `cluster_id`s are valid only
    /// within the returned set.
    pub fn clusters(&self, bbox: &BoundingBox, zoom: i32) -> Result<Vec<Cluster>> {
        if !bbox.is_finite() {
            return Err(ClusterError::InvalidViewport(format!(
                "Bounding box edges must be finite, got: [{}, {}, {}, {}]",
                bbox.west(),
                bbox.south(),
                bbox.east(),
                bbox.north()
            )));
        }

        let level = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        let Some(tree) = self.levels.get(&level) else {
            return Ok(Vec::new());
        };

        let slack = radius_in_world_units(self.config.radius, level);
        // North latitude projects to the smaller y.
        let envelope = AABB::from_corners(
            LevelEntry::probe(project_x(bbox.west()) - slack, project_y(bbox.north()) - slack),
            LevelEntry::probe(project_x(bbox.east()) + slack, project_y(bbox.south()) + slack),
        );

        let clusters: Vec<Cluster> = tree
            .locate_in_envelope(&envelope)
            .enumerate()
            .map(|(id, entry)| self.to_cluster(entry, id as u64))
            .collect();

        log::trace!(
            "query at zoom {} (level {}) returned {} clusters",
            zoom,
            level,
            clusters.len()
        );
        Ok(clusters)
    }

    /// Every indexed marker as a singleton cluster, ignoring any bounds.
    ///
    /// This is the raw rendering path used above the cluster-off zoom,
    /// where per-marker precision matters more than aggregation.
    pub fn raw_markers(&self) -> Vec<Cluster> {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, point)| Cluster {
                position: point.position,
                point_count: 1,
                cluster_id: idx as u64,
                member_ids: vec![point.id.clone()],
            })
            .collect()
    }

    /// Number of indexed markers.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no markers are indexed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The indexed markers, in ingestion order.
    pub fn points(&self) -> &[MarkerPoint] {
        &self.points
    }

    /// Look up a marker by id (for resolving cluster members back to
    /// caller payloads).
    pub fn point_by_id(&self, id: &str) -> Option<&MarkerPoint> {
        self.ids.get(id).map(|&idx| &self.points[idx as usize])
    }

    /// The process-unique generation tag of this index.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The configuration this index was built with.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    fn to_cluster(&self, entry: &LevelEntry, cluster_id: u64) -> Cluster {
        Cluster {
            position: Point::new(unproject_x(entry.x), unproject_y(entry.y)),
            point_count: entry.point_count,
            cluster_id,
            member_ids: entry
                .members
                .iter()
                .map(|&idx| self.points[idx as usize].id.clone())
                .collect(),
        }
    }
}

impl std::fmt::Debug for ClusterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterIndex")
            .field("generation", &self.generation)
            .field("points", &self.points.len())
            .field("levels", &self.levels.len())
            .finish()
    }
}

/// One greedy agglomeration pass: entries within `radius` (projected
/// world units) of an unabsorbed entry merge into it, accumulating the
/// count-weighted centroid and the member list. Entries left alone pass
/// through unchanged.
fn agglomerate(entries: &[LevelEntry], radius: f64) -> Vec<LevelEntry> {
    let tree = RTree::bulk_load(entries.to_vec());
    let mut absorbed = vec![false; entries.len()];
    let mut out: Vec<LevelEntry> = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        if absorbed[i] {
            continue;
        }
        absorbed[i] = true;

        let mut count = entry.point_count;
        let mut weighted_x = entry.x * entry.point_count as f64;
        let mut weighted_y = entry.y * entry.point_count as f64;
        let mut members = entry.members.clone();

        for neighbor in
            tree.locate_within_distance(LevelEntry::probe(entry.x, entry.y), radius * radius)
        {
            let j = neighbor.seq as usize;
            if absorbed[j] {
                continue;
            }
            absorbed[j] = true;
            count += neighbor.point_count;
            weighted_x += neighbor.x * neighbor.point_count as f64;
            weighted_y += neighbor.y * neighbor.point_count as f64;
            members.extend_from_slice(&neighbor.members);
        }

        let seq = out.len() as u32;
        if count == entry.point_count {
            out.push(LevelEntry {
                seq,
                ..entry.clone()
            });
        } else {
            out.push(LevelEntry {
                x: weighted_x / count as f64,
                y: weighted_y / count as f64,
                point_count: count,
                members,
                seq,
            });
        }
    }

    out
}

/// Validates a marker's longitude and latitude at ingest.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
fn validate_marker(point: &MarkerPoint) -> Result<()> {
    let (x, y) = (point.longitude(), point.latitude());

    if !x.is_finite() || !y.is_finite() {
        return Err(ClusterError::InvalidConfig(format!(
            "Marker '{}' coordinates must be finite, got: ({}, {})",
            point.id, x, y
        )));
    }

    if !(-180.0..=180.0).contains(&x) {
        return Err(ClusterError::InvalidConfig(format!(
            "Marker '{}' longitude out of range [-180.0, 180.0]: {}",
            point.id, x
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(ClusterError::InvalidConfig(format!(
            "Marker '{}' latitude out of range [-90.0, 90.0]: {}",
            point.id, y
        )));
    }

    Ok(())
}
