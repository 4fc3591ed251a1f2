//! Query session: the state machine between the map widget and the index.
//!
//! A [`ClusterSession`] owns the current [`ClusterIndex`], the
//! last-queried viewport, and the applied cluster set. Content changes
//! rebuild the index under a fresh generation; viewport changes are run
//! through the policy gates and, when warranted, produce a
//! generation-and-sequence-tagged [`QueryRequest`]. Completions carrying
//! a stale tag are silently discarded, so an old, slow query can never
//! overwrite a newer result: last writer wins on the *request*, not on
//! completion order.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::index::ClusterIndex;
use crate::policy::{
    should_cluster, should_recompute_clusters, should_requery, zoom_for_longitude_delta,
};
use geocluster_types::{BoundingBox, Cluster, MarkerPoint, Viewport};

/// Where the session currently is in its query cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No query outstanding; the applied cluster set is current
    Idle,
    /// A query has been issued and its result not yet applied
    Querying,
}

/// A single cluster query, tagged with the index generation and request
/// sequence it was issued under.
///
/// Tickets are handed out by [`ClusterSession::viewport_changed`] and
/// [`ClusterSession::set_points`]; a ticket whose tags no longer match
/// the session's is stale and its completion is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Generation of the index this query was issued against
    pub generation: u64,
    /// Monotonic per-session request sequence; later requests supersede
    pub sequence: u64,
    /// Region to query
    pub bounds: BoundingBox,
    /// Zoom level to query at (viewport zoom plus the configured bias)
    pub zoom: i32,
    /// False when raw markers should be shown instead of clusters
    pub clustered: bool,
}

#[derive(Debug)]
struct SessionInner {
    index: Option<Arc<ClusterIndex>>,
    sequence: u64,
    state: SessionState,
    last_queried: Option<Viewport>,
    applied: Vec<Cluster>,
}

/// Single-logical-thread query session over a replaceable index.
///
/// Queries may be computed out-of-band: [`viewport_changed`] issues a
/// request, the caller runs [`execute`] wherever it likes, and
/// [`complete`] applies the result, unless a newer request or a content
/// change superseded it in the meantime. Overlapping queries are
/// cancel-and-replace, never queued: only the latest viewport's result
/// is meaningful.
///
/// [`viewport_changed`]: ClusterSession::viewport_changed
/// [`execute`]: ClusterSession::execute
/// [`complete`]: ClusterSession::complete
///
/// # Examples
///
/// ```
/// use geocluster::{ClusterConfig, ClusterSession};
/// use geocluster_types::{MarkerPoint, Viewport};
/// use bytes::Bytes;
///
/// let session = ClusterSession::new(ClusterConfig::default())?;
/// session.viewport_changed(Viewport::new(-74.0, 40.7, 0.5, 0.5))?;
///
/// let markers = vec![MarkerPoint::new("nyc", -74.0060, 40.7128, Bytes::new())];
/// if let Some(request) = session.set_points(markers)? {
///     let clusters = session.execute(&request)?;
///     session.complete(&request, clusters);
/// }
/// assert_eq!(session.current().len(), 1);
/// # Ok::<(), geocluster::ClusterError>(())
/// ```
pub struct ClusterSession {
    config: ClusterConfig,
    inner: Mutex<SessionInner>,
}

impl ClusterSession {
    /// Create a session with the given configuration.
    pub fn new(config: ClusterConfig) -> Result<Self> {
        config.validate().map_err(ClusterError::InvalidConfig)?;
        Ok(Self {
            config,
            inner: Mutex::new(SessionInner {
                index: None,
                sequence: 0,
                state: SessionState::Idle,
                last_queried: None,
                applied: Vec::new(),
            }),
        })
    }

    /// Replace the indexed content wholesale.
    ///
    /// Rebuilds the index under a new generation, invalidating any query
    /// still in flight against the old one. If a viewport is already
    /// known, the initial query for it is issued immediately.
    pub fn set_points(&self, points: Vec<MarkerPoint>) -> Result<Option<QueryRequest>> {
        let index = Arc::new(ClusterIndex::build(points, &self.config)?);

        let mut inner = self.inner.lock();
        if inner.state == SessionState::Querying {
            log::debug!("content change superseded an in-flight query");
        }
        inner.index = Some(index);
        inner.applied.clear();
        inner.state = SessionState::Idle;

        match inner.last_queried {
            Some(viewport) => self.issue_locked(&mut inner, viewport).map(Some),
            None => Ok(None),
        }
    }

    /// Feed a viewport update through the policy gates.
    ///
    /// Returns a [`QueryRequest`] when a re-query is warranted, `None`
    /// when the update can be absorbed (unchanged region, world-scale
    /// view, same discretized zoom, or a shift below the pan
    /// thresholds). Fails with [`ClusterError::InvalidViewport`] for
    /// malformed viewports; the map widget should never produce one, but
    /// the engine defends anyway.
    pub fn viewport_changed(&self, viewport: Viewport) -> Result<Option<QueryRequest>> {
        if !viewport.is_valid() {
            return Err(ClusterError::InvalidViewport(format!(
                "Viewport deltas must be positive and finite, got: ({}, {})",
                viewport.longitude_delta, viewport.latitude_delta
            )));
        }

        let mut inner = self.inner.lock();

        if inner.index.is_none() {
            // No content yet; remember the viewport so ingestion can
            // issue the initial query for it.
            inner.last_queried = Some(viewport);
            return Ok(None);
        }

        if viewport.longitude_delta > self.config.world_delta_limit {
            return Ok(None);
        }

        if let Some(previous) = inner.last_queried {
            if viewport.same_region(&previous) {
                return Ok(None);
            }

            let current_zoom = zoom_for_longitude_delta(viewport.longitude_delta)?;
            let previous_zoom = zoom_for_longitude_delta(previous.longitude_delta)?;
            if !should_recompute_clusters(current_zoom, previous_zoom, self.config.min_zoom) {
                return Ok(None);
            }

            if !should_requery(&previous, &viewport) {
                return Ok(None);
            }
        }

        self.issue_locked(&mut inner, viewport).map(Some)
    }

    /// Run a query request against the current index.
    ///
    /// A request issued against a replaced index returns an empty set
    /// (its completion would be discarded anyway). Clustered requests
    /// consult the precomputed levels; unclustered ones return every
    /// marker raw.
    pub fn execute(&self, request: &QueryRequest) -> Result<Vec<Cluster>> {
        let index = {
            let inner = self.inner.lock();
            match &inner.index {
                Some(index) if index.generation() == request.generation => Arc::clone(index),
                _ => {
                    log::debug!(
                        "skipping query for replaced index generation {}",
                        request.generation
                    );
                    return Ok(Vec::new());
                }
            }
        };

        if request.clustered {
            index.clusters(&request.bounds, request.zoom)
        } else {
            Ok(index.raw_markers())
        }
    }

    /// Apply a completed query result.
    ///
    /// Returns true and moves the session back to [`SessionState::Idle`]
    /// iff the request is still the latest one against the current
    /// index; stale completions are dropped silently and leave the
    /// applied set untouched.
    pub fn complete(&self, request: &QueryRequest, clusters: Vec<Cluster>) -> bool {
        let mut inner = self.inner.lock();

        let current_generation = inner.index.as_ref().map(|i| i.generation()).unwrap_or(0);
        if request.sequence != inner.sequence || request.generation != current_generation {
            log::debug!(
                "discarding stale cluster result (sequence {} vs {}, generation {} vs {})",
                request.sequence,
                inner.sequence,
                request.generation,
                current_generation
            );
            return false;
        }

        inner.applied = clusters;
        inner.state = SessionState::Idle;
        true
    }

    /// Snapshot of the most recently applied cluster set.
    pub fn current(&self) -> Vec<Cluster> {
        self.inner.lock().applied.clone()
    }

    /// Current position in the query cycle.
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// The session configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    fn issue_locked(
        &self,
        inner: &mut SessionInner,
        viewport: Viewport,
    ) -> Result<QueryRequest> {
        let zoom = zoom_for_longitude_delta(viewport.longitude_delta)?;
        let generation = inner.index.as_ref().map(|i| i.generation()).unwrap_or(0);

        inner.sequence += 1;
        inner.last_queried = Some(viewport);
        inner.state = SessionState::Querying;

        Ok(QueryRequest {
            generation,
            sequence: inner.sequence,
            bounds: viewport.query_bounds(),
            zoom: zoom + self.config.zoom_bias,
            clustered: should_cluster(zoom, self.config.max_cluster_zoom),
        })
    }
}

impl std::fmt::Debug for ClusterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ClusterSession")
            .field("state", &inner.state)
            .field("sequence", &inner.sequence)
            .field("applied", &inner.applied.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn marker(id: &str, lng: f64, lat: f64) -> MarkerPoint {
        MarkerPoint::new(id, lng, lat, Bytes::new())
    }

    fn city_viewport() -> Viewport {
        // longitude delta 0.35 implies zoom 10
        Viewport::new(-74.0, 40.7, 0.35, 0.35)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClusterConfig::default().with_radius(-1.0);
        assert!(matches!(
            ClusterSession::new(config),
            Err(ClusterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_viewport_before_content_issues_nothing() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        assert!(session.viewport_changed(city_viewport()).unwrap().is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_content_change_issues_initial_query() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        session.viewport_changed(city_viewport()).unwrap();

        let request = session
            .set_points(vec![marker("a", -74.0, 40.7)])
            .unwrap()
            .expect("initial query expected");
        assert!(request.clustered);
        assert_eq!(session.state(), SessionState::Querying);

        let clusters = session.execute(&request).unwrap();
        assert!(session.complete(&request, clusters));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.current().len(), 1);
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        let err = session
            .viewport_changed(Viewport::new(0.0, 0.0, 0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, ClusterError::InvalidViewport(_)));
    }

    #[test]
    fn test_unchanged_region_is_absorbed() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        session.viewport_changed(city_viewport()).unwrap();
        session.set_points(vec![marker("a", -74.0, 40.7)]).unwrap();

        assert!(session.viewport_changed(city_viewport()).unwrap().is_none());
    }

    #[test]
    fn test_world_scale_viewport_is_absorbed() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        session.viewport_changed(city_viewport()).unwrap();
        session.set_points(vec![marker("a", -74.0, 40.7)]).unwrap();

        let world = Viewport::new(0.0, 0.0, 120.0, 120.0);
        assert!(session.viewport_changed(world).unwrap().is_none());
    }

    #[test]
    fn test_small_pan_is_absorbed_large_pan_queries() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        session.viewport_changed(city_viewport()).unwrap();
        session.set_points(vec![marker("a", -74.0, 40.7)]).unwrap();

        // Same zoom, tiny shift: gated out by should_recompute_clusters
        // (same discretized zoom) before the pan thresholds even apply.
        let nudge = Viewport::new(-74.001, 40.7, 0.35, 0.35);
        assert!(session.viewport_changed(nudge).unwrap().is_none());

        // Zoom change plus a real pan: re-query.
        let moved = Viewport::new(-74.5, 40.7, 0.7, 0.7);
        let request = session.viewport_changed(moved).unwrap();
        assert!(request.is_some());
    }

    #[test]
    fn test_zoom_bias_applied_to_request() {
        let config = ClusterConfig::default().with_zoom_range(0, 18);
        let session = ClusterSession::new(config).unwrap();
        session.set_points(vec![marker("a", -74.0, 40.7)]).unwrap();

        // delta 0.35 -> zoom 10, biased by -3 to 7
        let request = session
            .viewport_changed(city_viewport())
            .unwrap()
            .expect("query expected");
        assert_eq!(request.zoom, 7);
    }

    #[test]
    fn test_street_level_viewport_requests_raw_markers() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        session.set_points(vec![marker("a", -74.0, 40.7), marker("b", 10.0, 10.0)]).unwrap();

        // delta ~0.0024 implies zoom 17, at the default cluster-off threshold
        let street = Viewport::new(-74.0, 40.7, 360.0 / f64::powi(2.0, 17), 0.002);
        let request = session
            .viewport_changed(street)
            .unwrap()
            .expect("query expected");
        assert!(!request.clustered);

        let clusters = session.execute(&request).unwrap();
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.is_singleton()));
    }

    #[test]
    fn test_superseded_completion_is_discarded() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        session.viewport_changed(city_viewport()).unwrap();
        let first = session
            .set_points(vec![marker("a", -74.0, 40.7)])
            .unwrap()
            .unwrap();

        // A second viewport change supersedes the first request.
        let moved = Viewport::new(-60.0, 30.0, 0.7, 0.7);
        let second = session.viewport_changed(moved).unwrap().unwrap();
        assert!(second.sequence > first.sequence);

        let first_result = session.execute(&first).unwrap();
        assert!(!session.complete(&first, first_result));
        assert!(session.current().is_empty());
        assert_eq!(session.state(), SessionState::Querying);

        let second_result = session.execute(&second).unwrap();
        assert!(session.complete(&second, second_result));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_rebuild_invalidates_in_flight_query() {
        let session = ClusterSession::new(ClusterConfig::default()).unwrap();
        session.viewport_changed(city_viewport()).unwrap();
        let stale = session
            .set_points(vec![marker("a", -74.0, 40.7)])
            .unwrap()
            .unwrap();

        // Content changes before the query completes.
        let fresh = session
            .set_points(vec![marker("b", -74.0, 40.7), marker("c", -74.001, 40.7)])
            .unwrap()
            .unwrap();
        assert_ne!(stale.generation, fresh.generation);

        // The stale request executes against nothing and fails to apply.
        assert!(session.execute(&stale).unwrap().is_empty());
        assert!(!session.complete(&stale, Vec::new()));

        let clusters = session.execute(&fresh).unwrap();
        assert!(session.complete(&fresh, clusters));
        assert_eq!(
            session.current().iter().map(|c| c.point_count).sum::<usize>(),
            2
        );
    }
}
