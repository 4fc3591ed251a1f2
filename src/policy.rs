//! Viewport change policy.
//!
//! Pure decision functions that gate cluster recomputation as viewport
//! updates stream in from the map widget: converting a longitude span to
//! a discretized zoom level, debouncing pan/zoom events, suppressing
//! recomputation at world scale, and switching clustering off entirely
//! at street-level zooms.

use crate::error::{ClusterError, Result};
use geocluster_types::{BoundingBox, Viewport};

/// Discretized zoom level implied by a visible longitude span.
///
/// `zoom(delta) = round(ln(360 / delta) / ln 2)`: the span of the whole
/// world maps to zoom 0 and every halving of the span adds one level.
/// Fails with [`ClusterError::InvalidViewport`] for non-positive or
/// non-finite deltas.
///
/// # Examples
///
/// ```
/// use geocluster::policy::zoom_for_longitude_delta;
///
/// assert_eq!(zoom_for_longitude_delta(360.0).unwrap(), 0);
/// assert_eq!(zoom_for_longitude_delta(80.0).unwrap(), 2);
/// assert!(zoom_for_longitude_delta(0.0).is_err());
/// ```
pub fn zoom_for_longitude_delta(delta: f64) -> Result<i32> {
    if !delta.is_finite() || delta <= 0.0 {
        return Err(ClusterError::InvalidViewport(format!(
            "Longitude delta must be positive and finite, got: {}",
            delta
        )));
    }
    Ok((360.0 / delta).log2().round() as i32)
}

/// Zoom level at which a bounding box fits on screen.
///
/// Computed from the mercator fraction of the world the box covers
/// along each axis; the binding axis wins and the result is capped at
/// zoom 20. A degenerate box (zero span on an axis) is unconstrained
/// along that axis and falls back to the other one. Useful for
/// fit-to-bounds camera moves before handing the resulting viewport to
/// the session.
pub fn zoom_for_bounds(bounds: &BoundingBox) -> i32 {
    const ZOOM_MAX: i32 = 20;

    let lat_fraction =
        (mercator_lat(bounds.north()) - mercator_lat(bounds.south())) / std::f64::consts::PI;
    let lng_fraction = bounds.width() / 360.0;

    let mut level = ZOOM_MAX;
    for fraction in [lat_fraction, lng_fraction] {
        let candidate = (1.0 / fraction).log2().floor();
        if !candidate.is_nan() {
            // An empty axis yields +inf, which the cap absorbs.
            level = level.min(candidate as i32);
        }
    }
    level
}

/// Half the mercator-projected latitude, clamped at the poles.
fn mercator_lat(lat: f64) -> f64 {
    let sin = lat.to_radians().sin();
    let rad_x2 = ((1.0 + sin) / (1.0 - sin)).ln() / 2.0;
    rad_x2.clamp(-std::f64::consts::PI, std::f64::consts::PI) / 2.0
}

/// Whether a new viewport differs enough from the last-queried one to
/// warrant a re-query.
///
/// True iff the latitude span changed by more than 1/8 of its previous
/// value, or the center moved by at least 1/5 of the previous span along
/// either axis. This debounces the high-frequency viewport stream a drag
/// gesture produces; identical viewports never re-query.
pub fn should_requery(previous: &Viewport, next: &Viewport) -> bool {
    (next.latitude_delta - previous.latitude_delta).abs() > previous.latitude_delta / 8.0
        || (next.longitude() - previous.longitude()).abs() >= previous.longitude_delta / 5.0
        || (next.latitude() - previous.latitude()).abs() >= previous.latitude_delta / 5.0
}

/// Whether the cluster set must be recomputed for a zoom transition.
///
/// At or below `min_zoom` the answer is always yes (the world-scale view
/// has a single coarsest level); above it, only when the discretized
/// zoom actually changed.
pub fn should_recompute_clusters(current_zoom: i32, previous_zoom: i32, min_zoom: i32) -> bool {
    if current_zoom <= min_zoom {
        true
    } else {
        current_zoom != previous_zoom
    }
}

/// Whether markers should be clustered at all at a zoom level.
///
/// Above `max_cluster_zoom` clusters would typically hold a single
/// marker anyway, and per-marker precision matters more, so raw markers
/// are shown instead.
pub fn should_cluster(zoom: i32, max_cluster_zoom: i32) -> bool {
    zoom < max_cluster_zoom
}
