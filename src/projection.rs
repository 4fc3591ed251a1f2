//! Web-mercator projection between geographic degrees and normalized
//! world coordinates in `[0, 1]`.
//!
//! Clustering distances are measured in this projected space: a pixel
//! radius at a given zoom maps to a constant world-unit radius, which is
//! what makes the per-level merge radius uniform across the map.

/// Tile edge length in pixels; the world is one tile wide at zoom 0.
pub(crate) const TILE_SIZE: f64 = 256.0;

/// Project longitude in degrees to world x in `[0, 1]`.
#[inline]
pub(crate) fn project_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Project latitude in degrees to world y in `[0, 1]`.
///
/// y grows southward. Latitudes at the poles project to the clamped
/// edges of the mercator square.
#[inline]
pub(crate) fn project_y(lat: f64) -> f64 {
    let sin = (lat.to_radians()).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / std::f64::consts::PI;
    y.clamp(0.0, 1.0)
}

/// Inverse of [`project_x`].
#[inline]
pub(crate) fn unproject_x(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Inverse of [`project_y`].
#[inline]
pub(crate) fn unproject_y(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0).to_radians();
    360.0 * y2.exp().atan() / std::f64::consts::PI - 90.0
}

/// Convert a pixel radius to world units at a zoom level.
#[inline]
pub(crate) fn radius_in_world_units(radius_px: f64, zoom: i32) -> f64 {
    radius_px / (TILE_SIZE * f64::powi(2.0, zoom))
}
