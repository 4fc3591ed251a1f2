//! Engine configuration.
//!
//! This module provides a streamlined, serializable configuration for the
//! clustering engine, loadable from JSON (or TOML with the `toml` feature)
//! with minimal complexity.

use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Clustering engine configuration.
///
/// Defaults suit a mobile map view: clustering levels 1 through 9, a -3
/// zoom bias, clustering switched off at zoom 17 and above, and the
/// world-scale gate at an 80 degree longitude span.
///
/// # Example
///
/// ```rust
/// use geocluster::ClusterConfig;
///
/// // Create default config
/// let config = ClusterConfig::default();
///
/// // Load from JSON
/// let json = r#"{
///     "radius": 60.0,
///     "max_cluster_zoom": 16
/// }"#;
/// let config: ClusterConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.max_cluster_zoom, 16);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Clustering radius in screen pixels at each level's resolution.
    /// Larger values merge more aggressively.
    #[serde(default = "ClusterConfig::default_radius")]
    pub radius: f64,

    /// Coarsest precomputed zoom level
    #[serde(default = "ClusterConfig::default_min_zoom")]
    pub min_zoom: i32,

    /// Finest precomputed zoom level
    #[serde(default = "ClusterConfig::default_max_zoom")]
    pub max_zoom: i32,

    /// Offset applied to the viewport-implied zoom when issuing queries.
    /// Negative values keep clusters coarser than the visual zoom,
    /// trading marker churn for smoother panning.
    #[serde(default = "ClusterConfig::default_zoom_bias")]
    pub zoom_bias: i32,

    /// Zoom level at which clustering switches off and raw markers are
    /// shown instead. Mobile map widgets want 16 on Android, 17 on iOS.
    #[serde(default = "ClusterConfig::default_max_cluster_zoom")]
    pub max_cluster_zoom: i32,

    /// Longitude span above which the view counts as world-scale and
    /// viewport changes are ignored entirely.
    #[serde(default = "ClusterConfig::default_world_delta_limit")]
    pub world_delta_limit: f64,
}

impl ClusterConfig {
    const fn default_radius() -> f64 {
        40.0
    }

    const fn default_min_zoom() -> i32 {
        1
    }

    const fn default_max_zoom() -> i32 {
        9
    }

    const fn default_zoom_bias() -> i32 {
        -3
    }

    const fn default_max_cluster_zoom() -> i32 {
        17
    }

    const fn default_world_delta_limit() -> f64 {
        80.0
    }

    /// Config with the Android cluster-off threshold.
    pub fn for_android() -> Self {
        Self {
            max_cluster_zoom: 16,
            ..Self::default()
        }
    }

    /// Set the clustering radius in pixels.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the precomputed zoom range.
    pub fn with_zoom_range(mut self, min_zoom: i32, max_zoom: i32) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Set the query zoom bias.
    pub fn with_zoom_bias(mut self, bias: i32) -> Self {
        self.zoom_bias = bias;
        self
    }

    /// Set the zoom level at which raw markers replace clusters.
    pub fn with_max_cluster_zoom(mut self, zoom: i32) -> Self {
        self.max_cluster_zoom = zoom;
        self
    }

    /// Set the world-scale longitude span gate.
    pub fn with_world_delta_limit(mut self, limit: f64) -> Self {
        self.world_delta_limit = limit;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.radius.is_finite() {
            return Err(format!("Radius must be finite, got: {}", self.radius));
        }
        if self.radius <= 0.0 {
            return Err(format!("Radius must be positive, got: {}", self.radius));
        }
        if self.min_zoom < 0 {
            return Err(format!(
                "Minimum zoom must be non-negative, got: {}",
                self.min_zoom
            ));
        }
        if self.min_zoom > self.max_zoom {
            return Err(format!(
                "Minimum zoom ({}) must not exceed maximum zoom ({})",
                self.min_zoom, self.max_zoom
            ));
        }
        if !self.world_delta_limit.is_finite() || self.world_delta_limit <= 0.0 {
            return Err(format!(
                "World delta limit must be positive, got: {}",
                self.world_delta_limit
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: ClusterConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a TOML string (requires `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: ClusterConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a TOML string (requires `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius: Self::default_radius(),
            min_zoom: Self::default_min_zoom(),
            max_zoom: Self::default_max_zoom(),
            zoom_bias: Self::default_zoom_bias(),
            max_cluster_zoom: Self::default_max_cluster_zoom(),
            world_delta_limit: Self::default_world_delta_limit(),
        }
    }
}
