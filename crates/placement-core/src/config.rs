//! Placement configuration.
//!
//! Settings can come from defaults, environment variables or builder calls.

use std::path::{Path, PathBuf};

use placement_model::MIN_OVERLAY_EDGE;

/// Route the confirm action navigates to.
pub const CONFIRMATION_ROUTE: &str = "/request-loan/confirmation";

/// Width the page is rendered at, in pixels.
pub const DEFAULT_RENDER_WIDTH: u32 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Page render width in pixels
    pub render_width_px: u32,
    /// Resize floor for both overlay edges
    pub min_overlay_edge: f64,
    /// Root of the local key-value store; `None` uses the platform data dir
    pub data_dir: Option<PathBuf>,
    /// Route pushed after a successful confirm
    pub confirmation_route: String,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            render_width_px: DEFAULT_RENDER_WIDTH,
            min_overlay_edge: MIN_OVERLAY_EDGE,
            data_dir: None,
            confirmation_route: CONFIRMATION_ROUTE.to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

impl PlacementConfig {
    pub fn with_render_width(mut self, width_px: u32) -> Self {
        self.render_width_px = width_px.max(1);
        self
    }

    /// Raises the resize floor. Values below [`MIN_OVERLAY_EDGE`] are clamped up to it.
    pub fn with_min_overlay_edge(mut self, edge: f64) -> Self {
        if edge.is_finite() {
            self.min_overlay_edge = edge.max(MIN_OVERLAY_EDGE);
        }
        self
    }

    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_confirmation_route(mut self, route: impl Into<String>) -> Self {
        self.confirmation_route = route.into();
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// - `SIGNPLACE_RENDER_WIDTH`: page render width in pixels (default: 300)
    /// - `SIGNPLACE_MIN_SIZE`: minimum overlay edge in pixels, at least 50 (default: 50)
    /// - `SIGNPLACE_DATA_DIR`: local store directory
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`PlacementConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("SIGNPLACE_RENDER_WIDTH") {
            config.render_width_px = value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|width| *width > 0)
                .ok_or(ConfigError::InvalidValue { name: "SIGNPLACE_RENDER_WIDTH", value })?;
        }

        if let Some(value) = lookup("SIGNPLACE_MIN_SIZE") {
            config.min_overlay_edge = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|edge| edge.is_finite() && *edge >= MIN_OVERLAY_EDGE)
                .ok_or(ConfigError::InvalidValue { name: "SIGNPLACE_MIN_SIZE", value })?;
        }

        if let Some(value) = lookup("SIGNPLACE_DATA_DIR") {
            if !value.is_empty() {
                config.data_dir = Some(PathBuf::from(value));
            }
        }

        Ok(config)
    }
}
