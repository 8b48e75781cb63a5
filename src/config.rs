use serde::{Deserialize, Serialize};

/// How strongly the travel-time ratio bends the radial distance.
pub const DEFAULT_DAMPING: f64 = 0.6;
/// Exponent of the inverse-distance weights used by the mesh warp.
pub const DEFAULT_IDW_POWER: f64 = 2.5;
/// Exponent applied to distances before MDS to compress long-tail outliers.
pub const DEFAULT_DISTANCE_EXPONENT: f64 = 0.7;
/// Unreachable entries become this multiple of the largest finite distance.
pub const UNREACHABLE_FACTOR: f64 = 1.5;
/// Queries closer than this to a control point snap to its target.
pub const DEFAULT_SNAP_RADIUS: f64 = 1.0;
pub const DEFAULT_BOUNDARY_INTERVAL: f64 = 50.0;
pub const DEFAULT_GRID_SPACING: f64 = 40.0;
pub const DEFAULT_PADDING: f64 = 40.0;

/// Target drawing area in screen-plane units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_padding")]
    pub padding: f64,
}

fn default_padding() -> f64 {
    DEFAULT_PADDING
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport {
            width,
            height,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(960.0, 600.0)
    }
}

/// Tunables for every engine call. Passed explicitly; there is no shared
/// engine state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub damping: f64,
    pub idw_power: f64,
    pub distance_exponent: f64,
    pub snap_radius: f64,
    /// Spacing of the fixed ring of points along the viewport edges.
    pub boundary_interval: f64,
    /// Spacing of the interior grid filtered by the landmass predicate.
    pub grid_spacing: f64,
    pub viewport: Viewport,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            damping: DEFAULT_DAMPING,
            idw_power: DEFAULT_IDW_POWER,
            distance_exponent: DEFAULT_DISTANCE_EXPONENT,
            snap_radius: DEFAULT_SNAP_RADIUS,
            boundary_interval: DEFAULT_BOUNDARY_INTERVAL,
            grid_spacing: DEFAULT_GRID_SPACING,
            viewport: Viewport::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Damping clamped into `[0, 1]`.
    pub fn damping(&self) -> f64 {
        if self.damping.is_finite() {
            self.damping.clamp(0.0, 1.0)
        } else {
            DEFAULT_DAMPING
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_overrides_keep_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"damping": 0.25}"#).unwrap();
        assert_eq!(cfg.damping, 0.25);
        assert_eq!(cfg.idw_power, DEFAULT_IDW_POWER);
        assert_eq!(cfg.viewport, Viewport::default());
    }

    #[test]
    fn damping_is_clamped() {
        let cfg = EngineConfig {
            damping: 3.0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.damping(), 1.0);
    }
}
