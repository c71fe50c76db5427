use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::program::ShaderSource;
use crate::shaders::Preset;

/// 24 ticks per second.
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 24.0;

/// Options for one mounted background, usually parsed from JSON handed in
/// by the page.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub preset: Preset,
    /// Minimum milliseconds between drawn frames.
    pub frame_interval_ms: f64,
    /// RGBA in 0..=1, cleared before every draw.
    pub clear_color: [f32; 4],
    pub blend: bool,
    /// Suspend ticks while `prefers-reduced-motion: reduce` matches.
    pub respect_reduced_motion: bool,
    /// Listen for pointer moves. Unset means "only if the fragment stage
    /// reads the pointer uniform".
    pub track_pointer: Option<bool>,
    /// Clip-space scale applied to the quad.
    pub quad_scale: [f32; 2],
    /// Width over height of the content. When set, the quad is letterboxed
    /// to this aspect on every resize, then scaled by `quad_scale`.
    pub content_aspect: Option<f32>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            blend: true,
            respect_reduced_motion: true,
            track_pointer: None,
            quad_scale: [1.0, 1.0],
            content_aspect: None,
        }
    }
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// `None` or a blank string yields the defaults.
    pub fn from_optional_json(text: Option<&str>) -> Result<Self, ConfigError> {
        match text.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => Self::from_json(text),
        }
    }

    /// Whether a background showing `source` should follow the pointer.
    pub fn pointer_tracking(&self, source: &ShaderSource) -> bool {
        self.track_pointer.unwrap_or_else(|| source.reads_pointer())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frame_interval_ms.is_finite() || self.frame_interval_ms < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "frame_interval_ms must be a non-negative number, got {}",
                self.frame_interval_ms
            )));
        }
        if self
            .clear_color
            .iter()
            .any(|c| !c.is_finite() || !(0.0..=1.0).contains(c))
        {
            return Err(ConfigError::Invalid(format!(
                "clear_color components must lie in 0..=1, got {:?}",
                self.clear_color
            )));
        }
        if self.quad_scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "quad_scale must be positive, got {:?}",
                self.quad_scale
            )));
        }
        if let Some(aspect) = self.content_aspect {
            if !aspect.is_finite() || aspect <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "content_aspect must be positive, got {aspect}"
                )));
            }
        }
        Ok(())
    }
}
