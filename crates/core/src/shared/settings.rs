use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Flat pipeline configuration, read once at startup.
///
/// The heuristic thresholds are tuning constants carried over from the
/// reference detector; they are configuration defaults, not validated
/// domain truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum inter-frame interval for the worker loop, in milliseconds.
    pub cadence_ms: u64,
    /// Crops narrower or shorter than this classify as detection-failed.
    pub min_face_px: u32,
    /// Upper bound on a single classifier call, in milliseconds.
    pub classify_timeout_ms: u64,
    /// Mean luminance above which a crop counts as bright.
    pub bright_mean: f32,
    /// Mean luminance below which a crop counts as dark.
    pub dark_mean: f32,
    /// Luminance stddev above which a bright crop counts as high-contrast.
    pub contrast_min: f32,
    /// Block edge length for the skin-tone locator grid, in pixels.
    pub skin_block_px: u32,
    /// Fraction of skin pixels a block needs to count as face-like.
    pub skin_coverage_min: f32,
    /// Confidence floor for ONNX face detections.
    pub locator_confidence: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cadence_ms: 50,
            min_face_px: 20,
            classify_timeout_ms: 500,
            bright_mean: 120.0,
            dark_mean: 80.0,
            contrast_min: 30.0,
            skin_block_px: 16,
            skin_coverage_min: 0.4,
            locator_confidence: 0.5,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn cadence(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cadence_ms)
    }

    pub fn classify_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.classify_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_thresholds() {
        let s = Settings::default();
        assert_relative_eq!(s.bright_mean, 120.0);
        assert_relative_eq!(s.dark_mean, 80.0);
        assert_relative_eq!(s.contrast_min, 30.0);
        assert_eq!(s.cadence_ms, 50);
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "cadence_ms": 33, "min_face_px": 10 }}"#).unwrap();

        let s = Settings::load(file.path()).unwrap();
        assert_eq!(s.cadence_ms, 33);
        assert_eq!(s.min_face_px, 10);
        assert_relative_eq!(s.bright_mean, 120.0); // untouched default
    }

    #[test]
    fn test_load_roundtrip() {
        let mut original = Settings::default();
        original.classify_timeout_ms = 250;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&original).unwrap()).unwrap();

        let loaded = Settings::load(file.path()).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = Settings::load(Path::new("/nonexistent/settings.json"));
        assert!(matches!(err, Err(SettingsError::Io(_))));
    }

    #[test]
    fn test_load_malformed_json_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = Settings::load(file.path());
        assert!(matches!(err, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_duration_helpers() {
        let s = Settings::default();
        assert_eq!(s.cadence(), std::time::Duration::from_millis(50));
        assert_eq!(
            s.classify_timeout(),
            std::time::Duration::from_millis(500)
        );
    }
}
