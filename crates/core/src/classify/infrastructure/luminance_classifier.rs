use crate::classify::domain::emotion_classifier::{ClassifyError, EmotionClassifier};
use crate::shared::classification::Emotion;
use crate::shared::frame::Frame;
use crate::shared::settings::Settings;

/// Confidence cap for the happy branch.
const HAPPY_CAP: f32 = 0.8;
/// Confidence cap for the sad branch.
const SAD_CAP: f32 = 0.7;
/// Fixed confidence for bright but flat crops.
const NEUTRAL_BRIGHT_CONFIDENCE: f32 = 0.6;
/// Fixed confidence for mid-luminance crops.
const NEUTRAL_MID_CONFIDENCE: f32 = 0.5;

/// Fast heuristic classifier over crop luminance statistics.
///
/// Bright, high-contrast crops read as happy; bright flat crops as
/// neutral; dark crops as sad. Confidence is a clamped linear function
/// of distance from the nearest threshold, capped per branch. The exact
/// thresholds come from [`Settings`] and the defaults reproduce the
/// reference detector bit-for-bit.
pub struct LuminanceClassifier {
    bright_mean: f32,
    dark_mean: f32,
    contrast_min: f32,
}

impl LuminanceClassifier {
    pub fn new(bright_mean: f32, dark_mean: f32, contrast_min: f32) -> Self {
        Self {
            bright_mean,
            dark_mean,
            contrast_min,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.bright_mean, settings.dark_mean, settings.contrast_min)
    }

    /// Mean and standard deviation of Rec.601 luminance over the crop.
    fn luminance_stats(face: &Frame) -> (f32, f32) {
        let data = face.data();
        let pixels = (data.len() / 3) as f64;
        if pixels == 0.0 {
            return (0.0, 0.0);
        }

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for px in data.chunks_exact(3) {
            let luma =
                0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64;
            sum += luma;
            sum_sq += luma * luma;
        }

        let mean = sum / pixels;
        let variance = (sum_sq / pixels - mean * mean).max(0.0);
        (mean as f32, variance.sqrt() as f32)
    }
}

impl Default for LuminanceClassifier {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl EmotionClassifier for LuminanceClassifier {
    fn classify(&mut self, face: &Frame) -> Result<(Emotion, f32), ClassifyError> {
        if face.data().is_empty() {
            return Err(ClassifyError::Failed("empty crop".into()));
        }

        let (mean, stddev) = Self::luminance_stats(face);

        let result = if mean > self.bright_mean {
            if stddev > self.contrast_min {
                let confidence = ((mean - 100.0) / 50.0).min(HAPPY_CAP).max(0.0);
                (Emotion::Happy, confidence)
            } else {
                (Emotion::Neutral, NEUTRAL_BRIGHT_CONFIDENCE)
            }
        } else if mean < self.dark_mean {
            let confidence = ((self.dark_mean - mean) / 40.0).min(SAD_CAP).max(0.0);
            (Emotion::Sad, confidence)
        } else {
            (Emotion::Neutral, NEUTRAL_MID_CONFIDENCE)
        };

        Ok(result)
    }
}
