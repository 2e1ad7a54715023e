use thiserror::Error;

use crate::shared::classification::Emotion;
use crate::shared::frame::Frame;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The classifier could not produce a label for this crop. The
    /// pipeline maps this to `DetectionFailed` and moves on.
    #[error("classification failed: {0}")]
    Failed(String),
    /// The call exceeded its latency bound and was abandoned.
    #[error("classification timed out")]
    Timeout,
}

/// Domain interface for emotion classification over a face crop.
///
/// Implementations only ever see usable crops (the pipeline filters
/// the no-face and degenerate cases before calling) and only return
/// labels from [`Emotion::CLASSIFIABLE`] with confidence in `[0, 1]`.
pub trait EmotionClassifier: Send {
    fn classify(&mut self, face: &Frame) -> Result<(Emotion, f32), ClassifyError>;
}
