use serde::{Deserialize, Serialize};

/// The closed emotion label set published by the pipeline.
///
/// `NoFace` and `DetectionFailed` are sentinel outcomes the pipeline
/// itself produces; classifiers only ever return the seven real labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
    #[serde(rename = "no-face")]
    NoFace,
    #[serde(rename = "detection-failed")]
    DetectionFailed,
}

impl Emotion {
    /// Labels a classifier may legitimately return.
    pub const CLASSIFIABLE: &'static [Emotion] = &[
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
            Emotion::NoFace => "no face",
            Emotion::DetectionFailed => "detection failed",
        };
        write!(f, "{name}")
    }
}

/// A label plus confidence in `[0, 1]`.
///
/// Confidence is meaningful only for classifiable labels; the sentinel
/// constructors pin it to exactly 0.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: Emotion,
    pub confidence: f32,
}

impl Classification {
    /// Builds a classification, clamping confidence into `[0, 1]`.
    pub fn new(label: Emotion, confidence: f32) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn no_face() -> Self {
        Self {
            label: Emotion::NoFace,
            confidence: 0.0,
        }
    }

    pub fn detection_failed() -> Self {
        Self {
            label: Emotion::DetectionFailed,
            confidence: 0.0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self.label, Emotion::NoFace | Emotion::DetectionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_clamps_confidence() {
        assert_relative_eq!(Classification::new(Emotion::Happy, 1.7).confidence, 1.0);
        assert_relative_eq!(Classification::new(Emotion::Sad, -0.2).confidence, 0.0);
        assert_relative_eq!(Classification::new(Emotion::Fear, 0.4).confidence, 0.4);
    }

    #[test]
    fn test_sentinels_have_zero_confidence() {
        assert_eq!(Classification::no_face().label, Emotion::NoFace);
        assert_eq!(Classification::no_face().confidence, 0.0);
        assert_eq!(
            Classification::detection_failed().label,
            Emotion::DetectionFailed
        );
        assert_eq!(Classification::detection_failed().confidence, 0.0);
        assert!(Classification::no_face().is_sentinel());
        assert!(Classification::detection_failed().is_sentinel());
        assert!(!Classification::new(Emotion::Happy, 0.8).is_sentinel());
    }

    #[test]
    fn test_classifiable_excludes_sentinels() {
        assert_eq!(Emotion::CLASSIFIABLE.len(), 7);
        assert!(!Emotion::CLASSIFIABLE.contains(&Emotion::NoFace));
        assert!(!Emotion::CLASSIFIABLE.contains(&Emotion::DetectionFailed));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Emotion::Happy.to_string(), "happy");
        assert_eq!(Emotion::NoFace.to_string(), "no face");
        assert_eq!(Emotion::DetectionFailed.to_string(), "detection failed");
    }
}
