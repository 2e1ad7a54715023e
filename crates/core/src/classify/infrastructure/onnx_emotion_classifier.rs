use std::path::Path;

use crate::classify::domain::emotion_classifier::{ClassifyError, EmotionClassifier};
use crate::shared::classification::Emotion;
use crate::shared::frame::Frame;

/// Model input resolution (square).
const INPUT_SIZE: usize = 224;

/// Index order of the model's output distribution.
const LABEL_ORDER: [Emotion; 7] = [
    Emotion::Angry,
    Emotion::Disgust,
    Emotion::Fear,
    Emotion::Happy,
    Emotion::Sad,
    Emotion::Surprise,
    Emotion::Neutral,
];

/// Model-backed classifier via ONNX Runtime.
///
/// Expects a model taking `[1, 3, 224, 224]` normalized RGB and
/// emitting seven logits in FER order (angry, disgust, fear, happy,
/// sad, surprise, neutral). Softmax turns logits into a distribution;
/// the dominant label and its probability become the classification.
pub struct OnnxEmotionClassifier {
    session: ort::session::Session,
}

impl OnnxEmotionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self { session })
    }

    fn run(&mut self, face: &Frame) -> Result<(Emotion, f32), Box<dyn std::error::Error>> {
        let input_tensor = preprocess(face);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        let logits_array = outputs[0].try_extract_array::<f32>()?;
        let logits = logits_array.as_slice().ok_or("cannot get logits slice")?;
        if logits.len() < LABEL_ORDER.len() {
            return Err(format!(
                "model emitted {} logits, expected {}",
                logits.len(),
                LABEL_ORDER.len()
            )
            .into());
        }

        let probabilities = softmax(&logits[..LABEL_ORDER.len()]);
        Ok(dominant(&probabilities))
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&mut self, face: &Frame) -> Result<(Emotion, f32), ClassifyError> {
        self.run(face)
            .map_err(|e| ClassifyError::Failed(e.to_string()))
    }
}

/// Resize the crop to model resolution (nearest neighbor), normalize to
/// `[0, 1]`, NCHW layout.
fn preprocess(face: &Frame) -> ndarray::Array4<f32> {
    let src = face.as_ndarray();
    let (fw, fh) = (face.width() as usize, face.height() as usize);

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE {
        let sy = (y * fh / INPUT_SIZE).min(fh.saturating_sub(1));
        for x in 0..INPUT_SIZE {
            let sx = (x * fw / INPUT_SIZE).min(fw.saturating_sub(1));
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[sy, sx, c]] as f32 / 255.0;
            }
        }
    }
    tensor
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max_logit = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&x| (x - max_logit).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.iter().map(|&x| x / sum).collect()
}

/// Dominant label and its probability.
fn dominant(probabilities: &[f32]) -> (Emotion, f32) {
    let (index, &probability) = probabilities
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .expect("distribution is never empty");
    (LABEL_ORDER[index], probability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 1001.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn test_uniform_logits_give_uniform_distribution() {
        let probs = softmax(&[0.5; 7]);
        for p in &probs {
            assert_relative_eq!(*p, 1.0 / 7.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_dominant_picks_peak() {
        let mut probs = vec![0.05; 7];
        probs[3] = 0.7; // happy slot
        let (label, confidence) = dominant(&probs);
        assert_eq!(label, Emotion::Happy);
        assert_relative_eq!(confidence, 0.7);
    }

    #[test]
    fn test_label_order_is_fer_standard() {
        assert_eq!(LABEL_ORDER[0], Emotion::Angry);
        assert_eq!(LABEL_ORDER[6], Emotion::Neutral);
        assert_eq!(LABEL_ORDER.len(), Emotion::CLASSIFIABLE.len());
    }

    #[test]
    fn test_preprocess_shape() {
        let face = Frame::new(vec![128u8; 10 * 10 * 3], 10, 10, 0);
        let tensor = preprocess(&face);
        assert_eq!(tensor.shape(), &[1, 3, INPUT_SIZE, INPUT_SIZE]);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 128.0 / 255.0);
    }
}
