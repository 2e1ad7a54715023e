pub mod luminance_classifier;
pub mod onnx_emotion_classifier;
pub mod timeout_classifier;
