pub mod onnx_face_locator;
pub mod skin_tone_locator;
