pub mod image_sequence_source;
pub mod synthetic_source;
#[cfg(feature = "webcam")]
pub mod webcam_source;
