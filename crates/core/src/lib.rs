//! Real-time emotion recognition pipeline.
//!
//! Captures frames from a camera or synthetic source, locates the most
//! prominent face, classifies its emotional expression, annotates the
//! frame, and publishes the result through a lossy single-slot handoff
//! that display frontends poll at their own pace.
//!
//! Each stage sits behind a trait (`FrameSource`, `FaceLocator`,
//! `EmotionClassifier`, `AnnotationRenderer`) so backends can be swapped
//! without touching the orchestration in [`pipeline::emotion_pipeline`].

pub mod capture;
pub mod classify;
pub mod detect;
pub mod pipeline;
pub mod render;
pub mod shared;
