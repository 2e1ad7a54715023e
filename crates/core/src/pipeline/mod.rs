pub mod emotion_pipeline;
pub mod pipeline_logger;
pub mod stats;
pub mod view_slot;
