//! Transformation: classification config, the engine, and the pipeline.

pub mod classify;
pub mod engine;
pub mod pipeline;

pub use classify::{SectorMap, ThresholdScale, TransformConfig};
pub use engine::{transform, RunSummary, TransformEngine, TransformOutput};
