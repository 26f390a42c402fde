//! Pattern fan-out: apply many prompt templates to one transcript concurrently.

mod processor;

pub use processor::{PatternContext, PatternProcessor, MODEL_SETTING};
