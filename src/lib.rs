pub mod api;
pub mod commands;
pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod providers;
pub mod storage;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use config::RagConfig;
pub use error::{RagError, RagResult};
pub use pipeline::{PipelineFactory, RagPipeline};
