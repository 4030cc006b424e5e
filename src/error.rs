//! Error types for the pipeline, renderers and data sources.

use thiserror::Error;

/// Errors raised by the aggregation and downsampling pipeline.
///
/// The pipeline only fails on invalid input shape; missing fields and empty
/// input are handled in-band.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// The downsampling factor must be an integer >= 1.
    #[error("invalid scale {0:?}: must be an integer >= 1")]
    InvalidScale(String),
}

/// Errors raised while turning a chart configuration into renderer output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The chart has a shape the renderer cannot draw.
    #[error("unsupported chart: {0}")]
    Unsupported(String),

    /// Serialising the chart failed.
    #[error("failed to serialize chart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while reading records from an input.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading the input failed.
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// The input was not valid JSON or newline-delimited JSON.
    #[error("Parse error: {0}")]
    Parse(String),
}
