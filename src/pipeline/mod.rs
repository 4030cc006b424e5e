//! The aggregation and downsampling pipeline.
//!
//! Pure, synchronous transformations from borrowed records to chart-ready
//! series. Nothing here holds state between calls.

mod aggregate;
mod assemble;
mod downsample;
pub mod fields;

pub use aggregate::{group_by, group_entries, partition, totals_by_key, Grouped, Measure, Reducer};
pub use assemble::{assemble, AssembleOptions, Assembled, DEFAULT_MAX_LEGENDS};
pub use downsample::{downsample_by, scale_data, scale_data_with, Downsample, Scale, MAX_SCALE};
