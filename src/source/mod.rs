//! Data source abstraction for receiving diagnostics records.
//!
//! Sources hand the application the full, current set of records whenever it
//! changes: a JSON file on disk, an in-process channel, or a stream of
//! newline-delimited JSON such as a TCP connection.

mod channel;
mod file;
mod records;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use records::{records_from_str, records_from_value, VALUE_FIELD};
pub use stream::{StreamSource, DEFAULT_MAX_RECORDS};

use std::fmt::Debug;

use diagchart_types::Record;

/// Trait for receiving records from various sources.
///
/// # Example
///
/// ```
/// use diagchart::{DataSource, FileSource};
///
/// let mut source = FileSource::new("slow_rate.json");
/// if let Some(records) = source.poll() {
///     println!("Got {} records", records.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest records.
    ///
    /// Returns `Some(records)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Vec<Record>>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The error from the last poll, if any.
    fn error(&self) -> Option<&str>;
}
