//! # diagchart
//!
//! Grouped aggregation and downsampling of MongoDB diagnostics into
//! chart-ready series, with a terminal viewer and Chart.js export.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │  source  │──▶│  report  │──▶│ pipeline │──▶│  chart   │──▶│  render  │
//! │ (records)│   │(key/value│   │(group_by,│   │ (config) │   │(chart.js,│
//! │          │   │ reducers)│   │ scale)   │   │          │   │ text,tui)│
//! └──────────┘   └──────────┘   └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! - **[`source`]**: [`DataSource`] trait with file, channel and stream
//!   implementations producing flat [`Record`]s
//! - **[`pipeline`]**: the grouped aggregation ([`group_by`]), downsampling
//!   ([`scale_data`]) and dataset assembly ([`assemble`])
//! - **[`report`]**: the twelve diagnostics reports
//! - **[`chart`]**: the renderer-independent [`ChartConfig`]
//! - **[`render`]**: [`ChartRenderer`] adapters
//! - **[`app`]**, **[`events`]**, **[`ui`]**: the terminal viewer
//!
//! ## Usage
//!
//! ### Aggregating records
//!
//! ```
//! use diagchart::{group_by, scale_data, Record, Reducer, Tick};
//!
//! let records = vec![
//!     Record::builder().field("t", 0).field("ns", "a").field("n", 1).build(),
//!     Record::builder().field("t", 0).field("ns", "a").field("n", 2).build(),
//!     Record::builder().field("t", 60_000).field("ns", "b").field("n", 5).build(),
//! ];
//! let grouped = group_by(
//!     &records,
//!     |r| diagchart::fields::tick(r, "t"),
//!     |r| diagchart::fields::group_key(r, "ns"),
//!     |r| diagchart::fields::number(r, "n"),
//!     Reducer::Sum,
//! );
//! assert_eq!(grouped.ticks, [Tick::Millis(0), Tick::Millis(60_000)]);
//! assert_eq!(grouped.total(), 8.0);
//!
//! assert_eq!(scale_data(&[1.0, 2.0, 3.0], 2).unwrap(), [3.0, 3.0]);
//! ```
//!
//! ### Building a report and exporting it
//!
//! ```
//! use diagchart::{ChartJsRenderer, ChartRenderer, Record, Report, ReportOptions};
//!
//! let records = vec![Record::builder().field("_key", "7.0.4").field("value", 3).build()];
//! let charts = Report::VersionDistribution.build(&records, &ReportOptions::default());
//! let config = ChartJsRenderer::new().render(&charts[0]).unwrap();
//! assert_eq!(config["type"], "pie");
//! ```
//!
//! ### Viewing a live stream
//!
//! ```no_run
//! use std::io::Cursor;
//! use diagchart::{App, Report, Settings, StreamSource};
//!
//! # tokio_test::block_on(async {
//! // Example with a cursor (in practice, use TcpStream)
//! let data = b"{}\n";
//! let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
//! let app = App::new(Box::new(source), Report::SlowRate, &Settings::default());
//! # });
//! ```

pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod source;
pub mod ui;

pub use diagchart_types::{GroupKey, Point, Record, RecordBuilder, Series, Tick, Value};

pub use app::App;
pub use chart::{ChartConfig, ChartType, Color, Dataset, DatasetData, Palette};
pub use config::{Overrides, Settings, ThemeMode};
pub use error::{PipelineError, RenderError, SourceError};
pub use pipeline::{
    assemble, fields, group_by, group_entries, scale_data, scale_data_with, AssembleOptions, Grouped,
    Reducer, Scale,
};
pub use render::{ChartJsRenderer, ChartRenderer, PreparedChart, TextRenderer, TuiRenderer};
pub use report::{Report, ReportOptions};
pub use source::{ChannelSource, DataSource, FileSource, StreamSource};
