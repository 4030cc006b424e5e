//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use diagchart_types::Record;
use serde_json::json;

use crate::chart::ChartConfig;
use crate::config::Settings;
use crate::error::RenderError;
use crate::pipeline::Scale;
use crate::render::{ChartJsRenderer, ChartRenderer};
use crate::report::{Report, ReportOptions};
use crate::source::DataSource;
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Main application state.
///
/// Charts are built once per data change and kept unscaled; the displayed
/// charts are recomputed from them whenever the scale changes.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub records: Vec<Record>,
    pub load_error: Option<String>,
    pub last_updated: Option<Instant>,

    // Charts
    pub report: Report,
    pub options: ReportOptions,
    pub scale: Scale,
    charts: Vec<ChartConfig>,
    scaled: Vec<ChartConfig>,
    pub selected: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App charting `report` from the given data source.
    pub fn new(source: Box<dyn DataSource>, report: Report, settings: &Settings) -> Self {
        Self {
            running: true,
            show_help: false,
            source,
            records: Vec::new(),
            load_error: None,
            last_updated: None,
            report,
            options: ReportOptions {
                max_legends: settings.max_legends,
            },
            scale: settings.scale,
            charts: Vec::new(),
            scaled: Vec::new(),
            selected: 0,
            theme: Theme::from_mode(settings.theme),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_TIMEOUT => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for new records and rebuild the charts.
    ///
    /// Returns true if new data was received. Source errors are kept in
    /// `load_error`; the last good charts stay visible.
    pub fn reload_data(&mut self) -> bool {
        let polled = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        let Some(records) = polled else {
            return false;
        };
        tracing::debug!(records = records.len(), source = self.source.description(), "new data");
        self.records = records;
        self.last_updated = Some(Instant::now());
        self.rebuild();
        true
    }

    /// Rebuild the unscaled charts from the cached records.
    pub fn rebuild(&mut self) {
        self.charts = self.report.build(&self.records, &self.options);
        if self.selected >= self.charts.len() {
            self.selected = self.charts.len().saturating_sub(1);
        }
        self.rescale();
    }

    fn rescale(&mut self) {
        self.scaled = self.charts.iter().map(|c| c.downsample(self.scale)).collect();
    }

    /// Set the downsampling factor, recomputing the displayed charts.
    pub fn set_scale(&mut self, scale: Scale) {
        if scale == self.scale {
            return;
        }
        self.scale = scale;
        self.rescale();
        self.set_status_message(format!("Scale: {}", scale));
    }

    /// Merge more points per window.
    pub fn scale_up(&mut self) {
        self.set_scale(self.scale.increment());
    }

    /// Merge fewer points per window.
    pub fn scale_down(&mut self) {
        self.set_scale(self.scale.decrement());
    }

    /// Switch to the given report and rebuild its charts.
    pub fn set_report(&mut self, report: Report) {
        self.report = report;
        self.selected = 0;
        self.rebuild();
    }

    /// Charts as displayed, at the current scale.
    pub fn charts(&self) -> &[ChartConfig] {
        &self.scaled
    }

    /// Charts as built, before downsampling.
    pub fn unscaled_charts(&self) -> &[ChartConfig] {
        &self.charts
    }

    pub fn current_chart(&self) -> Option<&ChartConfig> {
        self.scaled.get(self.selected)
    }

    /// Select the next chart (wraps around).
    pub fn next_chart(&mut self) {
        if !self.scaled.is_empty() {
            self.selected = (self.selected + 1) % self.scaled.len();
        }
    }

    /// Select the previous chart (wraps around).
    pub fn prev_chart(&mut self) {
        if !self.scaled.is_empty() {
            self.selected = (self.selected + self.scaled.len() - 1) % self.scaled.len();
        }
    }

    pub fn select_chart(&mut self, index: usize) {
        if index < self.scaled.len() {
            self.selected = index;
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the displayed charts as Chart.js configurations.
    pub fn export(&self, path: &Path) -> Result<()> {
        if self.scaled.is_empty() {
            anyhow::bail!("No charts to export");
        }
        write_export(path, self.report, self.scale, &self.scaled)
    }
}

/// Export document: the report, the scale and one Chart.js config per chart.
pub fn export_document(report: Report, scale: Scale, charts: &[ChartConfig]) -> Result<serde_json::Value, RenderError> {
    let mut renderer = ChartJsRenderer::new();
    let rendered = charts
        .iter()
        .map(|c| -> Result<serde_json::Value, RenderError> {
            Ok(json!({ "id": c.id, "config": renderer.render(c)? }))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "report": report,
        "scale": scale,
        "charts": rendered,
    }))
}

/// Write [`export_document`] to `path` as pretty-printed JSON.
pub fn write_export(path: &Path, report: Report, scale: Scale, charts: &[ChartConfig]) -> Result<()> {
    let document = export_document(report, scale, charts)?;
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), charts = charts.len(), "exported charts");
    Ok(())
}
