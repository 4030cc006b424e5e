//! Layered settings.
//!
//! Built-in defaults, then an optional TOML file, then `DIAGCHART_*`
//! environment variables, then command-line flags.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::pipeline::{Scale, DEFAULT_MAX_LEGENDS};
use crate::source::DEFAULT_MAX_RECORDS;

/// File read when no `--config` is given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "diagchart.toml";
pub const ENV_PREFIX: &str = "DIAGCHART";

/// Terminal colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Pick light or dark from the terminal background.
    #[default]
    Auto,
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Initial downsampling factor.
    pub scale: Scale,
    /// Hide legends of charts with more datasets than this.
    pub max_legends: usize,
    /// Seconds between source polls in the TUI.
    pub refresh_secs: u64,
    /// Records a streaming source keeps before evicting the oldest.
    pub max_records: usize,
    pub theme: ThemeMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: Scale::ONE,
            max_legends: DEFAULT_MAX_LEGENDS,
            refresh_secs: 1,
            max_records: DEFAULT_MAX_RECORDS,
            theme: ThemeMode::Auto,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub scale: Option<Scale>,
    pub max_legends: Option<usize>,
    pub refresh_secs: Option<u64>,
    pub max_records: Option<usize>,
}

impl Settings {
    /// Load settings from `path` (or [`DEFAULT_CONFIG_FILE`] when present),
    /// the environment and `overrides`.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Self> {
        let env = Environment::with_prefix(ENV_PREFIX).try_parsing(true);
        Self::load_with(path, env, overrides)
    }

    fn load_with(path: Option<&Path>, env: Environment, overrides: &Overrides) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("scale", defaults.scale.get() as i64)?
            .set_default("max_legends", defaults.max_legends as i64)?
            .set_default("refresh_secs", defaults.refresh_secs as i64)?
            .set_default("max_records", defaults.max_records as i64)?
            .set_default("theme", "auto")?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(env)
            .set_override_option("scale", overrides.scale.map(|s| s.get() as i64))?
            .set_override_option("max_legends", overrides.max_legends.map(|n| n as i64))?
            .set_override_option("refresh_secs", overrides.refresh_secs.map(|n| n as i64))?
            .set_override_option("max_records", overrides.max_records.map(|n| n as i64))?
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.refresh_secs == 0 {
            bail!("refresh_secs must be at least 1");
        }
        if self.max_records == 0 {
            bail!("max_records must be at least 1");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}
