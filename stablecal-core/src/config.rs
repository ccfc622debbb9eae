//! Exporter configuration at ~/.config/stablecal/config.toml

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ExportError, ExportResult};
use crate::uid::DEFAULT_NAMESPACE;

pub const DEFAULT_PRODUCT_ID: &str = "-//communitybikewaysto.ca//verselogic.net//";
pub const DEFAULT_CALENDAR_NAME: &str = "Toronto Community Bikeways";

fn default_product_id() -> String {
    DEFAULT_PRODUCT_ID.to_string()
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_namespace() -> Uuid {
    DEFAULT_NAMESPACE
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportConfig {
    /// PRODID written in the calendar header
    #[serde(default = "default_product_id")]
    pub product_id: String,

    /// X-WR-CALNAME written in the calendar header
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// Namespace for UID derivation. Changing it changes every UID.
    #[serde(default = "default_namespace")]
    pub namespace: Uuid,

    /// Where `stablecal export` writes when no output is given
    pub output: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            product_id: default_product_id(),
            calendar_name: default_calendar_name(),
            namespace: default_namespace(),
            output: None,
        }
    }
}

impl ExportConfig {
    pub fn config_path() -> ExportResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ExportError::Config("Could not determine config directory".into()))?
            .join("stablecal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented-out config file
    /// on first use.
    pub fn load() -> ExportResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> ExportResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| ExportError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ExportError::Config(e.to_string()))
    }

    /// Output path with `~` expanded.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output.as_ref().map(|path| {
            PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ExportResult<()> {
        let contents = format!(
            "\
# stablecal configuration

# PRODID of exported calendars:
# product_id = \"{DEFAULT_PRODUCT_ID}\"

# Calendar title (X-WR-CALNAME):
# calendar_name = \"{DEFAULT_CALENDAR_NAME}\"

# Namespace for event UIDs. Changing it changes every UID.
# namespace = \"{DEFAULT_NAMESPACE}\"

# Default output file for `stablecal export`:
# output = \"~/calendar/bikeways.ics\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ExportError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ExportError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
