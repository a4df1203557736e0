//! Runtime settings
//!
//! Settings come from an optional TOML file and can be overridden on the
//! command line. The tax rate and exemption limit are fixed and cannot be set
//! here.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CapitalGainsError;
use crate::tax::{LossRecording, SellAccounting, TaxCalculator};

const APP_DIR: &str = "capital-gains";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Whether exempt sells reduce the held share count
    pub sell_accounting: SellAccounting,
    /// When a losing taxable sell adds to the carried loss
    pub non_exempt_losses: LossRecording,
    /// Reject negative values and oversells instead of computing a tax for them
    pub strict: bool,
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, CapitalGainsError> {
        toml::from_str(contents).map_err(|e| CapitalGainsError::Config(e.to_string()))
    }

    /// Load settings from `path`. The file must exist.
    pub fn from_file(path: &Path) -> Result<Self, CapitalGainsError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CapitalGainsError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load settings from an explicit path, or from the default location when
    /// it exists, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CapitalGainsError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn calculator(&self) -> TaxCalculator {
        TaxCalculator::with_options(self.sell_accounting, self.strict)
            .with_loss_recording(self.non_exempt_losses)
    }
}

/// `<config_home>/capital-gains/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}
