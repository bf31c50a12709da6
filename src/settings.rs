use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::directory::ExtensionDirectory;

pub const DEFAULT_CONFIG_FILE: &str = "call_analyzer.toml";
pub const ENV_PREFIX: &str = "CALLS";

/// Optional overrides layered as: built-in defaults < TOML file < environment.
///
/// ```toml
/// [directory]
/// 7773 = "AD"
/// 7784 = "MV"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Extension -> user id. Empty means the built-in reference directory.
    pub directory: BTreeMap<String, String>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("failed to load settings from {}", path.display()))?
            .try_deserialize::<Settings>()
            .context("invalid settings")?;
        Ok(settings)
    }

    pub fn directory(&self) -> Result<ExtensionDirectory> {
        if self.directory.is_empty() {
            return Ok(ExtensionDirectory::builtin());
        }
        info!(entries = self.directory.len(), "using configured extension directory");
        ExtensionDirectory::new(self.directory.clone()).context("invalid extension directory")
    }
}

// ── Tests ──
