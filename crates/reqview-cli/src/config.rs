//! Application configuration.
//!
//! Settings come from an optional JSON file, looked up in this order:
//! the `--config` flag, the `REQVIEW_CONFIG` environment variable, then
//! `reqview.json` in the working directory. Every field has a default, so an
//! absent file or a partial one is fine. Command-line flags are applied on
//! top by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use reqview_ingest::{BuildOptions, EmptyResultPolicy, ReportNaming};
use reqview_persistence::{Backend, RemoteConfig};
use serde::{Deserialize, Serialize};

use crate::links::DEFAULT_LINK_TEMPLATE;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "REQVIEW_CONFIG";

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "reqview.json";

/// Data directory used when none is configured.
pub const DEFAULT_DATA_DIR: &str = "reqview-data";

/// What a session may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Upload, rename, delete, attach screenshots.
    #[default]
    Admin,
    /// Read only.
    Viewer,
}

impl Role {
    pub fn can_modify(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Fails for roles that may not run `action`.
    pub fn ensure_can_modify(self, action: &str) -> Result<()> {
        if !self.can_modify() {
            bail!("the viewer role cannot {action}; switch to the admin role to make changes");
        }
        Ok(())
    }
}

/// Settings file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub remote: RemoteConfig,
    /// URL template for requisition links; `{id}` is replaced.
    pub link_template: String,
    pub role: Role,
    pub empty_report_policy: EmptyResultPolicy,
    pub naming: ReportNaming,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            remote: RemoteConfig::default(),
            link_template: DEFAULT_LINK_TEMPLATE.to_string(),
            role: Role::default(),
            empty_report_policy: EmptyResultPolicy::default(),
            naming: ReportNaming::default(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration, returning it with the file it came from.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let Some(path) = resolve_config_path(explicit, env_path, Path::new(DEFAULT_CONFIG_FILE))
        else {
            tracing::debug!("no config file found, using defaults");
            return Ok((Self::default(), None));
        };
        let config = Self::from_file(&path)?;
        tracing::debug!(path = %path.display(), backend = ?config.backend, "loaded config");
        Ok((config, Some(path)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config file {}", path.display()))
    }

    /// Report builder settings derived from this config.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            empty_result: self.empty_report_policy,
            naming: self.naming,
            ..BuildOptions::default()
        }
    }
}

/// Picks the config file to read.
///
/// An explicit or environment path is returned even when missing, so the
/// caller reports it. The working-directory default is only used if it
/// exists.
fn resolve_config_path(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    cwd_default: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    cwd_default.is_file().then(|| cwd_default.to_path_buf())
}
