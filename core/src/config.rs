use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{HoundError, HoundResult};
use crate::render::HighlightMode;

pub const BASE_URI_ENV: &str = "HOUND_BASE_URI";

const CONFIG_DIR_NAME: &str = "hound_open";
const CONFIG_FILE_NAME: &str = "config.json";

/// Settings the query executor needs. Passed explicitly, never read globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoundConfig {
    pub base_uri: String,
    pub timeout: Option<Duration>,
    pub highlight: HighlightMode,
}

impl HoundConfig {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            timeout: None,
            highlight: HighlightMode::default(),
        }
    }

    /// Resolve settings from the flag value, the environment and the config
    /// file, in that order of precedence.
    pub fn resolve(base_uri_flag: Option<String>, config_path: Option<&Path>) -> HoundResult<Self> {
        let env_value = std::env::var(BASE_URI_ENV).ok();
        let default_path = default_config_path();
        let path = config_path.or(default_path.as_deref());
        Self::resolve_from(base_uri_flag, env_value, path)
    }

    pub(crate) fn resolve_from(
        base_uri_flag: Option<String>,
        env_value: Option<String>,
        config_path: Option<&Path>,
    ) -> HoundResult<Self> {
        let file = match config_path {
            Some(path) => ConfigFile::load(path)?,
            None => None,
        };
        let file = file.unwrap_or_default();

        let base_uri = non_empty(base_uri_flag)
            .or_else(|| non_empty(env_value))
            .or_else(|| non_empty(file.base_uri))
            .ok_or(HoundError::MissingBaseUri)?;

        validate_base_uri(&base_uri)?;

        Ok(Self {
            base_uri,
            timeout: file.timeout_secs.map(Duration::from_secs),
            highlight: file.highlight.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    base_uri: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    highlight: Option<HighlightMode>,
}

impl ConfigFile {
    /// A missing file is not an error; an unreadable or malformed one is.
    fn load(path: &Path) -> HoundResult<Option<Self>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(HoundError::ConfigIo {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let parsed = serde_json::from_str(&raw).map_err(|source| HoundError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(parsed))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let mut dir = dirs::config_dir()?;
    dir.push(CONFIG_DIR_NAME);
    dir.push(CONFIG_FILE_NAME);
    Some(dir)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_base_uri(uri: &str) -> HoundResult<()> {
    match reqwest::Url::parse(uri) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(HoundError::InvalidBaseUri {
            uri: uri.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(err) => Err(HoundError::InvalidBaseUri {
            uri: uri.to_string(),
            reason: err.to_string(),
        }),
    }
}
