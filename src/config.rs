//! Runtime configuration.
//!
//! Layers (later wins): defaults, YAML file, environment, CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{CliError, CliResult};

pub const DEFAULT_SERVICE: &str = "https://bsky.social";
pub const SERVICE_ENV: &str = "BLUESKY_SERVICE";
pub const SESSION_FILE_ENV: &str = "BSKY_SESSION_FILE";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub service: Url,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

/// Shape of `config.yaml`. All keys optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    service: Option<String>,
    session_file: Option<String>,
    timeout_secs: Option<u64>,
}

impl Config {
    pub fn defaults() -> CliResult<Self> {
        Ok(Self {
            service: parse_service(DEFAULT_SERVICE)?,
            session_file: default_session_file(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    fn apply_file(&mut self, file: FileConfig) -> CliResult<()> {
        if let Some(s) = file.service {
            self.service = parse_service(&s)?;
        }
        if let Some(p) = file.session_file {
            self.session_file = expand_home(&p);
        }
        if let Some(secs) = file.timeout_secs {
            if secs == 0 {
                return Err(CliError::Config("timeout_secs must be positive".into()));
            }
            self.timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}

/// Load configuration from the real environment.
pub fn load(config_path: Option<&Path>, service_flag: Option<&str>) -> CliResult<Config> {
    load_with(config_path, service_flag, |key| std::env::var(key).ok())
}

pub fn load_with(
    config_path: Option<&Path>,
    service_flag: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> CliResult<Config> {
    let mut config = Config::defaults()?;

    let file = match config_path {
        Some(p) => Some(read_file(p)?),
        None => default_config_file()
            .filter(|p| p.is_file())
            .map(|p| read_file(&p))
            .transpose()?,
    };
    if let Some(f) = file {
        config.apply_file(f)?;
    }

    let non_blank = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    if let Some(s) = non_blank(SERVICE_ENV) {
        config.service = parse_service(&s)?;
    }
    if let Some(p) = non_blank(SESSION_FILE_ENV) {
        config.session_file = expand_home(&p);
    }

    if let Some(s) = service_flag {
        config.service = parse_service(s)?;
    }

    Ok(config)
}

fn read_file(path: &Path) -> CliResult<FileConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&raw)
        .map_err(|e| CliError::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Parse a service URL; only http(s). The path always ends in `/` so XRPC
/// endpoints join beneath it.
pub fn parse_service(raw: &str) -> CliResult<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| CliError::Config(format!("invalid service URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CliError::Config(format!(
            "service URL must be http or https: '{raw}'"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_session_file() -> PathBuf {
    home().join(".cache").join("bsky").join("session.txt")
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bsky").join("config.yaml"))
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => home().join(rest),
        None => PathBuf::from(raw),
    }
}
