//! Connection configuration
//!
//! Settings resolve in priority order:
//! 1. command-line flags and `VIKUNJA_BASE_URL` / `VIKUNJA_API_TOKEN`
//! 2. a `.env` file (`KEY=value`, default `./.env`)
//! 3. `~/.config/mt-vikunja/config.toml` (global)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::remote::HttpSettings;

pub const BASE_URL_VAR: &str = "VIKUNJA_BASE_URL";
pub const TOKEN_VAR: &str = "VIKUNJA_API_TOKEN";

const API_SUFFIX: &str = "/api/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base URL and token are required (use --base-url/--token or env/.env)")]
    MissingConnection,

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Vikunja server root
    pub base_url: Option<String>,

    /// API token
    pub token: Option<String>,

    /// Verify TLS certificates (default true)
    pub verify_ssl: Option<bool>,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

impl GlobalConfig {
    /// Returns the global config directory
    pub fn dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "mt-vikunja", "mt-vikunja")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads the global configuration; a missing file yields defaults
    pub fn load() -> Result<Self> {
        let config_dir = match Self::dir() {
            Some(dir) => dir,
            None => return Ok(Self::default()),
        };

        Self::load_from(&config_dir.join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read global config: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }
}

/// Parses `KEY=value` lines; blank lines and `#` comments are skipped,
/// surrounding quotes are stripped from values
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Reads a `.env` file; a missing file yields no values
pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read env file: {}", path.display()))?;
    Ok(parse_env_file(&content))
}

/// Strips trailing slashes and an `/api/v1` suffix
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    url.strip_suffix(API_SUFFIX).unwrap_or(url).to_string()
}

/// Connection values given on the command line (or their env vars)
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub env_file: Option<PathBuf>,
    pub insecure: bool,
}

/// Resolved connection to a Vikunja server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub base_url: String,
    pub token: String,
    pub verify_ssl: bool,
    pub timeout: Option<Duration>,
}

impl Connection {
    /// Resolves a connection from flags, the env file and the global config
    pub fn load(args: &ConnectionArgs) -> Result<Self> {
        let env_values = match &args.env_file {
            Some(path) => load_env_file(path)?,
            None => HashMap::new(),
        };
        let global = GlobalConfig::load()?;

        Ok(Self::resolve(args, &env_values, &global)?)
    }

    /// Pure resolution step of [`Connection::load`]
    pub fn resolve(
        args: &ConnectionArgs,
        env_values: &HashMap<String, String>,
        global: &GlobalConfig,
    ) -> Result<Self, ConfigError> {
        let pick = |flag: &Option<String>, key: &str, global: &Option<String>| {
            [
                flag.as_deref(),
                env_values.get(key).map(String::as_str),
                global.as_deref(),
            ]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
        };

        let base_url = pick(&args.base_url, BASE_URL_VAR, &global.base_url);
        let token = pick(&args.token, TOKEN_VAR, &global.token);
        let (Some(base_url), Some(token)) = (base_url, token) else {
            return Err(ConfigError::MissingConnection);
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url),
            token,
            verify_ssl: !args.insecure && global.verify_ssl.unwrap_or(true),
            timeout: global.timeout_seconds.map(Duration::from_secs),
        })
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            verify_ssl: self.verify_ssl,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn base_url_normalization() {
        assert_eq!(normalize_base_url("https://v.example.com/"), "https://v.example.com");
        assert_eq!(normalize_base_url("https://v.example.com/api/v1"), "https://v.example.com");
        assert_eq!(normalize_base_url("https://v.example.com/api/v1/"), "https://v.example.com");
        assert_eq!(normalize_base_url("https://v.example.com/sub"), "https://v.example.com/sub");
    }

    #[test]
    fn env_file_parsing() {
        let values = parse_env_file(
            "# comment\n\nVIKUNJA_API_TOKEN=\"abc\"\nVIKUNJA_BASE_URL = 'https://x'\nnot a pair\n",
        );

        assert_eq!(values.get(TOKEN_VAR).map(String::as_str), Some("abc"));
        assert_eq!(values.get(BASE_URL_VAR).map(String::as_str), Some("https://x"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn flags_win_over_env_file_and_global() {
        let args = ConnectionArgs {
            base_url: Some("https://flag/api/v1".to_string()),
            token: None,
            ..Default::default()
        };
        let env_values = parse_env_file("VIKUNJA_API_TOKEN=from-env\nVIKUNJA_BASE_URL=https://env");
        let global = GlobalConfig {
            base_url: Some("https://global".to_string()),
            token: Some("from-global".to_string()),
            ..Default::default()
        };

        let conn = Connection::resolve(&args, &env_values, &global).unwrap();
        assert_eq!(conn.base_url, "https://flag");
        assert_eq!(conn.token, "from-env");
        assert!(conn.verify_ssl);
    }

    #[test]
    fn global_config_fills_gaps() {
        let global: GlobalConfig = toml::from_str(
            r#"
base_url = "https://global"
token = "t"
verify_ssl = false
timeout_seconds = 30
"#,
        )
        .unwrap();

        let conn = Connection::resolve(&ConnectionArgs::default(), &HashMap::new(), &global).unwrap();
        assert_eq!(conn.base_url, "https://global");
        assert!(!conn.verify_ssl);
        assert_eq!(conn.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn insecure_flag_disables_verification() {
        let args = ConnectionArgs {
            base_url: Some("https://x".to_string()),
            token: Some("t".to_string()),
            insecure: true,
            ..Default::default()
        };

        let conn = Connection::resolve(&args, &HashMap::new(), &GlobalConfig::default()).unwrap();
        assert!(!conn.verify_ssl);
    }

    #[test]
    fn missing_token_is_an_error() {
        let args = ConnectionArgs {
            base_url: Some("https://x".to_string()),
            token: Some("  ".to_string()),
            ..Default::default()
        };

        let err = Connection::resolve(&args, &HashMap::new(), &GlobalConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingConnection));
    }

    #[test]
    fn missing_files_yield_defaults() {
        let dir = TempDir::new().unwrap();

        assert!(load_env_file(&dir.path().join(".env")).unwrap().is_empty());
        let global = GlobalConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(global.base_url.is_none());
    }

    #[test]
    fn invalid_global_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [").unwrap();

        assert!(GlobalConfig::load_from(&path).is_err());
    }
}
