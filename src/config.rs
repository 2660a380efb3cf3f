use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::app_error::{AppError, AppResult};
use crate::jira::Timeouts;
use crate::models::FilterPolicy;

pub const CONFIG_PATH_ENV: &str = "JIRA_FILTER_IMPORTER_CONFIG";
pub const BASE_URL_ENV: &str = "JIRA_BASE_URL";
pub const EMAIL_ENV: &str = "JIRA_API_EMAIL";
pub const CSV_PATH_ENV: &str = "JIRA_FILTERS_CSV";
pub const DELIMITER_ENV: &str = "JIRA_CSV_DELIMITER";
pub const TIMEOUT_ENV: &str = "JIRA_TIMEOUT_SECS";

const DEFAULT_CSV_PATH: &str = "jira_filters.csv";
const DEFAULT_DELIMITER: char = ';';
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub csv_path: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub policy: FilterPolicy,
}

/// Values supplied on the command line; they win over every other layer.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub csv_path: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub csv_path: PathBuf,
    pub delimiter: u8,
    pub timeouts: Timeouts,
    pub policy: FilterPolicy,
}

impl Config {
    /// Resolves defaults, then the config file, then `env`, then `overrides`.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
        overrides: Overrides,
    ) -> AppResult<Self> {
        let base_url = overrides
            .base_url
            .or_else(|| env(BASE_URL_ENV))
            .or(file.base_url)
            .and_then(non_empty);
        let email = overrides
            .email
            .or_else(|| env(EMAIL_ENV))
            .or(file.email)
            .and_then(non_empty);
        let csv_path = overrides
            .csv_path
            .or_else(|| env(CSV_PATH_ENV).map(PathBuf::from))
            .or(file.csv_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH));
        let delimiter = match overrides
            .delimiter
            .or_else(|| env(DELIMITER_ENV))
            .or(file.delimiter)
        {
            Some(raw) => parse_delimiter(&raw)?,
            None => DEFAULT_DELIMITER as u8,
        };
        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => match env(TIMEOUT_ENV) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    AppError::Config(format!(
                        "{TIMEOUT_ENV} must be a number of seconds, got '{raw}'"
                    ))
                })?,
                None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
        };
        let connect_timeout_secs = file
            .connect_timeout_secs
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        if timeout_secs == 0 || connect_timeout_secs == 0 {
            return Err(AppError::Config("timeouts must be greater than zero".to_string()));
        }
        if file.policy.share_permissions.iter().any(|p| p.kind.trim().is_empty()) {
            return Err(AppError::Config("share permission type must not be empty".to_string()));
        }

        Ok(Self {
            base_url,
            email,
            csv_path,
            delimiter,
            timeouts: Timeouts {
                connect: Duration::from_secs(connect_timeout_secs),
                request: Duration::from_secs(timeout_secs),
            },
            policy: file.policy,
        })
    }

    pub fn require_base_url(&self) -> AppResult<&str> {
        self.base_url.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "Jira base URL is not configured (set {BASE_URL_ENV} or base_url)"
            ))
        })
    }

    pub fn require_email(&self) -> AppResult<&str> {
        self.email.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "Jira account email is not configured (set {EMAIL_ENV} or email)"
            ))
        })
    }
}

/// Reads `explicit`, else the path in `JIRA_FILTER_IMPORTER_CONFIG`, else the
/// platform config file when present.
pub fn load_file_config(explicit: Option<&Path>) -> AppResult<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(FileConfig::default()),
            },
        },
    };

    let raw = fs::read_to_string(&path).map_err(|e| {
        AppError::Config(format!("cannot read config file '{}': {e}", path.display()))
    })?;
    log::debug!("loaded config file {}", path.display());
    parse_file_config(&raw)
}

pub fn parse_file_config(raw: &str) -> AppResult<FileConfig> {
    Ok(toml::from_str(raw)?)
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "jira-tools", "jira-filter-importer")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn parse_delimiter(raw: &str) -> AppResult<u8> {
    let value = if raw == "\\t" { "\t" } else { raw };
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(AppError::Config(format!(
            "delimiter must be a single ASCII character, got '{raw}'"
        ))),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::SharePermission;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_any_layer() {
        let config = Config::resolve(FileConfig::default(), env_from(&[]), Overrides::default())
            .expect("defaults are valid");

        assert_eq!(config.csv_path, PathBuf::from("jira_filters.csv"));
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.timeouts.request, Duration::from_secs(30));
        assert_eq!(config.policy, FilterPolicy::default());
        assert!(config.require_base_url().is_err());
    }

    #[test]
    fn later_layers_win() {
        let file = parse_file_config(
            r#"
            base_url = "https://file.atlassian.net"
            email = "file@example.com"
            delimiter = ","
            timeout_secs = 5
            "#,
        )
        .expect("valid toml");
        let env = env_from(&[(BASE_URL_ENV, "https://env.atlassian.net"), (TIMEOUT_ENV, "12")]);
        let overrides = Overrides {
            delimiter: Some("|".to_string()),
            ..Overrides::default()
        };

        let config = Config::resolve(file, env, overrides).expect("valid layers");
        assert_eq!(config.require_base_url().unwrap(), "https://env.atlassian.net");
        assert_eq!(config.require_email().unwrap(), "file@example.com");
        assert_eq!(config.delimiter, b'|');
        assert_eq!(config.timeouts.request, Duration::from_secs(12));
    }

    #[test]
    fn policy_can_be_overridden_in_file() {
        let file = parse_file_config(
            r#"
            [policy]
            description = "imported"
            favourite = true
            share_permissions = [{ type = "loggedin" }]
            "#,
        )
        .expect("valid toml");
        let config = Config::resolve(file, env_from(&[]), Overrides::default()).expect("valid");

        assert_eq!(config.policy.description, "imported");
        assert!(config.policy.favourite);
        assert_eq!(
            config.policy.share_permissions,
            vec![SharePermission {
                kind: "loggedin".to_string()
            }]
        );
    }

    #[test]
    fn demo_config_parses() {
        let file = parse_file_config(include_str!("../demos/config.toml")).expect("demo config");
        let config = Config::resolve(file, env_from(&[]), Overrides::default()).expect("valid");
        assert_eq!(config.policy, FilterPolicy::default());
        assert_eq!(config.csv_path, PathBuf::from("demos/jira_filters.csv"));
    }

    #[test]
    fn token_in_config_file_is_rejected() {
        let err = parse_file_config("api_token = \"secret\"").expect_err("token not allowed");
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn delimiter_must_be_single_ascii_char() {
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Overrides::default()
        };
        let err = Config::resolve(FileConfig::default(), env_from(&[]), overrides)
            .expect_err("zero timeout");
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let env = env_from(&[(EMAIL_ENV, "   ")]);
        let config = Config::resolve(FileConfig::default(), env, Overrides::default()).unwrap();
        assert!(config.require_email().is_err());
    }
}
