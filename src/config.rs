use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::integrations::insightly::DEFAULT_API_URL;
use crate::mail::sendmail::DEFAULT_SENDMAIL;

pub const CONFIG_FILE: &str = "landing-page.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub templates_path: PathBuf,
    pub free_domains_path: Option<PathBuf>,
    pub sendmail_path: PathBuf,
    /// CRM mail-in address copied on thank-you emails.
    pub dropbox: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            templates_path: PathBuf::from("templates.json"),
            free_domains_path: None,
            sendmail_path: PathBuf::from(DEFAULT_SENDMAIL),
            dropbox: None,
            request_timeout_secs: None,
            debug: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("No CRM API key configured (set api_key or LANDING_PAGE_API_KEY)")]
    MissingApiKey,
}

impl Config {
    /// `landing-page.json` in the working directory, falling back to the
    /// user config directory.
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .map(|dir| dir.join("landing-page").join("config.json"))
            .filter(|path| path.exists())
            .unwrap_or(local)
    }

    /// Reads the config file and applies environment overrides. Relative
    /// paths in the file are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.templates_path.is_relative() {
            self.templates_path = base.join(&self.templates_path);
        }
        if let Some(path) = &self.free_domains_path {
            if path.is_relative() {
                self.free_domains_path = Some(base.join(path));
            }
        }
    }

    // Keeps the key out of files that get copied around.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("LANDING_PAGE_API_KEY") {
            if !key.is_empty() {
                self.api_key = key;
            }
        }
        if let Some(debug) = var("LANDING_PAGE_DEBUG") {
            self.debug = matches!(debug.trim(), "1" | "true" | "yes" | "on");
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config: Config = serde_json::from_str(r#"{ "api_key": "k" }"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.sendmail_path, PathBuf::from(DEFAULT_SENDMAIL));
        assert!(!config.debug);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{ "api_key": "k", "templates_path": "forms.json", "free_domains_path": "/etc/free.txt", "request_timeout_secs": 30 }}"#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.templates_path, dir.path().join("forms.json"));
        assert_eq!(config.free_domains_path, Some(PathBuf::from("/etc/free.txt")));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|name| match name {
            "LANDING_PAGE_API_KEY" => Some("from-env".to_string()),
            "LANDING_PAGE_DEBUG" => Some("true".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key, "from-env");
        assert!(config.debug);

        // An empty key does not clobber the file's value
        config.apply_env(|name| match name {
            "LANDING_PAGE_API_KEY" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api_key, "from-env");
    }

    #[test]
    fn test_missing_api_key_rejected() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_unreadable_file() {
        let result = Config::load(Path::new("/nonexistent/landing-page.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
