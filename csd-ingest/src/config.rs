use serde::Deserialize;
use std::{fmt, fs, io::ErrorKind};

pub const CONFIG_PATH_ENV: &str = "AENERGY_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "settings.toml";
pub const API_KEY_ENV: &str = "AENERGY_API_KEY";
pub const DB_URL_ENV: &str = "AENERGY_DB_URL";
pub const DEFAULT_API_BASE_URL: &str = "https://api.aeso.ca";

/// `[settings]` table of the optional settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsSection {
    pub apikey: Option<String>,
    #[serde(rename = "DATABASE_URL")]
    pub database_url: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub database_url: String,
    pub api_base_url: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "<empty>" } else { "<redacted>" };
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("database_url", &redact(&self.database_url))
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl AppConfig {
    /// Read the settings file (if any) and fill gaps from the environment.
    ///
    /// Values are not validated. A missing file is fine; a file that cannot be
    /// read or parsed is an error.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let settings = match fs::read_to_string(&path) {
            Ok(contents) => parse_settings(&contents)
                .map_err(|e| anyhow::anyhow!("invalid settings file '{path}': {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(%path, "no settings file, using environment");
                SettingsSection::default()
            }
            Err(e) => return Err(anyhow::anyhow!("failed to read settings file '{path}': {e}")),
        };

        Ok(Self::resolve(settings, |key| env::var(key).ok()))
    }

    /// File value first, then the environment, then an empty string.
    pub fn resolve<F>(settings: SettingsSection, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: settings
                .apikey
                .or_else(|| env(API_KEY_ENV))
                .unwrap_or_default(),
            database_url: settings
                .database_url
                .or_else(|| env(DB_URL_ENV))
                .unwrap_or_default(),
            api_base_url: settings
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        }
    }
}

pub fn parse_settings(contents: &str) -> Result<SettingsSection, toml::de::Error> {
    let file: SettingsFile = toml::from_str(contents)?;
    Ok(file.settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn file_values_win_over_environment() {
        let settings = parse_settings(
            r#"
            [settings]
            apikey = "from-file"
            DATABASE_URL = "postgres://file/db"
            "#,
        )
        .unwrap();

        let cfg = AppConfig::resolve(
            settings,
            env_of(&[(API_KEY_ENV, "from-env"), (DB_URL_ENV, "postgres://env/db")]),
        );
        assert_eq!(cfg.api_key, "from-file");
        assert_eq!(cfg.database_url, "postgres://file/db");
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn environment_fills_missing_entries() {
        let settings = parse_settings("[settings]\napikey = \"from-file\"\n").unwrap();
        let cfg = AppConfig::resolve(settings, env_of(&[(DB_URL_ENV, "postgres://env/db")]));
        assert_eq!(cfg.api_key, "from-file");
        assert_eq!(cfg.database_url, "postgres://env/db");
    }

    #[test]
    fn nothing_configured_yields_empty_values() {
        let cfg = AppConfig::resolve(SettingsSection::default(), env_of(&[]));
        assert_eq!(cfg.api_key, "");
        assert_eq!(cfg.database_url, "");
    }

    #[test]
    fn file_without_settings_table_is_accepted() {
        let settings = parse_settings("[other]\nkey = 1\n").unwrap();
        assert!(settings.apikey.is_none());
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse_settings("[settings\napikey = ").is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = AppConfig {
            api_key: "secret-key".to_string(),
            database_url: "postgres://u:pw@h/db".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        };
        let out = format!("{cfg:?}");
        assert!(!out.contains("secret-key"));
        assert!(!out.contains("pw"));
        assert!(out.contains("<redacted>"));
    }
}
