use crate::error::{Result, SkycastError};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    pub location: LocationConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_units")]
    pub units: String,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("units", &self.units)
            .finish()
    }
}

/// The location shown on the dashboard until the user searches for another one.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "London".into(),
            state: None,
            country: "GB".into(),
            latitude: 51.5085,
            longitude: -0.1257,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_max_bytes")]
    pub cache_max_bytes: u64,
    #[serde(default = "default_online_max_age_secs")]
    pub online_max_age_secs: u64,
    #[serde(default = "default_offline_max_stale_secs")]
    pub offline_max_stale_secs: u64,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_cache_max_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_online_max_age_secs() -> u64 {
    60
}

fn default_offline_max_stale_secs() -> u64 {
    60 * 60 * 24
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            cache_max_bytes: default_cache_max_bytes(),
            online_max_age_secs: default_online_max_age_secs(),
            offline_max_stale_secs: default_offline_max_stale_secs(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(SkycastError::Config(format!(
                "Config file not found at {:?}. Run `skycast init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| SkycastError::Config(format!("Failed to read config: {}", e)))?;

        // Substitute environment variables
        let config_str = Self::substitute_env_vars(&config_str);

        let config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| SkycastError::Config(format!("Failed to parse config: {}", e)))?;

        if config.api.key.is_empty() {
            return Err(SkycastError::Config(
                "OpenWeatherMap API key is empty. Run `skycast init` to set one.".into(),
            ));
        }

        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("skycast").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        // Return XDG path as the default (will trigger "not found" in load)
        let default_path = dirs::config_dir()
            .ok_or_else(|| SkycastError::Config("Cannot determine config directory".into()))?
            .join("skycast")
            .join("config.yaml");
        Ok(default_path)
    }

    /// Default path for writing new config files (~/.config/skycast/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SkycastError::Config("Cannot determine config directory".into()))?
            .join("skycast");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up skycast!");
        println!();

        println!("OpenWeatherMap");
        let api_key: String = Password::new()
            .with_prompt("  API key")
            .interact()
            .map_err(|e| SkycastError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Default location");
        let name: String = Input::new()
            .with_prompt("  City name")
            .default("London".into())
            .interact_text()
            .map_err(|e| SkycastError::Config(format!("Input error: {}", e)))?;

        let state: String = Input::new()
            .with_prompt("  State (leave blank outside the US)")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| SkycastError::Config(format!("Input error: {}", e)))?;

        let country: String = Input::new()
            .with_prompt("  Country code")
            .default("GB".into())
            .interact_text()
            .map_err(|e| SkycastError::Config(format!("Input error: {}", e)))?;

        let latitude: f64 = Input::new()
            .with_prompt("  Latitude")
            .default(51.5085)
            .interact_text()
            .map_err(|e| SkycastError::Config(format!("Input error: {}", e)))?;

        let longitude: f64 = Input::new()
            .with_prompt("  Longitude")
            .default(-0.1257)
            .interact_text()
            .map_err(|e| SkycastError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            api: ApiConfig {
                key: api_key,
                base_url: default_base_url(),
                units: default_units(),
            },
            location: LocationConfig {
                name,
                state: if state.is_empty() { None } else { Some(state) },
                country,
                latitude,
                longitude,
            },
            http: HttpConfig::default(),
        };

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| SkycastError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# skycast configuration\n# Generated by `skycast init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("SKYCAST_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| SkycastError::Config("Cannot determine data directory".into()))?
            .join("skycast");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("skycast.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let yaml = r#"
api:
  key: abc123
location:
  name: London
  state: null
  country: GB
  latitude: 51.5085
  longitude: -0.1257
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://api.openweathermap.org");
        assert_eq!(config.api.units, "metric");
        assert_eq!(config.http.timeout_secs, 20);
        assert_eq!(config.http.cache_max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.http.online_max_age_secs, 60);
        assert_eq!(config.http.offline_max_stale_secs, 86_400);
    }

    #[test]
    fn substitutes_env_vars() {
        std::env::set_var("SKYCAST_TEST_API_KEY", "from-env");
        let substituted = Config::substitute_env_vars("key: ${SKYCAST_TEST_API_KEY}");
        assert_eq!(substituted, "key: from-env");
    }

    #[test]
    fn debug_redacts_api_key() {
        let api = ApiConfig {
            key: "secret".into(),
            base_url: default_base_url(),
            units: default_units(),
        };
        let debug = format!("{:?}", api);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
