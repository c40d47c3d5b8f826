use crate::error::{Result, YoncaError};
use crate::models::{RegionCode, SoilData, WeatherSnapshot};
use dialoguer::{Input, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Bounded wait applied to every outbound call and to the whole weather
/// resolution chain.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub weather: WeatherConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSourceKind {
    /// `GET /api/v1/weather/auto` on the advisory service.
    #[default]
    Service,
    /// Geolocation and weather providers queried directly by the client.
    Direct,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub source: WeatherSourceKind,
    pub auto_resolve: bool,
    pub ipapi_url: String,
    pub open_meteo_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            source: WeatherSourceKind::Service,
            auto_resolve: true,
            ipapi_url: "https://ipapi.co/json/".into(),
            open_meteo_url: "https://api.open-meteo.com/v1/forecast".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub region: RegionCode,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub soil_moisture: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let weather = WeatherSnapshot::default();
        Self {
            region: RegionCode::Aran,
            temperature: weather.temperature,
            humidity: weather.humidity,
            wind_speed: weather.wind_speed,
            soil_moisture: SoilData::default().soil_moisture,
        }
    }
}

impl DefaultsConfig {
    pub fn weather(&self) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            ..WeatherSnapshot::default()
        }
        .normalized()
    }

    pub fn soil(&self) -> SoilData {
        SoilData {
            soil_moisture: self.soil_moisture.clamp(0.0, 100.0),
            ..SoilData::default()
        }
    }
}

impl Config {
    /// Load from the first config file found, falling back to built-in
    /// defaults when none exists. Environment overrides apply either way.
    pub fn load(config_override: Option<&PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(YoncaError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                Some(p.clone())
            }
            None => Self::find_config_path().filter(|p| p.exists()),
        };

        let yaml = match &config_path {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| YoncaError::Config(format!("Failed to read config: {}", e)))?;
                Self::substitute_env_vars(&raw)
            }
            None => {
                tracing::info!("No config file found - using defaults");
                String::new()
            }
        };

        Self::from_yaml(&yaml)
    }

    /// Parse YAML text layered under `YONCA_<SECTION>__<KEY>` environment
    /// variables. `YONCA_API_URL` overrides the service base URL.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::File::from_str(yaml, ::config::FileFormat::Yaml))
            .add_source(
                ::config::Environment::with_prefix("YONCA")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Ok(url) = std::env::var("YONCA_API_URL") {
            builder = builder.set_override("api.base_url", url)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(YoncaError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        Ok(())
    }

    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("yonca").join("config.yaml"))
    }

    /// Default path for writing new config files (~/.config/yonca/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| YoncaError::Config("Cannot determine config directory".into()))?
            .join("yonca");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up Yonca!");
        println!();

        println!("Advisory service");
        let base_url: String = Input::new()
            .with_prompt("  Base URL")
            .default(ApiConfig::default().base_url)
            .interact_text()
            .map_err(|e| YoncaError::Config(format!("Input error: {}", e)))?;

        let timeout_secs: u64 = Input::new()
            .with_prompt("  Request timeout (seconds)")
            .default(DEFAULT_TIMEOUT_SECS)
            .interact_text()
            .map_err(|e| YoncaError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Weather");
        let sources = [
            "service - ask the advisory service (/api/v1/weather/auto)",
            "direct - query ipapi.co and Open-Meteo from this machine",
        ];
        let source_idx = Select::new()
            .with_prompt("  Auto-weather source")
            .items(&sources)
            .default(0)
            .interact()
            .map_err(|e| YoncaError::Config(format!("Input error: {}", e)))?;
        let source = if source_idx == 1 {
            WeatherSourceKind::Direct
        } else {
            WeatherSourceKind::Service
        };

        let auto_resolve = dialoguer::Confirm::new()
            .with_prompt("  Detect location automatically on the weather step?")
            .default(true)
            .interact()
            .map_err(|e| YoncaError::Config(format!("Input error: {}", e)))?;

        let region_names: Vec<&str> = RegionCode::all().iter().map(|r| r.name_az()).collect();
        let region_idx = Select::new()
            .with_prompt("  Default region")
            .items(&region_names)
            .default(0)
            .interact()
            .map_err(|e| YoncaError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            api: ApiConfig {
                base_url,
                timeout_secs,
            },
            weather: WeatherConfig {
                source,
                auto_resolve,
                ..WeatherConfig::default()
            },
            defaults: DefaultsConfig {
                region: RegionCode::all()[region_idx],
                ..DefaultsConfig::default()
            },
        };
        config.validate()?;

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| YoncaError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# Yonca Configuration\n# Generated by `yonca init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("YONCA_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| YoncaError::Config("Cannot determine data directory".into()))?
            .join("yonca");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("yonca.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.weather.source, WeatherSourceKind::Service);
        assert!(config.weather.auto_resolve);
        assert_eq!(config.defaults.region, RegionCode::Aran);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "weather:\n  source: direct\ndefaults:\n  region: lankaran\n  temperature: 80\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.weather.source, WeatherSourceKind::Direct);
        assert!(config.weather.ipapi_url.contains("ipapi.co"));
        assert_eq!(config.defaults.region, RegionCode::Lankaran);
        // Out-of-range default is clamped when turned into a snapshot
        assert_eq!(config.defaults.weather().temperature, 50.0);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let yaml = "api:\n  base_url: ftp://example.org\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(YoncaError::Config(_))
        ));
    }

    #[test]
    fn substitutes_known_env_vars_only() {
        std::env::set_var("YONCA_TEST_SUBST_HOST", "advisor.example.az");
        let out = Config::substitute_env_vars(
            "base_url: https://${YONCA_TEST_SUBST_HOST}/x ${YONCA_TEST_UNSET_VAR}",
        );
        assert_eq!(
            out,
            "base_url: https://advisor.example.az/x ${YONCA_TEST_UNSET_VAR}"
        );
    }

    #[test]
    fn zero_timeout_is_bumped_to_one_second() {
        let api = ApiConfig {
            timeout_secs: 0,
            ..ApiConfig::default()
        };
        assert_eq!(api.timeout(), Duration::from_secs(1));
    }
}
