use crate::session::types::SessionConfig;
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Runtime configuration, loaded from YAML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub session: SessionSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3500,
            session: SessionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Seconds a session may sit idle before expiring; 0 disables expiry
    pub idle_timeout_secs: i64,
    /// Seconds between expired-session sweeps; 0 disables the sweep task
    pub sweep_interval_secs: u64,
    /// IANA timezone name used when rendering timestamps
    pub display_timezone: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 300,
            sweep_interval_secs: 60,
            display_timezone: "America/Mexico_City".to_string(),
        }
    }
}

impl SessionSettings {
    /// Parsed display timezone, falling back to the default when invalid
    pub fn timezone(&self) -> Tz {
        match self.display_timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(e) => {
                warn!(
                    "Invalid display_timezone '{}' ({}), using America/Mexico_City",
                    self.display_timezone, e
                );
                chrono_tz::America::Mexico_City
            }
        }
    }

    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            idle_timeout_secs: self.idle_timeout_secs,
            sweep_interval_secs: self.sweep_interval_secs,
            display_timezone: self.timezone(),
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be non-zero".to_string());
        }

        self.session
            .display_timezone
            .parse::<Tz>()
            .map_err(|e| format!("invalid display_timezone: {}", e))?;

        if self.session.idle_timeout_secs < 0 {
            return Err("session.idle_timeout_secs must not be negative".to_string());
        }

        Ok(())
    }
}

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, String> {
    let path = path.as_ref();
    info!("Loading configuration from: {}", path.display());

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

    let config: AppConfig = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse YAML config: {}", e))?;

    config.validate()?;

    info!(
        "Configuration loaded: listening on {}, idle timeout {}s",
        config.bind_addr(),
        config.session.idle_timeout_secs
    );

    Ok(config)
}

/// Load configuration with fallback options, defaulting when nothing is
/// found; this service runs fine without a config file
pub fn load_config_with_fallback() -> AppConfig {
    if let Ok(config_path) = std::env::var("CONFIG_PATH") {
        match load_config(&config_path) {
            Ok(config) => return config,
            Err(e) => warn!(
                "Failed to load config from CONFIG_PATH ({}): {}",
                config_path, e
            ),
        }
    }

    for path in ["config.yaml", "config.yml"] {
        if Path::new(path).exists() {
            match load_config(path) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to load config from '{}': {}", path, e),
            }
        }
    }

    info!("No configuration file found, using defaults");
    AppConfig::default()
}
