use crate::error::Error;
use ini::Ini;
use log::LevelFilter;
use std::path::Path;

/// Environment variable that overrides the `enabled` key
pub const ENV_ENABLED: &str = "PERF_MONITOR_ENABLED";
const SECTION: &str = "Monitor";

/// Config parameters, direct representation of the `[Monitor]` section of config.ini
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub log_level: LevelFilter,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: LevelFilter::Info,
        }
    }
}

impl MonitorConfig {
    /// Overrides `enabled` from [`ENV_ENABLED`] when it is set
    pub fn apply_env(self) -> Result<Self, Error> {
        self.apply_override(std::env::var(ENV_ENABLED).ok().as_deref())
    }

    fn apply_override(mut self, raw: Option<&str>) -> Result<Self, Error> {
        if let Some(raw) = raw {
            self.enabled = parse_bool(ENV_ENABLED, raw)?;
        }
        Ok(self)
    }
}

pub fn from_file(filename: impl AsRef<Path>) -> Result<MonitorConfig, Error> {
    let ini_str = std::fs::read_to_string(filename)?;
    from_str(&ini_str)
}

/// Missing file gives the defaults, any other failure is returned
pub fn load_or_default(filename: impl AsRef<Path>) -> Result<MonitorConfig, Error> {
    match std::fs::read_to_string(filename.as_ref()) {
        Ok(ini_str) => from_str(&ini_str),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!(
                "config file {:?} not found, using defaults",
                filename.as_ref()
            );
            Ok(MonitorConfig::default())
        }
        Err(e) => Err(Error::IoError(e)),
    }
}

pub fn from_str(ini_str: &str) -> Result<MonitorConfig, Error> {
    let ini = Ini::load_from_str(ini_str)?;
    let mut config = MonitorConfig::default();
    let Some(section) = ini.section(Some(SECTION)) else {
        return Ok(config);
    };
    if let Some(raw) = section.get("enabled") {
        config.enabled = parse_bool("enabled", raw)?;
    }
    if let Some(raw) = section.get("log_level") {
        config.log_level = raw
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| invalid("log_level", raw))?;
    }
    Ok(config)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, Error> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
