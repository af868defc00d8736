use anyhow::Context;
use log::info;
use serde::Deserialize;
use std::{fs::File, path::Path, path::PathBuf, time::Duration};

/// Local startup configuration. Everything the device needs before it can
/// reach the network: credentials, endpoints and board wiring. Unlike the
/// remote document, this has to be valid or we don't start at all.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// URL of the remote JSON document (colors, weather, custom messages)
    pub data_location: String,
    pub openweather_token: String,
    #[serde(default = "default_weather_host")]
    pub weather_host: String,
    /// JSON time service used to correct the wall clock
    #[serde(default = "default_time_url")]
    pub time_url: String,
    #[serde(default = "default_framebuffer")]
    pub framebuffer: PathBuf,
    #[serde(default = "default_display_width")]
    pub display_width: u32,
    #[serde(default = "default_display_height")]
    pub display_height: u32,
    /// GPIO/BCM number of the "down" button
    #[serde(default = "default_button_down_pin")]
    pub button_down_pin: u64,
    /// GPIO/BCM number of the "up" button
    #[serde(default = "default_button_up_pin")]
    pub button_up_pin: u64,
    /// How long to hold each weather line before scrolling to the next
    #[serde(default)]
    pub weather_hold_secs: f64,
}

impl Config {
    const PATH: &'static str = "./config.json";

    /// Load config from the default path
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(Self::PATH))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        info!("Loading config from `{}`", path.display());
        let file = File::open(path).with_context(|| {
            format!("Error opening config file {}", path.display())
        })?;
        let config: Self = serde_json::from_reader(file).with_context(|| {
            format!("Error parsing config file {}", path.display())
        })?;
        // Check this now so a typo can't panic the loop later
        Duration::try_from_secs_f64(config.weather_hold_secs)
            .context("Invalid `weather_hold_secs`")?;
        Ok(config)
    }

    pub fn weather_hold(&self) -> Duration {
        Duration::try_from_secs_f64(self.weather_hold_secs).unwrap_or_default()
    }
}

fn default_weather_host() -> String {
    "http://api.openweathermap.org".into()
}

fn default_time_url() -> String {
    "http://worldtimeapi.org/api/ip".into()
}

fn default_framebuffer() -> PathBuf {
    "/dev/fb0".into()
}

fn default_display_width() -> u32 {
    64
}

fn default_display_height() -> u32 {
    32
}

fn default_button_down_pin() -> u64 {
    19 // GPIO/BCM 19, pin 35
}

fn default_button_up_pin() -> u64 {
    26 // GPIO/BCM 26, pin 37
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_defaults() {
        let file = write_config(
            r#"{"data_location": "http://example.com/data.json",
                "openweather_token": "abc"}"#,
        );
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.data_location, "http://example.com/data.json");
        assert_eq!(config.openweather_token, "abc");
        assert_eq!(config.display_width, 64);
        assert_eq!(config.display_height, 32);
        assert_eq!(config.framebuffer, PathBuf::from("/dev/fb0"));
        assert_eq!(config.weather_hold(), Duration::ZERO);
    }

    #[test]
    fn test_load_overrides() {
        let file = write_config(
            r#"{"data_location": "http://example.com/data.json",
                "openweather_token": "abc",
                "display_width": 128,
                "weather_hold_secs": 1.5}"#,
        );
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.display_width, 128);
        assert_eq!(config.weather_hold(), Duration::from_millis(1500));
    }

    #[test]
    fn test_load_errors() {
        // Missing credentials
        let file = write_config(r#"{"data_location": "http://example.com"}"#);
        assert!(Config::load_from(file.path()).is_err());

        let file = write_config("{ not json");
        assert!(Config::load_from(file.path()).is_err());

        let file = write_config(
            r#"{"data_location": "x", "openweather_token": "y",
                "weather_hold_secs": -1}"#,
        );
        assert!(Config::load_from(file.path()).is_err());

        assert!(Config::load_from(Path::new("/nonexistent/config.json"))
            .is_err());
    }
}
