//! The remote document is the operator's control panel: clock colors, weather
//! location and custom messages that preempt the normal display. It's
//! re-fetched on every tick, and decoded one field at a time so a broken
//! section only ever costs us that section.

use crate::{platform::Platform, util::Color};
use log::{error, warn};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use std::{fmt, time::Duration};
use thiserror::Error;

/// Typed view of the remote document. Any field that's missing or malformed
/// holds its default instead.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteConfig {
    pub clock_am_color: Color,
    pub clock_pm_color: Color,
    pub weather_unit: WeatherUnit,
    pub weather_location: String,
    /// Display order. Entries are decoded individually, so a bad entry is
    /// kept (as an error) in its slot rather than dropped
    pub custom_messages: Vec<MessageEntry>,
}

impl RemoteConfig {
    pub const DEFAULT_AM_COLOR: Color = Color::from_u32(0xaaaa00);
    pub const DEFAULT_PM_COLOR: Color = Color::from_u32(0x00aaaa);
    pub const DEFAULT_LOCATION: &'static str = "New York, US";

    /// Is there anything to preempt the normal mode with?
    pub fn has_override(&self) -> bool {
        !self.custom_messages.is_empty()
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            clock_am_color: Self::DEFAULT_AM_COLOR,
            clock_pm_color: Self::DEFAULT_PM_COLOR,
            weather_unit: WeatherUnit::default(),
            weather_location: Self::DEFAULT_LOCATION.into(),
            custom_messages: Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherUnit {
    #[default]
    Metric,
    Imperial,
}

impl WeatherUnit {
    /// Value of the `units` query param in weather requests
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

impl fmt::Display for WeatherUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Outcome of decoding one entry of `custom_messages`
pub type MessageEntry = Result<MessageSpec, InvalidMessage>;

#[derive(Clone, Debug, PartialEq, Error)]
#[error("Invalid custom message #{index}: {reason}")]
pub struct InvalidMessage {
    pub index: usize,
    pub reason: String,
}

/// One element of the custom message screen
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageSpec {
    Label(Label),
    ScrollingLabel(ScrollingLabel),
    #[serde(rename = "bmp")]
    Bitmap(Bitmap),
    /// A `type` we don't know how to show. It still counts as a message,
    /// but draws nothing.
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Label {
    pub text: String,
    /// Centered horizontally if absent
    #[serde(default)]
    pub x: Option<i32>,
    pub y: i32,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ScrollingLabel {
    pub text: String,
    #[serde(default = "ScrollingLabel::default_x")]
    pub x: i32,
    pub y: i32,
    pub color: Color,
    /// Time between animation steps
    #[serde(
        default = "ScrollingLabel::default_animate_time",
        deserialize_with = "seconds"
    )]
    pub animate_time: Duration,
}

impl ScrollingLabel {
    /// Number of characters visible at once
    pub const MAX_CHARACTERS: usize = 10;

    fn default_x() -> i32 {
        3
    }

    fn default_animate_time() -> Duration {
        Duration::from_millis(300)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Bitmap {
    /// Path to a BMP file on the device. The document calls this `text`
    #[serde(rename = "text")]
    pub path: String,
    pub x: i32,
    pub y: i32,
}

/// Fetch and decode the remote document. This never fails: if the document
/// can't be fetched at all we log it and fall back to all defaults.
pub fn load(platform: &mut impl Platform, url: &str) -> RemoteConfig {
    match platform.fetch_json(url, &[]) {
        Ok(document) => decode(&document),
        Err(err) => {
            error!("Error loading remote config, using defaults: {err}");
            RemoteConfig::default()
        }
    }
}

/// Decode the remote document. Each field is independent; a bad field is
/// logged and replaced with its default.
pub fn decode(document: &Value) -> RemoteConfig {
    let defaults = RemoteConfig::default();
    if !document.is_object() {
        error!("Remote config is not a JSON object, using defaults");
        return defaults;
    }

    RemoteConfig {
        clock_am_color: field(document, "clock", "am_color")
            .unwrap_or(defaults.clock_am_color),
        clock_pm_color: field(document, "clock", "pm_color")
            .unwrap_or(defaults.clock_pm_color),
        weather_unit: field(document, "weather", "unit")
            .unwrap_or(defaults.weather_unit),
        weather_location: field(document, "weather", "location")
            .unwrap_or(defaults.weather_location),
        custom_messages: custom_messages(document),
    }
}

/// Pull `document[section][key]` out as a `T`. Returns `None` (after logging)
/// if it's missing or the wrong shape.
fn field<T: DeserializeOwned>(
    document: &Value,
    section: &str,
    key: &str,
) -> Option<T> {
    let Some(value) = document.get(section).and_then(|s| s.get(key)) else {
        warn!("Remote config is missing `{section}.{key}`, using default");
        return None;
    };
    match T::deserialize(value) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Invalid `{section}.{key}` in remote config: {err}");
            None
        }
    }
}

fn custom_messages(document: &Value) -> Vec<MessageEntry> {
    match document.get("custom_messages") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(messages)) => messages
            .iter()
            .enumerate()
            .map(|(index, message)| {
                let spec = MessageSpec::deserialize(message).map_err(|err| {
                    InvalidMessage {
                        index,
                        reason: err.to_string(),
                    }
                })?;
                if spec == MessageSpec::Unsupported {
                    warn!(
                        "Skipping custom message #{index} with unsupported \
                        type {}",
                        message.get("type").unwrap_or(&Value::Null)
                    );
                }
                Ok(spec)
            })
            .collect(),
        Some(other) => {
            warn!("`custom_messages` should be an array, got {other}");
            Vec::new()
        }
    }
}

/// Deserialize a (possibly fractional) number of seconds
fn seconds<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
