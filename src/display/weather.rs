use crate::{error::FetchError, remote_config::WeatherUnit};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Weather screen state: the latest observation, plus which of the rotating
/// detail lines is currently showing
#[derive(Debug, Default)]
pub struct WeatherGraphics {
    unit: WeatherUnit,
    current: Option<CurrentWeather>,
    line: usize,
}

impl WeatherGraphics {
    pub fn set_units(&mut self, unit: WeatherUnit) {
        self.unit = unit;
    }

    /// Replace the current observation with a new payload. On failure the
    /// previous observation (if any) stays on screen.
    pub fn display_weather(
        &mut self,
        payload: &Value,
    ) -> Result<(), FetchError> {
        let current = CurrentWeather::deserialize(payload)
            .map_err(|err| FetchError::decode("weather payload", err))?;
        self.current = Some(current);
        self.line = 0;
        Ok(())
    }

    pub fn scroll_next_label(&mut self) {
        if let Some(current) = &self.current {
            self.line = (self.line + 1) % current.lines(self.unit).len();
        }
    }

    /// Formatted temperature, e.g. `21°C`
    pub fn temperature(&self) -> Option<String> {
        self.current.as_ref().map(|current| {
            let suffix = match self.unit {
                WeatherUnit::Metric => "C",
                WeatherUnit::Imperial => "F",
            };
            format!("{:.0}°{suffix}", current.main.temp)
        })
    }

    /// The detail line that's currently showing
    pub fn current_line(&self) -> Option<String> {
        let lines = self.current.as_ref()?.lines(self.unit);
        lines.into_iter().nth(self.line)
    }
}

/// Transition between two detail lines: the old one slides out to the left
/// while the new one follows it in from the right
#[derive(Clone, Debug, PartialEq)]
pub struct LineScroll {
    from: String,
    to: String,
    /// Pixels moved so far
    offset: u32,
    width: u32,
    /// `None` until the first step is requested
    last_step: Option<Instant>,
}

impl LineScroll {
    pub const STEP: Duration = Duration::from_millis(30);
    pub const STEP_PIXELS: u32 = 2;

    pub fn new(from: String, to: String, width: u32) -> Self {
        Self {
            from,
            to,
            offset: 0,
            width,
            last_step: None,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn offset(&self) -> i32 {
        self.offset as i32
    }

    pub fn is_done(&self) -> bool {
        self.offset >= self.width
    }

    /// Move one step if it's due. The first call only starts the clock.
    /// Return whether anything moved.
    pub fn update(&mut self, now: Instant) -> bool {
        let Some(last_step) = self.last_step else {
            self.last_step = Some(now);
            return false;
        };
        let elapsed = now.saturating_duration_since(last_step);
        if self.is_done() || elapsed < Self::STEP {
            return false;
        }
        self.offset = (self.offset + Self::STEP_PIXELS).min(self.width);
        self.last_step = Some(now);
        true
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.last_step
            .map(|last_step| {
                (last_step + Self::STEP).saturating_duration_since(now)
            })
            .unwrap_or_default()
    }
}

/// https://openweathermap.org/current#current_JSON
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CurrentWeather {
    name: String,
    main: Readings,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Option<Wind>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Readings {
    temp: f64,
    #[serde(default)]
    humidity: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Condition {
    description: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Wind {
    speed: f64,
}

impl CurrentWeather {
    /// Detail lines to rotate through. Never empty, since the city name is
    /// always there.
    fn lines(&self, unit: WeatherUnit) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        if !self.weather.is_empty() {
            lines.push(capitalize(
                &self.weather.iter().map(|c| &c.description).join(", "),
            ));
        }
        if let Some(humidity) = self.main.humidity {
            lines.push(format!("Humidity {humidity:.0}%"));
        }
        if let Some(wind) = &self.wind {
            let suffix = match unit {
                WeatherUnit::Metric => "m/s",
                WeatherUnit::Imperial => "mph",
            };
            lines.push(format!("Wind {:.1}{suffix}", wind.speed));
        }
        lines.push(self.name.clone());
        lines
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
