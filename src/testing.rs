//! Test fakes for the platform and display

use crate::{
    config::Config,
    display::{
        canvas::{Canvas, Panel},
        weather::LineScroll,
        Display, Scene,
    },
    error::FetchError,
    mode::ButtonId,
    platform::{Platform, WallTime},
    remote_config::WeatherUnit,
};
use itertools::Itertools;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

pub fn test_config() -> Config {
    serde_json::from_value(json!({
        "data_location": FakePlatform::CONFIG_URL,
        "openweather_token": "token",
        "weather_host": "http://weather.test",
    }))
    .unwrap()
}

/// Platform with a virtual clock: sleeping advances time instantly. Every
/// network call is recorded.
#[derive(Debug)]
pub struct FakePlatform {
    /// Virtual clock origin
    pub start: Instant,
    /// Virtual time slept so far
    pub elapsed: Duration,
    /// Remote config document. `None` means the fetch fails
    pub config_document: Option<Value>,
    /// Weather payload. `None` means the fetch fails
    pub weather_payload: Option<Value>,
    pub resync_ok: bool,
    pub wall_time: WallTime,
    /// Buttons currently held
    pub pressed: Vec<ButtonId>,
    /// Every URL fetched, in order, with its query params appended unencoded
    pub fetches: Vec<String>,
    /// Number of resync attempts
    pub resyncs: usize,
    pub sleeps: Vec<Duration>,
}

impl FakePlatform {
    pub const CONFIG_URL: &'static str = "http://config.test/data.json";

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Duration::ZERO,
            config_document: Some(json!({})),
            weather_payload: Some(json!({
                "name": "New York",
                "main": {"temp": 20.0},
            })),
            resync_ok: true,
            wall_time: WallTime::default(),
            pressed: Vec::new(),
            fetches: Vec::new(),
            resyncs: 0,
            sleeps: Vec::new(),
        }
    }
}

impl Platform for FakePlatform {
    fn fetch_json(
        &mut self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        if query.is_empty() {
            self.fetches.push(url.to_owned());
        } else {
            let params =
                query.iter().map(|(k, v)| format!("{k}={v}")).join("&");
            self.fetches.push(format!("{url}?{params}"));
        }
        let document = if url == Self::CONFIG_URL {
            &self.config_document
        } else {
            &self.weather_payload
        };
        document
            .clone()
            .ok_or_else(|| FetchError::transport(url, "network unreachable"))
    }

    fn resync_local_clock(&mut self) -> Result<(), FetchError> {
        self.resyncs += 1;
        if self.resync_ok {
            Ok(())
        } else {
            Err(FetchError::transport("http://time.test", "timed out"))
        }
    }

    fn wall_clock_now(&self) -> WallTime {
        self.wall_time
    }

    fn read_button(&mut self, id: ButtonId) -> bool {
        !self.pressed.contains(&id)
    }

    fn monotonic_now(&self) -> Instant {
        self.start + self.elapsed
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.elapsed += duration;
    }
}

/// Display that records what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub scenes: Vec<Scene>,
    pub units: Option<WeatherUnit>,
    pub weather_payloads: usize,
    pub scrolls: usize,
    pub animations: usize,
    /// Reject custom screens, as if a resource were missing
    pub reject_custom: bool,
    /// Reject weather payloads, as if they were malformed
    pub reject_weather: bool,
    /// Step returned from [Display::animate] while a custom screen with
    /// scrolling labels is up
    pub animate_step: Option<Duration>,
    /// Whether a custom screen with scrolling labels is up
    pub animating: bool,
    /// Frames left in the current weather line transition
    pub scroll_frames_left: usize,
}

impl RecordingDisplay {
    /// Frames in one weather line transition on a 64-pixel panel
    pub const SCROLL_FRAMES: usize = 32;
}

impl Display for RecordingDisplay {
    fn show(&mut self, scene: Scene) -> Result<(), FetchError> {
        if let Scene::Custom(_) = scene {
            if self.reject_custom {
                return Err(FetchError::resource_load(
                    "/images/bear.bmp",
                    "not found",
                ));
            }
            self.animating = self.animate_step.is_some();
        } else {
            self.animating = false;
        }
        self.scenes.push(scene);
        Ok(())
    }

    fn animate(&mut self, _: Instant) -> Option<Duration> {
        if self.scroll_frames_left > 0 {
            self.scroll_frames_left -= 1;
            Some(LineScroll::STEP)
        } else if self.animating {
            self.animations += 1;
            self.animate_step
        } else {
            None
        }
    }

    fn set_weather_units(&mut self, unit: WeatherUnit) {
        self.units = Some(unit);
    }

    fn display_weather(&mut self, _: &Value) -> Result<(), FetchError> {
        if self.reject_weather {
            Err(FetchError::decode("weather payload", "missing field `main`"))
        } else {
            self.weather_payloads += 1;
            Ok(())
        }
    }

    fn scroll_next_label(&mut self) {
        self.scrolls += 1;
        self.animating = false;
        self.scroll_frames_left = Self::SCROLL_FRAMES;
    }
}

/// Panel that throws every frame away
#[derive(Debug, Default)]
pub struct NullPanel;

impl Panel for NullPanel {
    fn flush(&mut self, _: &Canvas) -> anyhow::Result<()> {
        Ok(())
    }
}
