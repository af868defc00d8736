//! Everything the scheduler needs from the outside world that isn't drawing
//! pixels: network, time and buttons. The scheduler is generic over
//! [Platform] so the whole loop can run against a fake in tests.

use crate::{
    config::Config,
    error::FetchError,
    gpio,
    mode::ButtonId,
    network::{HttpClient, NetworkClock},
};
use anyhow::Context;
use chrono::{NaiveTime, Timelike};
use embedded_hal::digital::InputPin;
use log::error;
use serde_json::Value;
use std::{
    thread,
    time::{Duration, Instant},
};

pub trait Platform {
    /// Fetch a URL and parse the body as JSON. `query` params are appended
    /// to the URL, encoded
    fn fetch_json(
        &mut self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, FetchError>;

    /// Correct our wall clock from a network time source
    fn resync_local_clock(&mut self) -> Result<(), FetchError>;

    /// Current local time of day
    fn wall_clock_now(&self) -> WallTime;

    /// Read one button. Inputs are pulled up, so `true` means *not* pressed
    fn read_button(&mut self, id: ButtonId) -> bool;

    fn monotonic_now(&self) -> Instant;

    /// Block the loop. Nothing else runs while we sleep.
    fn sleep(&mut self, duration: Duration);
}

/// Local time of day, 24-hour
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct WallTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl From<NaiveTime> for WallTime {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
        }
    }
}

/// The two buttons on the board, active-low
pub struct Buttons<P> {
    down: P,
    up: P,
}

impl<P: InputPin> Buttons<P> {
    pub fn new(down: P, up: P) -> Self {
        Self { down, up }
    }

    /// Is the button released? A pin we can't read counts as released, so a
    /// flaky input can't make the modes flap
    pub fn is_released(&mut self, id: ButtonId) -> bool {
        let pin = match id {
            ButtonId::Down => &mut self.down,
            ButtonId::Up => &mut self.up,
        };
        pin.is_high().unwrap_or_else(|err| {
            error!("Error reading {id:?} button: {err:?}");
            true
        })
    }
}

/// The real thing: HTTP, network time and GPIO buttons
pub struct DevicePlatform {
    http: HttpClient,
    clock: NetworkClock,
    time_url: String,
    buttons: Buttons<gpio::Pin>,
}

impl DevicePlatform {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let down = gpio::init_pin(config.button_down_pin)
            .context("Initializing pin Button Down")?;
        let up = gpio::init_pin(config.button_up_pin)
            .context("Initializing pin Button Up")?;
        Ok(Self {
            http: HttpClient::new(),
            clock: NetworkClock::default(),
            time_url: config.time_url.clone(),
            buttons: Buttons::new(down, up),
        })
    }
}

impl Platform for DevicePlatform {
    fn fetch_json(
        &mut self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        self.http.fetch_json(url, query)
    }

    fn resync_local_clock(&mut self) -> Result<(), FetchError> {
        let document = self.http.fetch_json(&self.time_url, &[])?;
        self.clock.sync(&document)
    }

    fn wall_clock_now(&self) -> WallTime {
        self.clock.now().time().into()
    }

    fn read_button(&mut self, id: ButtonId) -> bool {
        self.buttons.is_released(id)
    }

    fn monotonic_now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
