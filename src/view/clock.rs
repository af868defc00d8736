use crate::{
    display::{ClockFace, Display, Scene},
    platform::{Platform, WallTime},
    remote_config::RemoteConfig,
    timer::PeriodicTimer,
    view::{resync_if_due, View, RESYNC_PERIOD},
};
use log::{error, trace};
use std::time::Duration;

/// Big wall clock, colored by AM/PM
#[derive(Debug)]
pub struct ClockView {
    resync: PeriodicTimer,
}

impl ClockView {
    /// How long each frame stays up before the next tick
    pub const INTERVAL: Duration = Duration::from_secs(5);

    pub fn new() -> Self {
        Self {
            resync: PeriodicTimer::new(RESYNC_PERIOD),
        }
    }
}

impl Default for ClockView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for ClockView {
    fn name(&self) -> &str {
        "clock"
    }

    fn on_tick(
        &mut self,
        config: &RemoteConfig,
        platform: &mut impl Platform,
        display: &mut impl Display,
    ) {
        resync_if_due(&mut self.resync, platform, display);

        // Show the time even if the resync failed. Our clock is probably
        // still close enough
        let face = clock_face(platform.wall_clock_now(), config);
        trace!("Showing time {}", face.text);
        if let Err(err) = display.show(Scene::Clock(face)) {
            error!("Error showing clock: {err}");
        }
        platform.sleep(Self::INTERVAL);
    }
}

/// Format the time as 12-hour `h:mm`, in the AM or PM color
pub fn clock_face(time: WallTime, config: &RemoteConfig) -> ClockFace {
    let color = if time.hour < 12 {
        config.clock_am_color
    } else {
        config.clock_pm_color
    };
    let hour = match time.hour {
        0 => 12,
        hour if hour > 12 => hour - 12,
        hour => hour,
    };
    ClockFace {
        text: format!("{hour}:{:02}", time.minute),
        color,
    }
}
