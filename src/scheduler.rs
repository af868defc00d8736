//! The device's main loop. Each tick reloads the remote config, then either
//! shows the operator's custom messages or hands off to the active view, and
//! finally checks the buttons.

use crate::{
    config::Config,
    display::{Display, Scene, MIN_ANIMATION_STEP},
    mode::{ButtonEdge, Mode, ModeSelector},
    platform::Platform,
    remote_config::{self, MessageEntry},
    view::{clock::ClockView, weather::WeatherView, View},
};
use log::{error, info, trace};
use std::{error::Error, time::Duration};

/// What a single tick ended up doing
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// No custom messages, so the active view ran
    Dispatched(Mode),
    /// Custom messages were shown for the full window
    Override,
    /// Custom messages couldn't be shown; the error screen was up instead
    OverrideFailed,
}

/// All loop state lives here, and is only ever touched by the loop
pub struct Scheduler<P, D> {
    platform: P,
    display: D,
    config_url: String,
    selector: ModeSelector,
    clock: ClockView,
    weather: WeatherView,
}

impl<P: Platform, D: Display> Scheduler<P, D> {
    /// How long custom messages stay up before we check the config again
    pub const OVERRIDE_WINDOW: Duration = Duration::from_secs(60);
    /// How long the error screen stays up when custom messages are broken
    pub const OVERRIDE_ERROR_PAUSE: Duration = Duration::from_secs(60);

    pub fn new(config: &Config, platform: P, display: D) -> Self {
        Self {
            platform,
            display,
            config_url: config.data_location.clone(),
            selector: ModeSelector::default(),
            clock: ClockView::new(),
            weather: WeatherView::new(config),
        }
    }

    pub fn mode(&self) -> Mode {
        self.selector.current()
    }

    /// Run forever. Nothing in a tick can fail, so neither can this.
    pub fn run(&mut self) -> ! {
        info!("Starting in {} mode", self.mode());
        loop {
            let outcome = self.tick();
            trace!("Tick finished: {outcome:?}");
        }
    }

    /// One pass of the loop. Blocks for as long as the current screen wants
    /// to be held (5s for the clock, 60s for custom messages, etc.).
    pub fn tick(&mut self) -> TickOutcome {
        // Always fresh config, so this tick never acts on a stale one
        let config = remote_config::load(&mut self.platform, &self.config_url);

        let outcome = if config.has_override() {
            self.show_override(&config.custom_messages)
        } else {
            let mode = self.selector.current();
            match mode {
                Mode::Clock => self.dispatch_clock(&config),
                Mode::Weather => self.dispatch_weather(&config),
            }
            TickOutcome::Dispatched(mode)
        };

        // Presses during a hold aren't seen until the hold is over
        self.poll_buttons();
        outcome
    }

    fn dispatch_clock(&mut self, config: &remote_config::RemoteConfig) {
        trace!("Running {} tick", self.clock.name());
        self.clock.on_tick(config, &mut self.platform, &mut self.display);
    }

    fn dispatch_weather(&mut self, config: &remote_config::RemoteConfig) {
        trace!("Running {} tick", self.weather.name());
        self.weather
            .on_tick(config, &mut self.platform, &mut self.display);
    }

    /// Show custom messages for the override window. If any message is bad
    /// or a resource can't be loaded, show the error screen instead. Either
    /// way, this tick is spent.
    fn show_override(&mut self, messages: &[MessageEntry]) -> TickOutcome {
        let messages =
            match messages.iter().cloned().collect::<Result<Vec<_>, _>>() {
                Ok(messages) => messages,
                Err(err) => return self.override_failed(&err),
            };
        if let Err(err) = self.display.show(Scene::Custom(messages)) {
            return self.override_failed(&err);
        }
        self.hold_override();
        TickOutcome::Override
    }

    /// Keep the custom screen up for the whole window, stepping scrolling
    /// labels as they come due
    fn hold_override(&mut self) {
        let mut now = self.platform.monotonic_now();
        let deadline = now + Self::OVERRIDE_WINDOW;
        while let Some(step) = self.display.animate(now) {
            let remaining = deadline.saturating_duration_since(now);
            if remaining.is_zero() {
                return;
            }
            self.platform
                .sleep(step.max(MIN_ANIMATION_STEP).min(remaining));
            now = self.platform.monotonic_now();
        }
        // Nothing animates, so just wait it out
        self.platform
            .sleep(deadline.saturating_duration_since(now));
    }

    fn override_failed(&mut self, err: &dyn Error) -> TickOutcome {
        error!("Error showing custom messages: {err}");
        if let Err(err) = self.display.show(Scene::Error) {
            error!("Error showing error screen: {err}");
        }
        self.platform.sleep(Self::OVERRIDE_ERROR_PAUSE);
        TickOutcome::OverrideFailed
    }

    /// Sample the buttons once; either one flips the mode
    fn poll_buttons(&mut self) {
        let edge = ButtonEdge::sample(&mut self.platform);
        if edge == ButtonEdge::None {
            return;
        }
        if let Err(err) = self.display.show(Scene::Loading) {
            error!("Error showing loading screen: {err}");
        }
        self.selector.apply(edge);
    }
}
