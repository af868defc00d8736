//! A "view" is one of the base modes the device can be in. Each view has a
//! submodule that owns its refresh timers and decides what to fetch and what
//! to show on each tick.

pub mod clock;
pub mod weather;

use crate::{
    display::{Display, Scene, MIN_ANIMATION_STEP},
    platform::Platform,
    remote_config::RemoteConfig,
    timer::PeriodicTimer,
};
use log::{error, info};
use std::time::Duration;

/// How often each view re-synchronizes the wall clock
pub const RESYNC_PERIOD: Duration = Duration::from_secs(3600);
/// Pause after a failed resync or weather refresh, before carrying on with
/// the tick
pub const ERROR_PAUSE: Duration = Duration::from_secs(5);

/// A base display mode. The scheduler calls [View::on_tick] once per loop
/// iteration while the view is active; the view handles its own refreshes,
/// renders, and blocks for however long it wants to hold the screen.
pub trait View {
    /// Get a descriptive name for this view, for logging
    fn name(&self) -> &str;

    /// Refresh whatever's due and render. Failures are handled in here; the
    /// loop never sees them.
    fn on_tick(
        &mut self,
        config: &RemoteConfig,
        platform: &mut impl Platform,
        display: &mut impl Display,
    );
}

/// If the timer is due, sync the wall clock from the network. On failure,
/// show the error screen for a moment and leave the timer due so we try again
/// next tick.
fn resync_if_due(
    timer: &mut PeriodicTimer,
    platform: &mut impl Platform,
    display: &mut impl Display,
) {
    if !timer.is_due(platform.monotonic_now()) {
        return;
    }
    match platform.resync_local_clock() {
        Ok(()) => {
            info!("Local time synchronized");
            timer.mark_fired(platform.monotonic_now());
        }
        Err(err) => {
            error!("Error synchronizing local time, retrying: {err}");
            show_error(display);
            platform.sleep(ERROR_PAUSE);
        }
    }
}

/// Put up the error screen. It doesn't load anything, so it can't fail.
fn show_error(display: &mut impl Display) {
    if let Err(err) = display.show(Scene::Error) {
        error!("Error showing error screen: {err}");
    }
}

/// Step the display's current animation until it's finished
fn play_animation(platform: &mut impl Platform, display: &mut impl Display) {
    let mut now = platform.monotonic_now();
    while let Some(step) = display.animate(now) {
        platform.sleep(step.max(MIN_ANIMATION_STEP));
        now = platform.monotonic_now();
    }
}
