use crate::{
    config::Config,
    display::Display,
    platform::Platform,
    remote_config::{RemoteConfig, WeatherUnit},
    timer::PeriodicTimer,
    view::{
        play_animation, resync_if_due, show_error, View, ERROR_PAUSE,
        RESYNC_PERIOD,
    },
};
use log::{error, info};
use std::time::Duration;

/// Gotta know weather or not it's gonna rain. Current conditions from
/// OpenWeather, rotating through a few detail lines.
#[derive(Debug)]
pub struct WeatherView {
    api_host: String,
    token: String,
    /// Pause after each detail line
    hold: Duration,
    unit: WeatherUnit,
    location: String,
    resync: PeriodicTimer,
    refresh: PeriodicTimer,
}

impl WeatherView {
    /// Only query the weather every 10 minutes (and on first run)
    pub const REFRESH_PERIOD: Duration = Duration::from_secs(600);

    pub fn new(config: &Config) -> Self {
        Self {
            api_host: config.weather_host.clone(),
            token: config.openweather_token.clone(),
            hold: config.weather_hold(),
            unit: WeatherUnit::default(),
            location: RemoteConfig::DEFAULT_LOCATION.into(),
            resync: PeriodicTimer::new(RESYNC_PERIOD),
            refresh: PeriodicTimer::new(Self::REFRESH_PERIOD),
        }
    }

    /// Current-conditions endpoint
    pub fn url(&self) -> String {
        format!("{}/data/2.5/weather", self.api_host)
    }

    /// Query params for the configured location. Location is
    /// `city, country code`, with the country in ISO 3166 format, e.g.
    /// `London, GB`
    pub fn query(&self) -> [(&str, &str); 3] {
        [
            ("q", self.location.as_str()),
            ("units", self.unit.as_query()),
            ("appid", self.token.as_str()),
        ]
    }

    /// Fetch and show fresh weather data. The timer is only marked on
    /// success, so a failed fetch is retried next tick, after a pause.
    fn refresh(
        &mut self,
        platform: &mut impl Platform,
        display: &mut impl Display,
    ) {
        info!("Getting weather for {}", self.location);
        let result = platform
            .fetch_json(&self.url(), &self.query())
            .and_then(|payload| display.display_weather(&payload));
        match result {
            Ok(()) => self.refresh.mark_fired(platform.monotonic_now()),
            Err(err) => {
                error!("Error refreshing weather, retrying: {err}");
                show_error(display);
                platform.sleep(ERROR_PAUSE);
            }
        }
    }
}

impl View for WeatherView {
    fn name(&self) -> &str {
        "weather"
    }

    fn on_tick(
        &mut self,
        config: &RemoteConfig,
        platform: &mut impl Platform,
        display: &mut impl Display,
    ) {
        self.unit = config.weather_unit;
        self.location.clone_from(&config.weather_location);
        display.set_weather_units(self.unit);

        resync_if_due(&mut self.resync, platform, display);
        if self.refresh.is_due(platform.monotonic_now()) {
            self.refresh(platform, display);
        }

        // The line transition takes about a second, which paces the loop
        display.scroll_next_label();
        play_animation(platform, display);
        platform.sleep(self.hold);
    }
}
