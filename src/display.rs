//! Rendering. The scheduler hands over fully-resolved [Scene]s; this module
//! turns them into pixels and pushes finished frames to the panel.

pub mod canvas;
pub mod custom;
pub mod weather;

use crate::{
    config::Config,
    display::{
        canvas::{Canvas, Panel},
        custom::{centered_label_x, draw_small_text, CustomScreen},
        weather::{LineScroll, WeatherGraphics},
    },
    error::FetchError,
    remote_config::{MessageSpec, WeatherUnit},
    util::Color,
};
use embedded_graphics::{pixelcolor::Rgb888, prelude::Point};
use log::{error, trace};
use serde_json::Value;
use std::time::{Duration, Instant};
use u8g2_fonts::{
    fonts,
    types::{FontColor, VerticalPosition},
    FontRenderer,
};

/// Shortest pause between animation steps, so a zero step can't spin the
/// loop
pub const MIN_ANIMATION_STEP: Duration = Duration::from_millis(10);

/// Render collaborator. Drawing itself never fails; only loading external
/// resources (bitmaps, weather payloads) can.
pub trait Display {
    /// Replace the screen contents
    fn show(&mut self, scene: Scene) -> Result<(), FetchError>;

    /// Step any animations on the current screen (scrolling labels or a
    /// weather line transition). Return how long until the next step is due,
    /// or `None` if nothing on screen animates. The first call after a new
    /// screen starts the animation clock.
    fn animate(&mut self, now: Instant) -> Option<Duration>;

    fn set_weather_units(&mut self, unit: WeatherUnit);

    /// Decode a raw weather payload and show it
    fn display_weather(&mut self, payload: &Value) -> Result<(), FetchError>;

    /// Start moving the weather screen to its next detail line. The
    /// transition plays out over [Self::animate] calls, and always finishes.
    fn scroll_next_label(&mut self);
}

/// Something to put on the screen
#[derive(Clone, Debug, PartialEq)]
pub enum Scene {
    /// Shown while switching modes
    Loading,
    /// Shown when something couldn't be fetched or built
    Error,
    Clock(ClockFace),
    /// The operator's custom messages, in display order
    Custom(Vec<MessageSpec>),
}

/// Render request for the clock: the formatted time and its color. The label
/// is centered on the display.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClockFace {
    pub text: String,
    pub color: Color,
}

/// Display on an RGB pixel matrix. Frames are drawn on a [Canvas] and then
/// flushed to the panel in one go.
pub struct MatrixDisplay<P> {
    canvas: Canvas,
    panel: P,
    clock_font: FontRenderer,
    custom: CustomScreen,
    weather: WeatherGraphics,
    line_scroll: Option<LineScroll>,
}

impl<P: Panel> MatrixDisplay<P> {
    const LOADING_COLOR: Color = Color::from_u32(0x999999);
    const ERROR_COLOR: Color = Color::from_u32(0xaaaa00);
    const TEMPERATURE_COLOR: Color = Color::from_u32(0xffaa00);
    const WEATHER_LINE_COLOR: Color = Color::from_u32(0x3b6bff);

    pub fn new(config: &Config, panel: P) -> Self {
        Self::with_size(config.display_width, config.display_height, panel)
    }

    pub fn with_size(width: u32, height: u32, panel: P) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            panel,
            clock_font: FontRenderer::new::<fonts::u8g2_font_logisoso16_tn>()
                .with_ignore_unknown_chars(true),
            custom: CustomScreen::default(),
            weather: WeatherGraphics::default(),
            line_scroll: None,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Push the canvas to the panel. A panel error only costs us this frame,
    /// so it's logged rather than returned.
    fn flush(&mut self) {
        if let Err(err) = self.panel.flush(&self.canvas) {
            error!("Error updating panel: {err:#}");
        }
    }

    fn draw_loading(&mut self) {
        let x = centered_label_x(self.canvas.width(), "Loading");
        draw_small_text(
            &mut self.canvas,
            "Loading",
            Point::new(x, 15),
            Self::LOADING_COLOR,
        );
    }

    fn draw_error(&mut self) {
        let lines = [("Something", 5), ("is wrong!", 15), ("Text Tiny", 25)];
        for (text, y) in lines {
            draw_small_text(
                &mut self.canvas,
                text,
                Point::new(5, y),
                Self::ERROR_COLOR,
            );
        }
    }

    fn draw_clock(&mut self, face: &ClockFace) {
        // Center on the glyphs' ink, not their advance, so side bearings
        // don't skew the label
        let (text_width, left_bearing) = self
            .clock_font
            .get_rendered_dimensions(
                face.text.as_str(),
                Point::zero(),
                VerticalPosition::Center,
            )
            .ok()
            .and_then(|dimensions| dimensions.bounding_box)
            .map(|bounding_box| {
                (bounding_box.size.width, bounding_box.top_left.x)
            })
            .unwrap_or_default();
        let position = Point::new(
            centered_x(self.canvas.width(), text_width) - left_bearing,
            self.canvas.height() as i32 / 2,
        );
        if let Err(err) = self.clock_font.render(
            face.text.as_str(),
            position,
            VerticalPosition::Center,
            FontColor::Transparent(Rgb888::from(face.color)),
            &mut self.canvas,
        ) {
            error!("Error drawing clock text {:?}: {err:?}", face.text);
        }
    }

    fn draw_weather(&mut self) {
        let width = self.canvas.width();
        match (self.weather.temperature(), self.weather.current_line()) {
            (Some(temperature), Some(line)) => {
                let x = centered_label_x(width, &temperature);
                draw_small_text(
                    &mut self.canvas,
                    &temperature,
                    Point::new(x, 8),
                    Self::TEMPERATURE_COLOR,
                );
                let lines = match &self.line_scroll {
                    Some(scroll) => vec![
                        (scroll.from(), -scroll.offset()),
                        (scroll.to(), width as i32 - scroll.offset()),
                    ],
                    None => vec![(line.as_str(), 0)],
                };
                for (line, shift) in lines {
                    let x = centered_label_x(width, line).max(0) + shift;
                    draw_small_text(
                        &mut self.canvas,
                        line,
                        Point::new(x, 22),
                        Self::WEATHER_LINE_COLOR,
                    );
                }
            }
            _ => {
                let x = centered_label_x(width, "No data");
                draw_small_text(
                    &mut self.canvas,
                    "No data",
                    Point::new(x, 15),
                    Self::WEATHER_LINE_COLOR,
                );
            }
        }
    }
}

impl<P: Panel> Display for MatrixDisplay<P> {
    fn show(&mut self, scene: Scene) -> Result<(), FetchError> {
        trace!("Showing {scene:?}");
        // Build first, so a bad custom screen leaves the old frame up
        if let Scene::Custom(messages) = &scene {
            self.custom = CustomScreen::build(messages, self.canvas.width())?;
        } else {
            self.custom = CustomScreen::default();
        }
        self.line_scroll = None;

        self.canvas.blank();
        match &scene {
            Scene::Loading => self.draw_loading(),
            Scene::Error => self.draw_error(),
            Scene::Clock(face) => self.draw_clock(face),
            Scene::Custom(_) => self.custom.draw(&mut self.canvas),
        }
        self.flush();
        Ok(())
    }

    fn animate(&mut self, now: Instant) -> Option<Duration> {
        if let Some(scroll) = self.line_scroll.as_mut() {
            let moved = scroll.update(now);
            let next = scroll.time_until_due(now);
            let done = scroll.is_done();
            if done {
                // Final frame is just the new line in its usual spot
                self.line_scroll = None;
            }
            if moved {
                self.canvas.blank();
                self.draw_weather();
                self.flush();
            }
            return if done { None } else { Some(next) };
        }

        if !self.custom.is_animated() {
            return None;
        }
        let (changed, next) = self.custom.animate(now);
        if changed {
            self.canvas.blank();
            self.custom.draw(&mut self.canvas);
            self.flush();
        }
        next
    }

    fn set_weather_units(&mut self, unit: WeatherUnit) {
        self.weather.set_units(unit);
    }

    fn display_weather(&mut self, payload: &Value) -> Result<(), FetchError> {
        self.weather.display_weather(payload)?;
        self.custom = CustomScreen::default();
        self.line_scroll = None;
        self.canvas.blank();
        self.draw_weather();
        self.flush();
        Ok(())
    }

    fn scroll_next_label(&mut self) {
        let from = self.weather.current_line();
        self.weather.scroll_next_label();
        self.custom = CustomScreen::default();
        // With no data there's nothing to move
        self.line_scroll = from.zip(self.weather.current_line()).map(
            |(from, to)| LineScroll::new(from, to, self.canvas.width()),
        );
        self.canvas.blank();
        self.draw_weather();
        self.flush();
    }
}

/// X position that centers something `text_width` wide on the display,
/// rounded to the nearest pixel
pub fn centered_x(display_width: u32, text_width: u32) -> i32 {
    (display_width as f32 / 2.0 - text_width as f32 / 2.0).round() as i32
}
