use crate::{
    display::canvas::Canvas,
    error::FetchError,
    remote_config::{Bitmap, Label, MessageSpec, ScrollingLabel},
    util::Color,
};
use embedded_graphics::{
    image::Image,
    mono_font::{iso_8859_1::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::Point,
    text::{Baseline, Text},
    Drawable,
};
use std::{
    fs,
    time::{Duration, Instant},
};
use tinybmp::Bmp;

/// Horizontal advance of the small font, in pixels
pub const CHAR_WIDTH: i32 = 6;

/// The operator's custom message screen, fully resolved and ready to draw
#[derive(Debug, Default)]
pub struct CustomScreen {
    items: Vec<Item>,
}

#[derive(Debug)]
enum Item {
    Text {
        text: String,
        position: Point,
        color: Color,
    },
    Scrolling(ScrollState),
    Image {
        /// Raw BMP file. Validated on load; decoded again on every draw
        /// since the decoded image borrows from this
        data: Vec<u8>,
        position: Point,
    },
}

impl CustomScreen {
    /// Resolve message specs into drawable items. Bitmaps are loaded from
    /// disk here, so a bad path fails the whole screen. Unsupported message
    /// types are left out.
    pub fn build(
        messages: &[MessageSpec],
        display_width: u32,
    ) -> Result<Self, FetchError> {
        let items: Vec<Item> = messages
            .iter()
            .filter_map(|message| match message {
                MessageSpec::Label(label) => {
                    Some(Ok(Self::label(label, display_width)))
                }
                MessageSpec::ScrollingLabel(label) => {
                    Some(Ok(Self::scrolling_label(label)))
                }
                MessageSpec::Bitmap(bitmap) => Some(Self::bitmap(bitmap)),
                MessageSpec::Unsupported => None,
            })
            .collect::<Result<_, FetchError>>()?;
        Ok(Self { items })
    }

    /// Text that fits in the window never moves, so it's just a label
    fn scrolling_label(label: &ScrollingLabel) -> Item {
        if label.text.chars().count() <= ScrollingLabel::MAX_CHARACTERS {
            Item::Text {
                text: label.text.clone(),
                position: Point::new(label.x, label.y),
                color: label.color,
            }
        } else {
            Item::Scrolling(ScrollState::new(label.clone()))
        }
    }

    fn label(label: &Label, display_width: u32) -> Item {
        let x = label
            .x
            .unwrap_or_else(|| centered_label_x(display_width, &label.text));
        Item::Text {
            text: label.text.clone(),
            position: Point::new(x, label.y),
            color: label.color,
        }
    }

    fn bitmap(bitmap: &Bitmap) -> Result<Item, FetchError> {
        let data = fs::read(&bitmap.path)
            .map_err(|err| FetchError::resource_load(&bitmap.path, err))?;
        Bmp::<Rgb888>::from_slice(&data).map_err(|err| {
            FetchError::resource_load(&bitmap.path, format!("{err:?}"))
        })?;
        Ok(Item::Image {
            data,
            position: Point::new(bitmap.x, bitmap.y),
        })
    }

    /// Are there any scrolling labels that need regular [Self::animate]
    /// calls?
    pub fn is_animated(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, Item::Scrolling(_)))
    }

    /// Step every scrolling label that's due. Return whether anything moved,
    /// plus how long until the next label is due. `None` if nothing animates.
    pub fn animate(&mut self, now: Instant) -> (bool, Option<Duration>) {
        let mut changed = false;
        let mut next: Option<Duration> = None;
        for item in &mut self.items {
            if let Item::Scrolling(state) = item {
                changed |= state.update(now);
                let wait = state.time_until_due(now);
                next = Some(next.map_or(wait, |next| next.min(wait)));
            }
        }
        (changed, next)
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        for item in &self.items {
            match item {
                Item::Text {
                    text,
                    position,
                    color,
                } => draw_small_text(canvas, text, *position, *color),
                Item::Scrolling(state) => draw_small_text(
                    canvas,
                    &state.visible_text(),
                    Point::new(state.label.x, state.label.y),
                    state.label.color,
                ),
                Item::Image { data, position } => {
                    if let Ok(bmp) = Bmp::<Rgb888>::from_slice(data) {
                        let _ = Image::new(&bmp, *position).draw(canvas);
                    }
                }
            }
        }
    }
}

/// A label too long for its window slides left one character per step, then
/// wraps around
#[derive(Debug)]
struct ScrollState {
    label: ScrollingLabel,
    position: usize,
    /// `None` until the first [Self::update]
    last_step: Option<Instant>,
}

impl ScrollState {
    fn new(label: ScrollingLabel) -> Self {
        Self {
            label,
            position: 0,
            last_step: None,
        }
    }

    fn chars(&self) -> usize {
        self.label.text.chars().count()
    }

    /// Move one character if a step is due. The first call only starts the
    /// clock. Return whether the text moved.
    fn update(&mut self, now: Instant) -> bool {
        if self.last_step.is_none() {
            self.last_step = Some(now);
            return false;
        }
        if self.time_until_due(now) > Duration::ZERO {
            return false;
        }
        self.last_step = Some(now);
        if self.chars() <= ScrollingLabel::MAX_CHARACTERS {
            return false;
        }
        // Text is followed by a gap of one window before it repeats
        let cycle = self.chars() + ScrollingLabel::MAX_CHARACTERS;
        self.position = (self.position + 1) % cycle;
        true
    }

    fn time_until_due(&self, now: Instant) -> Duration {
        self.last_step
            .map(|last_step| {
                (last_step + self.label.animate_time)
                    .saturating_duration_since(now)
            })
            .unwrap_or_default()
    }

    fn visible_text(&self) -> String {
        if self.chars() <= ScrollingLabel::MAX_CHARACTERS {
            return self.label.text.clone();
        }
        let padding =
            std::iter::repeat(' ').take(ScrollingLabel::MAX_CHARACTERS);
        self.label
            .text
            .chars()
            .chain(padding)
            .cycle()
            .skip(self.position)
            .take(ScrollingLabel::MAX_CHARACTERS)
            .collect()
    }
}

/// X position that centers a small-font label on the display
pub fn centered_label_x(display_width: u32, text: &str) -> i32 {
    (display_width as i32 - CHAR_WIDTH * text.chars().count() as i32) / 2
}

/// Draw text in the small font. `position.y` is the vertical middle of the
/// text.
pub fn draw_small_text(
    canvas: &mut Canvas,
    text: &str,
    position: Point,
    color: Color,
) {
    let style = MonoTextStyle::new(&FONT_6X10, Rgb888::from(color));
    // Drawing into memory can't fail
    let _ = Text::with_baseline(text, position, style, Baseline::Middle)
        .draw(canvas);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn scrolling(text: &str) -> ScrollingLabel {
        ScrollingLabel {
            text: text.into(),
            x: 3,
            y: 10,
            color: Color::from(0xffffff),
            animate_time: Duration::from_millis(300),
        }
    }

    /// Smallest valid BMP: 1x1, 24 bits per pixel, one red pixel
    fn bmp_file() -> NamedTempFile {
        let mut data = Vec::new();
        // File header
        data.extend_from_slice(b"BM");
        data.extend_from_slice(&58u32.to_le_bytes()); // File size
        data.extend_from_slice(&[0; 4]);
        data.extend_from_slice(&54u32.to_le_bytes()); // Pixel data offset
        // DIB header (BITMAPINFOHEADER)
        data.extend_from_slice(&40u32.to_le_bytes());
        data.extend_from_slice(&1i32.to_le_bytes()); // Width
        data.extend_from_slice(&1i32.to_le_bytes()); // Height
        data.extend_from_slice(&1u16.to_le_bytes()); // Planes
        data.extend_from_slice(&24u16.to_le_bytes()); // Bits per pixel
        data.extend_from_slice(&0u32.to_le_bytes()); // No compression
        data.extend_from_slice(&4u32.to_le_bytes()); // Image size
        data.extend_from_slice(&[0; 16]);
        // Pixel data (BGR, padded to 4 bytes)
        data.extend_from_slice(&[0x00, 0x00, 0xff, 0x00]);

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file
    }

    #[test]
    fn test_centered_label() {
        assert_eq!(centered_label_x(64, "HI"), 26);
        assert_eq!(centered_label_x(64, "Loading"), 11);
        // Truncates toward zero
        assert_eq!(centered_label_x(64, "ABCDEFGHIJKLM"), -7);
    }

    #[test]
    fn test_build_label() {
        let screen = CustomScreen::build(
            &[MessageSpec::Label(Label {
                text: "HI".into(),
                x: None,
                y: 5,
                color: Color::from(0xff0000),
            })],
            64,
        )
        .unwrap();
        assert!(!screen.is_animated());

        let mut canvas = Canvas::new(64, 32);
        screen.draw(&mut canvas);
        assert!(!canvas.is_blank());
    }

    #[test]
    fn test_build_bitmap() {
        let file = bmp_file();
        let screen = CustomScreen::build(
            &[MessageSpec::Bitmap(Bitmap {
                path: file.path().to_string_lossy().into_owned(),
                x: 2,
                y: 3,
            })],
            64,
        )
        .unwrap();
        let mut canvas = Canvas::new(64, 32);
        screen.draw(&mut canvas);
        assert_eq!(canvas.pixel(2, 3), Some(Rgb888::new(0xff, 0, 0)));
    }

    #[test]
    fn test_build_bitmap_missing() {
        let result = CustomScreen::build(
            &[MessageSpec::Bitmap(Bitmap {
                path: "/nonexistent/bear.bmp".into(),
                x: 0,
                y: 0,
            })],
            64,
        );
        assert!(matches!(result, Err(FetchError::ResourceLoad { .. })));
    }

    #[test]
    fn test_build_bitmap_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not a bitmap").unwrap();
        let result = CustomScreen::build(
            &[MessageSpec::Bitmap(Bitmap {
                path: file.path().to_string_lossy().into_owned(),
                x: 0,
                y: 0,
            })],
            64,
        );
        assert!(matches!(result, Err(FetchError::ResourceLoad { .. })));
    }

    /// Short scrolling text never moves, so it doesn't keep the loop polling
    #[test]
    fn test_scroll_short_text() {
        let now = Instant::now();
        let mut screen = CustomScreen::build(
            &[MessageSpec::ScrollingLabel(scrolling("HI"))],
            64,
        )
        .unwrap();
        assert!(!screen.is_animated());
        assert_eq!(screen.animate(now), (false, None));
        assert_eq!(
            screen.animate(now + Duration::from_secs(5)),
            (false, None)
        );

        let mut canvas = Canvas::new(64, 32);
        screen.draw(&mut canvas);
        assert!(!canvas.is_blank());
    }

    /// Even a label that stops moving waits a full step between updates
    #[test]
    fn test_scroll_step_resets_when_idle() {
        let now = Instant::now();
        let mut state = ScrollState::new(scrolling("short"));
        assert!(!state.update(now));
        let later = now + Duration::from_millis(300);
        assert!(!state.update(later));
        assert_eq!(state.time_until_due(later), Duration::from_millis(300));
        assert_eq!(state.visible_text(), "short");
    }

    #[test]
    fn test_build_skips_unsupported() {
        let screen = CustomScreen::build(
            &[
                MessageSpec::Unsupported,
                MessageSpec::Label(Label {
                    text: "HI".into(),
                    x: Some(0),
                    y: 5,
                    color: Color::from(0xffffff),
                }),
            ],
            64,
        )
        .unwrap();
        assert_eq!(screen.items.len(), 1);
    }

    #[test]
    fn test_scroll_long_text() {
        let now = Instant::now();
        let mut state = ScrollState::new(scrolling("Happy birthday"));
        assert_eq!(state.visible_text(), "Happy birt");
        assert!(!state.update(now));

        // Not due yet
        assert!(!state.update(now + Duration::from_millis(100)));
        assert_eq!(
            state.time_until_due(now + Duration::from_millis(100)),
            Duration::from_millis(200)
        );

        let now = now + Duration::from_millis(300);
        assert!(state.update(now));
        assert_eq!(state.visible_text(), "appy birth");

        // Wraps all the way around: 14 chars + 10 gap
        for i in 1..24 {
            assert!(state.update(now + Duration::from_millis(300) * i));
        }
        assert_eq!(state.visible_text(), "Happy birt");
    }

    #[test]
    fn test_animate() {
        let now = Instant::now();
        let mut screen = CustomScreen::build(
            &[
                MessageSpec::ScrollingLabel(scrolling("Happy birthday")),
                MessageSpec::ScrollingLabel(ScrollingLabel {
                    animate_time: Duration::from_millis(100),
                    ..scrolling("Many happy returns")
                }),
            ],
            64,
        )
        .unwrap();
        assert!(screen.is_animated());

        let (changed, next) = screen.animate(now);
        assert!(!changed);
        assert_eq!(next, Some(Duration::from_millis(100)));

        let (changed, next) = screen.animate(now + Duration::from_millis(100));
        assert!(changed);
        assert_eq!(next, Some(Duration::from_millis(100)));
    }
}
