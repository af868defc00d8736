use anyhow::Context;
use embedded_graphics::{
    pixelcolor::{Rgb888, RgbColor},
    prelude::{DrawTarget, OriginDimensions, Pixel, Size},
};
use log::trace;
use std::{
    convert::Infallible,
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
};

/// In-memory copy of the pixel matrix. Everything is drawn here first, then
/// the whole frame is pushed to the [Panel] at once.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb888::BLACK; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Turn every pixel off
    pub fn blank(&mut self) {
        self.pixels.fill(Rgb888::BLACK);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Is anything lit?
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|pixel| *pixel == Rgb888::BLACK)
    }

    /// Encode the frame as little-endian RGB565, the usual framebuffer format
    pub fn to_rgb565(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|pixel| {
                let value = ((pixel.r() as u16 >> 3) << 11)
                    | ((pixel.g() as u16 >> 2) << 5)
                    | (pixel.b() as u16 >> 3);
                value.to_le_bytes()
            })
            .collect()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Anything off-screen is clipped
            if let (Ok(x), Ok(y)) =
                (u32::try_from(point.x), u32::try_from(point.y))
            {
                if x < self.width && y < self.height {
                    self.pixels[(y * self.width + x) as usize] = color;
                }
            }
        }
        Ok(())
    }
}

/// Physical output for a finished frame
pub trait Panel {
    fn flush(&mut self, canvas: &Canvas) -> anyhow::Result<()>;
}

/// Panel exposed as a Linux framebuffer device (e.g. `/dev/fb0`)
#[derive(Clone, Debug)]
pub struct FramebufferPanel {
    path: PathBuf,
}

impl FramebufferPanel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Turn off every pixel on the panel
    pub fn blank(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        self.flush(&Canvas::new(width, height))
    }
}

impl Panel for FramebufferPanel {
    fn flush(&mut self, canvas: &Canvas) -> anyhow::Result<()> {
        trace!("Writing frame to {}", self.path.display());
        // Never create: if the device is missing, that's an error
        let mut device = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .with_context(|| {
                format!("Error opening framebuffer {}", self.path.display())
            })?;
        device.write_all(&canvas.to_rgb565()).with_context(|| {
            format!("Error writing framebuffer {}", self.path.display())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        prelude::{Point, Primitive},
        primitives::{PrimitiveStyle, Rectangle},
        Drawable,
    };
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_draw_clipped() {
        let mut canvas = Canvas::new(4, 2);
        Rectangle::new(Point::new(2, -1), Size::new(10, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut canvas)
            .unwrap();
        assert_eq!(canvas.pixel(0, 0), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(2, 0), Some(Rgb888::RED));
        assert_eq!(canvas.pixel(3, 0), Some(Rgb888::RED));
        assert_eq!(canvas.pixel(3, 1), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(4, 0), None);

        canvas.blank();
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_rgb565() {
        let mut canvas = Canvas::new(2, 1);
        canvas
            .draw_iter([
                Pixel(Point::new(0, 0), Rgb888::WHITE),
                Pixel(Point::new(1, 0), Rgb888::new(0xff, 0, 0)),
            ])
            .unwrap();
        assert_eq!(canvas.to_rgb565(), vec![0xff, 0xff, 0x00, 0xf8]);
    }

    #[test]
    fn test_framebuffer_flush() {
        let file = NamedTempFile::new().unwrap();
        let mut panel = FramebufferPanel::new(file.path());
        let mut canvas = Canvas::new(2, 2);
        canvas
            .draw_iter([Pixel(Point::new(1, 1), Rgb888::WHITE)])
            .unwrap();
        panel.flush(&canvas).unwrap();
        assert_eq!(
            fs::read(file.path()).unwrap(),
            vec![0, 0, 0, 0, 0, 0, 0xff, 0xff]
        );

        panel.blank(2, 2).unwrap();
        assert_eq!(fs::read(file.path()).unwrap(), vec![0; 8]);
    }

    #[test]
    fn test_framebuffer_missing() {
        let mut panel = FramebufferPanel::new("/nonexistent/fb0");
        assert!(panel.flush(&Canvas::new(1, 1)).is_err());
    }
}
