use anyhow::anyhow;
use embedded_graphics::pixelcolor::Rgb888;
use serde::Deserialize;
use std::str::FromStr;

/// 24-bit Red-Green-Blue color. Deserializes from either a hex string or a
/// plain integer, since the remote document has used both over time.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn from_u32(value: u32) -> Self {
        // Casting will truncate the 24 most significant bits
        Self {
            red: (value >> 16) as u8,
            green: (value >> 8) as u8,
            blue: value as u8,
        }
    }
}

// This is lossy, since we throw away the first 8 bits. Hope it wasn't RGBA!
impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl From<Color> for Rgb888 {
    fn from(color: Color) -> Self {
        Rgb888::new(color.red, color.green, color.blue)
    }
}

/// Accepts `rrggbb`, `#rrggbb` or `0xrrggbb`
impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            let value = u32::from_str_radix(digits, 16)?;
            Ok(value.into())
        } else {
            Err(anyhow!("Invalid color string: {}", s))
        }
    }
}

/// Wire format for colors
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Integer(u32),
    Hex(String),
}

// Needed for serde
impl TryFrom<ColorRepr> for Color {
    type Error = anyhow::Error;

    fn try_from(value: ColorRepr) -> Result<Self, Self::Error> {
        match value {
            ColorRepr::Integer(value) if value <= 0xffffff => Ok(value.into()),
            ColorRepr::Integer(value) => {
                Err(anyhow!("Color out of range: {value:#x}"))
            }
            ColorRepr::Hex(s) => s.parse(),
        }
    }
}
