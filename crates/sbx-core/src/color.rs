#![forbid(unsafe_code)]

//! Color-class strings.
//!
//! A color class carries three RGBA channels (object, outline, shadow) as
//! exactly twelve whitespace-separated integers:
//!
//! ```
//! use sbx_core::color::ColorClass;
//!
//! let class: ColorClass = "255 0 0 255  0 0 0 128  0 0 0 0".parse().unwrap();
//! assert_eq!(class.object.r, 255);
//! assert_eq!(class.outline.a, 128);
//! ```

use std::fmt;
use std::str::FromStr;

/// One RGBA channel of a color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a 32-bit `0xAARRGGBB` value.
    #[must_use]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }
}

/// Object, outline and shadow colors applied to a named color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorClass {
    pub object: Rgba,
    pub outline: Rgba,
    pub shadow: Rgba,
}

/// Errors produced while parsing a color-class string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorClassError {
    /// Fewer or more than twelve fields.
    FieldCount(usize),
    /// A field is not an integer in `0..=255`.
    Component { index: usize, value: String },
}

impl fmt::Display for ColorClassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount(n) => write!(f, "color class needs 12 integers, got {n}"),
            Self::Component { index, value } => {
                write!(f, "color class field {index} is not a channel value: {value:?}")
            }
        }
    }
}

impl std::error::Error for ColorClassError {}

impl FromStr for ColorClass {
    type Err = ColorClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 12 {
            return Err(ColorClassError::FieldCount(fields.len()));
        }

        let mut values = [0u8; 12];
        for (index, field) in fields.iter().enumerate() {
            values[index] = field
                .parse::<u8>()
                .map_err(|_| ColorClassError::Component {
                    index,
                    value: (*field).to_string(),
                })?;
        }

        let channel = |i: usize| Rgba::new(values[i], values[i + 1], values[i + 2], values[i + 3]);
        Ok(Self {
            object: channel(0),
            outline: channel(4),
            shadow: channel(8),
        })
    }
}
