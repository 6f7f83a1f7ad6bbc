#![forbid(unsafe_code)]

//! The image option mini-language.
//!
//! An option string is zero or more `key=value` segments separated by `;`:
//!
//! ```text
//! aspect=true; fill=over-size; size=100x50; shadow=45,4,8,80000000
//! ```
//!
//! Parsing happens in two steps. [`Tokenizer`] is a byte-driven automaton
//! that yields `(key, value)` pairs and silently skips malformed segments.
//! [`parse`] then dispatches each pair through a key table to a value
//! handler. Handlers never fail: a value they cannot read leaves its field
//! at the default.
//!
//! ```
//! use sbx_layout::options::{parse, Fill};
//!
//! let opts = parse(Some("aspect=true;fill=over-size;size=100x50"));
//! assert!(opts.aspect);
//! assert_eq!(opts.fill, Fill::OverSize);
//! assert_eq!((opts.width, opts.height), (100, 50));
//! assert!(!opts.shadow.enabled);
//! ```

use sbx_core::Size;

/// Aspect-aware fill strategy for an image inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Fill {
    /// Keep the natural size; aspect is only a hint.
    #[default]
    Disable,
    /// Contain: scale down only, letterbox inside the container.
    InSize,
    /// Cover when the container is larger: scale up only, crop.
    OverSize,
    /// Cover unconditionally, crop.
    FitSize,
}

/// Drop shadow parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shadow {
    pub enabled: bool,
    pub angle: i32,
    pub offset: i32,
    pub softness: i32,
    /// `0xAARRGGBB`.
    pub color: u32,
}

/// Options controlling one image update. Built fresh per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageOptions {
    /// Apply the decoder-reported orientation.
    pub orient: bool,
    /// Preserve the aspect ratio.
    pub aspect: bool,
    pub fill: Fill,
    /// Explicit width, `-1` when unset.
    pub width: i32,
    /// Explicit height, `-1` when unset.
    pub height: i32,
    pub shadow: Shadow,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            orient: false,
            aspect: false,
            fill: Fill::Disable,
            width: -1,
            height: -1,
            shadow: Shadow::default(),
        }
    }
}

impl ImageOptions {
    /// The explicit `size` option, if both dimensions were given.
    #[must_use]
    pub fn explicit_size(&self) -> Option<Size> {
        let width = u32::try_from(self.width).ok()?;
        let height = u32::try_from(self.height).ok()?;
        Some(Size::new(width, height))
    }

    /// The explicit size multiplied by the global UI scale factor.
    #[must_use]
    pub fn scaled_size(&self, scale: f64) -> Option<Size> {
        let size = self.explicit_size()?;
        Some(Size::new(
            (f64::from(size.width) * scale) as u32,
            (f64::from(size.height) * scale) as u32,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Automaton states of the [`Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    /// Between segments, skipping blanks and separators.
    Start,
    /// Inside a key.
    MatchingKey,
    /// After a key, waiting for `=`.
    AwaitingAssign,
    /// Inside a value, up to `;` or the end.
    ReadingValue,
    /// Discarding a malformed segment.
    SkipToSemicolon,
    /// A malformed segment was detected.
    Error,
    /// Input exhausted.
    End,
}

/// One `key=value` pair. Both sides are trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Splits an option string into [`Token`]s.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    state: TokenizerState,
    key_start: usize,
    key_end: usize,
    value_start: usize,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            state: TokenizerState::Start,
            key_start: 0,
            key_end: 0,
            value_start: 0,
        }
    }

    /// Current automaton state.
    #[must_use]
    pub fn state(&self) -> TokenizerState {
        self.state
    }

    /// Advance the automaton by one transition. Returns a token when a
    /// value is completed.
    fn step(&mut self) -> Option<Token<'a>> {
        use TokenizerState as S;

        let byte = self.input.as_bytes().get(self.pos).copied();
        match (self.state, byte) {
            (S::End, _) => {}

            (S::Start, None) => self.state = S::End,
            (S::Start, Some(b' ' | b'\t' | b';')) => self.pos += 1,
            (S::Start, Some(b'=')) => self.state = S::Error,
            (S::Start, Some(_)) => {
                self.key_start = self.pos;
                self.state = S::MatchingKey;
            }

            (S::MatchingKey, None) => self.state = S::End,
            (S::MatchingKey, Some(b'=')) => {
                self.key_end = self.pos;
                self.begin_value();
            }
            (S::MatchingKey, Some(b' ' | b'\t')) => {
                self.key_end = self.pos;
                self.pos += 1;
                self.state = S::AwaitingAssign;
            }
            (S::MatchingKey, Some(b';')) => self.state = S::Error,
            (S::MatchingKey, Some(_)) => self.pos += 1,

            (S::AwaitingAssign, None) => self.state = S::End,
            (S::AwaitingAssign, Some(b' ' | b'\t')) => self.pos += 1,
            (S::AwaitingAssign, Some(b'=')) => self.begin_value(),
            (S::AwaitingAssign, Some(_)) => self.state = S::Error,

            (S::ReadingValue, None | Some(b';')) => {
                let token = Token {
                    key: &self.input[self.key_start..self.key_end],
                    value: self.input[self.value_start..self.pos].trim(),
                };
                if byte.is_some() {
                    self.pos += 1;
                    self.state = S::Start;
                } else {
                    self.state = S::End;
                }
                return Some(token);
            }
            (S::ReadingValue, Some(_)) => self.pos += 1,

            (S::Error, _) => self.state = S::SkipToSemicolon,

            (S::SkipToSemicolon, None) => self.state = S::End,
            (S::SkipToSemicolon, Some(b';')) => {
                self.pos += 1;
                self.state = S::Start;
            }
            (S::SkipToSemicolon, Some(_)) => self.pos += 1,
        }
        None
    }

    fn begin_value(&mut self) {
        self.pos += 1;
        self.value_start = self.pos;
        self.state = TokenizerState::ReadingValue;
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.state != TokenizerState::End {
            if let Some(token) = self.step() {
                return Some(token);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Key table
// ---------------------------------------------------------------------------

type Handler = fn(&mut ImageOptions, &str);

const HANDLERS: &[(&str, Handler)] = &[
    ("aspect", apply_aspect),
    ("orient", apply_orient),
    ("fill", apply_fill),
    ("size", apply_size),
    ("shadow", apply_shadow),
];

/// Parse an option string. `None` and `""` yield the defaults.
#[must_use]
pub fn parse(input: Option<&str>) -> ImageOptions {
    let mut options = ImageOptions::default();
    let Some(input) = input else {
        return options;
    };

    for token in Tokenizer::new(input) {
        match HANDLERS.iter().find(|(key, _)| *key == token.key) {
            Some((_, handler)) => handler(&mut options, token.value),
            None => tracing::trace!(
                target: "sbx.layout",
                key = token.key,
                "ignoring unknown image option"
            ),
        }
    }
    options
}

/// `true` iff the first four characters spell `true`; `None` for values
/// too short to decide.
fn parse_flag(value: &str) -> Option<bool> {
    value.get(..4).map(|head| head.eq_ignore_ascii_case("true"))
}

fn apply_aspect(options: &mut ImageOptions, value: &str) {
    if let Some(flag) = parse_flag(value) {
        options.aspect = flag;
    }
}

fn apply_orient(options: &mut ImageOptions, value: &str) {
    if let Some(flag) = parse_flag(value) {
        options.orient = flag;
    }
}

fn apply_fill(options: &mut ImageOptions, value: &str) {
    options.fill = if value.eq_ignore_ascii_case("in-size") {
        Fill::InSize
    } else if value.eq_ignore_ascii_case("over-size") {
        Fill::OverSize
    } else if value.eq_ignore_ascii_case("fit-size") {
        Fill::FitSize
    } else {
        Fill::Disable
    };
}

fn apply_size(options: &mut ImageOptions, value: &str) {
    let Some((width, height)) = value.split_once(['x', 'X']) else {
        return;
    };
    let (Ok(width), Ok(height)) = (width.trim().parse::<i32>(), height.trim().parse::<i32>())
    else {
        return;
    };
    if width < 0 || height < 0 {
        return;
    }
    options.width = width;
    options.height = height;
}

fn apply_shadow(options: &mut ImageOptions, value: &str) {
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();
    let [angle, offset, softness, color] = fields.as_slice() else {
        return;
    };
    let (Ok(angle), Ok(offset), Ok(softness), Some(color)) = (
        angle.parse::<i32>(),
        offset.parse::<i32>(),
        softness.parse::<i32>(),
        parse_hex(color),
    ) else {
        return;
    };
    options.shadow = Shadow {
        enabled: true,
        angle,
        offset,
        softness,
        color,
    };
}

fn parse_hex(value: &str) -> Option<u32> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .or_else(|| value.strip_prefix('#'))
        .unwrap_or(value);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
