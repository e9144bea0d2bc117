//! Utility module with the RGB values of the 16 ANSI colors.
//!
//! Terminals do not agree on the colors they use for the 16 ANSI colors, and
//! many let users configure them. Matching colors against the ANSI colors
//! hence requires an assumption about their RGB values, i.e., a [`Palette`].

use crate::termco::{AnsiColor, Rgb};

/// The RGB values for the 16 ANSI colors.
///
/// A palette is indexed by [`AnsiColor`]:
///
/// ```
/// # use colorfit::termco::{AnsiColor, Rgb};
/// # use colorfit::theme::{VGA_COLORS, XTERM_COLORS};
/// assert_eq!(XTERM_COLORS[AnsiColor::Red], Rgb::new(0x80, 0, 0));
/// assert_eq!(VGA_COLORS[AnsiColor::Yellow], Rgb::new(170, 85, 0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    inner: [Rgb; 16],
}

impl Palette {
    /// Create a new palette with the given colors in ANSI color order.
    pub const fn new(colors: [Rgb; 16]) -> Self {
        Self { inner: colors }
    }

    /// Get an iterator over the palette's colors in ANSI color order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rgb> {
        self.inner.iter()
    }
}

impl Default for Palette {
    fn default() -> Self {
        XTERM_COLORS
    }
}

impl AsRef<[Rgb]> for Palette {
    fn as_ref(&self) -> &[Rgb] {
        &self.inner
    }
}

impl std::ops::Index<AnsiColor> for Palette {
    type Output = Rgb;

    fn index(&self, index: AnsiColor) -> &Self::Output {
        &self.inner[index as usize]
    }
}

macro_rules! rgb {
    ($r:expr, $g:expr, $b:expr) => {
        Rgb::new($r, $g, $b)
    };
}

/// xterm's default colors.
///
/// This is the default palette.
pub const XTERM_COLORS: Palette = Palette::new([
    rgb!(0x00, 0x00, 0x00),
    rgb!(0x80, 0x00, 0x00),
    rgb!(0x00, 0x80, 0x00),
    rgb!(0x80, 0x80, 0x00),
    rgb!(0x00, 0x00, 0x80),
    rgb!(0x80, 0x00, 0x80),
    rgb!(0x00, 0x80, 0x80),
    rgb!(0xc0, 0xc0, 0xc0),
    rgb!(0x80, 0x80, 0x80),
    rgb!(0xff, 0x00, 0x00),
    rgb!(0x00, 0xff, 0x00),
    rgb!(0xff, 0xff, 0x00),
    rgb!(0x00, 0x00, 0xff),
    rgb!(0xff, 0x00, 0xff),
    rgb!(0x00, 0xff, 0xff),
    rgb!(0xff, 0xff, 0xff),
]);

/// The colors of [VGA text
/// mode](https://en.wikipedia.org/wiki/ANSI_escape_code#3-bit_and_4-bit).
pub const VGA_COLORS: Palette = Palette::new([
    rgb!(0, 0, 0),
    rgb!(170, 0, 0),
    rgb!(0, 170, 0),
    rgb!(170, 85, 0),
    rgb!(0, 0, 170),
    rgb!(170, 0, 170),
    rgb!(0, 170, 170),
    rgb!(170, 170, 170),
    rgb!(85, 85, 85),
    rgb!(255, 85, 85),
    rgb!(85, 255, 85),
    rgb!(255, 255, 85),
    rgb!(85, 85, 255),
    rgb!(255, 85, 255),
    rgb!(85, 255, 255),
    rgb!(255, 255, 255),
]);
