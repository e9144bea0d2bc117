//! Terminal color representations.
//!
//! Terminals select colors as [`AnsiColor`], [`EmbeddedRgb`], [`GrayGradient`],
//! or [`Rgb`]. The first three share the 8-bit index space and can be
//! wrapped as [`EightBitColor`]s. [`Color`] is the color as it appears in an
//! SGR escape sequence, i.e., one of the 16 ANSI colors selected by its own
//! parameter, an 8-bit index selected by `38;5;n`, or a 24-bit color selected
//! by `38;2;r;g;b`. The same logical color may appear in more than one form,
//! but colors compare equal only if they have the same form.

use crate::error::OutOfBoundsError;
use crate::style::Layer;

// ====================================================================================================================
// Ansi Color
// ====================================================================================================================

/// The 16 ANSI colors, eight normal ones followed by their bright versions.
///
/// The variants' discriminants are the 8-bit indices `0..=15`, with
/// `TryFrom<u8>` and `From<AnsiColor> for u8` converting either way. Since ANSI colors have no intrinsic color values, conversion to 24-bit
/// colors requires a [`Palette`](crate::theme::Palette).
///
/// The ANSI colors are ordered because they are ordered as indexed colors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnsiColor {
    #[default]
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl AnsiColor {
    /// Iterate over the 16 ANSI colors, black first.
    pub fn all() -> AnsiColorIterator {
        AnsiColorIterator::new()
    }

    /// Determine whether the color is one of the bright colors `8..=15`.
    pub fn is_bright(&self) -> bool {
        8 <= *self as u8
    }

    /// Get the normal color with the same hue, e.g., red for bright red.
    pub fn to_base(&self) -> AnsiColor {
        Self::from_index_unchecked(*self as u8 % 8)
    }

    /// Get the bright color with the same hue, e.g., bright red for red.
    pub fn to_bright(&self) -> AnsiColor {
        Self::from_index_unchecked(*self as u8 % 8 + 8)
    }

    /// Get the lower-case name, e.g., `"bright green"`.
    pub fn name(&self) -> &'static str {
        use AnsiColor::*;

        match self {
            Black => "black",
            Red => "red",
            Green => "green",
            Yellow => "yellow",
            Blue => "blue",
            Magenta => "magenta",
            Cyan => "cyan",
            White => "white",
            BrightBlack => "bright black",
            BrightRed => "bright red",
            BrightGreen => "bright green",
            BrightYellow => "bright yellow",
            BrightBlue => "bright blue",
            BrightMagenta => "bright magenta",
            BrightCyan => "bright cyan",
            BrightWhite => "bright white",
        }
    }

    /// Get the ANSI color for an index that is known to be in `0..=15`.
    ///
    /// Larger indices wrap around modulo 16.
    pub(crate) fn from_index_unchecked(index: u8) -> AnsiColor {
        use AnsiColor::*;

        const COLORS: [AnsiColor; 16] = [
            Black,
            Red,
            Green,
            Yellow,
            Blue,
            Magenta,
            Cyan,
            White,
            BrightBlack,
            BrightRed,
            BrightGreen,
            BrightYellow,
            BrightBlue,
            BrightMagenta,
            BrightCyan,
            BrightWhite,
        ];

        COLORS[usize::from(index % 16)]
    }
}

impl TryFrom<u8> for AnsiColor {
    type Error = OutOfBoundsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 15 {
            Ok(Self::from_index_unchecked(value))
        } else {
            Err(OutOfBoundsError::new(value, 0..=15))
        }
    }
}

impl From<AnsiColor> for u8 {
    fn from(value: AnsiColor) -> u8 {
        value as u8
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// An iterator over the ANSI colors, returned by [`AnsiColor::all`].
#[derive(Debug)]
pub struct AnsiColorIterator {
    index: u8,
}

impl AnsiColorIterator {
    fn new() -> Self {
        Self { index: 0 }
    }
}

impl Iterator for AnsiColorIterator {
    type Item = AnsiColor;

    fn next(&mut self) -> Option<Self::Item> {
        if 16 <= self.index {
            None
        } else {
            let index = self.index;
            self.index += 1;
            Some(AnsiColor::from_index_unchecked(index))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(16 - self.index);
        (remaining, Some(remaining))
    }
}

impl std::iter::ExactSizeIterator for AnsiColorIterator {}

impl std::iter::FusedIterator for AnsiColorIterator {}

// ====================================================================================================================
// The Embedded 6x6x6 RGB Cube
// ====================================================================================================================

/// A color from the 6x6x6 cube of 8-bit indices `16..=231`.
///
/// ```
/// # use colorfit::termco::{EmbeddedRgb, Rgb};
/// # use colorfit::error::OutOfBoundsError;
/// let orange = EmbeddedRgb::new(5, 2, 0)?;
/// let orange_too = EmbeddedRgb::try_from(208)?;
/// assert_eq!(orange, orange_too);
/// assert_eq!(orange.as_ref(), &[5_u8, 2, 0]);
/// assert_eq!(format!("{}", Rgb::from(orange)), "#ff8700");
/// # Ok::<(), OutOfBoundsError>(())
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EmbeddedRgb([u8; 3]);

impl EmbeddedRgb {
    /// Create a cube color from its levels `0..=5`.
    pub fn new(r: u8, g: u8, b: u8) -> Result<Self, OutOfBoundsError> {
        if 6 <= r {
            Err(OutOfBoundsError::new(r, 0..=5))
        } else if 6 <= g {
            Err(OutOfBoundsError::new(g, 0..=5))
        } else if 6 <= b {
            Err(OutOfBoundsError::new(b, 0..=5))
        } else {
            Ok(Self([r, g, b]))
        }
    }
}

impl TryFrom<u8> for EmbeddedRgb {
    type Error = OutOfBoundsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if !(16..=231).contains(&value) {
            Err(OutOfBoundsError::new(value, 16..=231))
        } else {
            let offset = value - 16;
            Ok(Self([offset / 36, offset / 6 % 6, offset % 6]))
        }
    }
}

impl AsRef<[u8; 3]> for EmbeddedRgb {
    fn as_ref(&self) -> &[u8; 3] {
        &self.0
    }
}

impl From<EmbeddedRgb> for u8 {
    fn from(value: EmbeddedRgb) -> u8 {
        let [r, g, b] = value.0;
        16 + 36 * r + 6 * g + b
    }
}

impl From<EmbeddedRgb> for Rgb {
    fn from(value: EmbeddedRgb) -> Self {
        fn convert(level: u8) -> u8 {
            if level == 0 {
                0
            } else {
                55 + 40 * level
            }
        }

        let [r, g, b] = value.0;
        Rgb::new(convert(r), convert(g), convert(b))
    }
}

// ====================================================================================================================
// Gray Gradient
// ====================================================================================================================

/// A gray from the 24 steps of 8-bit indices `232..=255`.
///
/// ```
/// # use colorfit::termco::{GrayGradient, Rgb};
/// # use colorfit::error::OutOfBoundsError;
/// let midgray = GrayGradient::try_from(243)?;
/// assert_eq!(midgray.level(), 11);
/// assert_eq!(u8::from(midgray), 243);
/// assert_eq!(Rgb::from(midgray), Rgb::new(118, 118, 118));
/// # Ok::<(), OutOfBoundsError>(())
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrayGradient(u8);

impl GrayGradient {
    /// Create a gray from its level `0..=23`.
    pub fn new(value: u8) -> Result<Self, OutOfBoundsError> {
        if value <= 23 {
            Ok(Self(value))
        } else {
            Err(OutOfBoundsError::new(value, 0..=23))
        }
    }

    /// Get the level.
    pub const fn level(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for GrayGradient {
    type Error = OutOfBoundsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 231 {
            Err(OutOfBoundsError::new(value, 232..=255))
        } else {
            Self::new(value - 232)
        }
    }
}

impl From<GrayGradient> for u8 {
    fn from(value: GrayGradient) -> u8 {
        232 + value.0
    }
}

impl From<GrayGradient> for Rgb {
    fn from(value: GrayGradient) -> Self {
        let level = 8 + 10 * value.level();
        Rgb::new(level, level, level)
    }
}

// ====================================================================================================================
// Eight-Bit Color
// ====================================================================================================================

/// An 8-bit color wrapping an [`AnsiColor`], [`EmbeddedRgb`], or
/// [`GrayGradient`].
///
/// Conversion from `u8` classifies the index into one of the three ranges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EightBitColor {
    Ansi(AnsiColor),
    Embedded(EmbeddedRgb),
    Gray(GrayGradient),
}

impl From<u8> for EightBitColor {
    fn from(value: u8) -> Self {
        match value {
            0..=15 => Self::Ansi(AnsiColor::from_index_unchecked(value)),
            16..=231 => {
                let offset = value - 16;
                Self::Embedded(EmbeddedRgb([offset / 36, offset / 6 % 6, offset % 6]))
            }
            _ => Self::Gray(GrayGradient(value - 232)),
        }
    }
}

impl From<EightBitColor> for u8 {
    fn from(value: EightBitColor) -> Self {
        match value {
            EightBitColor::Ansi(c) => c.into(),
            EightBitColor::Embedded(c) => c.into(),
            EightBitColor::Gray(c) => c.into(),
        }
    }
}

// ====================================================================================================================
// Rgb ("True Color")
// ====================================================================================================================

/// A 24-bit color with 8-bit red, green, and blue components.
///
/// ```
/// # use colorfit::termco::Rgb;
/// let sand = Rgb::new(0xee, 0xdc, 0xad);
/// assert_eq!(sand.as_ref(), &[238_u8, 220, 173]);
/// assert_eq!(sand[1], 220);
/// assert_eq!(format!("{}", sand), "#eedcad");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rgb([u8; 3]);

impl Rgb {
    /// Create a new true RGB color from its coordinates.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl AsRef<[u8; 3]> for Rgb {
    fn as_ref(&self) -> &[u8; 3] {
        &self.0
    }
}

impl std::ops::Index<usize> for Rgb {
    type Output = u8;

    /// Get the red, green, or blue component.
    ///
    /// # Panics
    ///
    /// If the index is larger than 2.
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

// ====================================================================================================================
// Color
// ====================================================================================================================

/// A terminal color as selected by an SGR escape sequence.
///
/// Equality and hashing are by representation: `Color::Ansi(AnsiColor::Red)`
/// and `Color::Indexed(1)` are different colors, even though terminals
/// usually render them the same.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// One of the 16 ANSI colors, selected by `30–37`, `90–97`, or their
    /// background equivalents.
    Ansi(AnsiColor),
    /// An index into the 256-color palette, selected by `38;5;n`.
    Indexed(u8),
    /// A 24-bit color, selected by `38;2;r;g;b`.
    Rgb(Rgb),
}

impl Color {
    /// Write this color's SGR parameters for the given layer.
    ///
    /// The parameters do not include the leading `CSI` or the trailing `m`.
    /// Since SGR has no parameters for the ANSI colors as underline colors,
    /// they are written in indexed form.
    ///
    /// ```
    /// # use colorfit::style::Layer;
    /// # use colorfit::termco::{AnsiColor, Color, Rgb};
    /// let mut params = Vec::new();
    /// Color::Ansi(AnsiColor::BrightRed).write_sgr_params(Layer::Background, &mut params)?;
    /// params.push(b';');
    /// Color::Rgb(Rgb::new(1, 2, 3)).write_sgr_params(Layer::Underline, &mut params)?;
    /// assert_eq!(params, b"101;58;2;1;2;3");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_sgr_params<W: std::io::Write>(
        &self,
        layer: Layer,
        out: &mut W,
    ) -> std::io::Result<()> {
        match *self {
            Self::Ansi(c) if layer != Layer::Underline => {
                let base = if c.is_bright() { 90 } else { 30 } + layer.offset();
                write!(out, "{}", base + c.to_base() as u8)
            }
            Self::Ansi(c) => write!(out, "{};5;{}", 38 + layer.offset(), u8::from(c)),
            Self::Indexed(c) => write!(out, "{};5;{}", 38 + layer.offset(), c),
            Self::Rgb(c) => write!(out, "{};2;{};{};{}", 38 + layer.offset(), c[0], c[1], c[2]),
        }
    }
}

impl From<AnsiColor> for Color {
    fn from(value: AnsiColor) -> Self {
        Self::Ansi(value)
    }
}

impl From<EmbeddedRgb> for Color {
    fn from(value: EmbeddedRgb) -> Self {
        Self::Indexed(value.into())
    }
}

impl From<GrayGradient> for Color {
    fn from(value: GrayGradient) -> Self {
        Self::Indexed(value.into())
    }
}

impl From<EightBitColor> for Color {
    fn from(value: EightBitColor) -> Self {
        Self::Indexed(value.into())
    }
}

impl From<u8> for Color {
    fn from(value: u8) -> Self {
        Self::Indexed(value)
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Self::Rgb(value)
    }
}

impl From<[u8; 3]> for Color {
    fn from(value: [u8; 3]) -> Self {
        Self::Rgb(Rgb(value))
    }
}

#[cfg(test)]
mod test {
    use super::{AnsiColor, Color, EightBitColor, EmbeddedRgb, GrayGradient, OutOfBoundsError, Rgb};
    use crate::style::Layer;

    #[test]
    fn test_conversion() -> Result<(), OutOfBoundsError> {
        let magenta = AnsiColor::Magenta;
        assert_eq!(magenta as u8, 5);
        assert_eq!(magenta.to_bright(), AnsiColor::BrightMagenta);
        assert_eq!(AnsiColor::BrightCyan.to_base(), AnsiColor::Cyan);
        assert_eq!(AnsiColor::BrightGreen.name(), "bright green");
        assert!(!magenta.is_bright());

        let green = EmbeddedRgb::new(0, 4, 0)?;
        assert_eq!(green.as_ref(), &[0, 4, 0]);
        assert_eq!(u8::from(green), 40);
        assert_eq!(Rgb::from(green), Rgb::new(0, 215, 0));

        let gray = GrayGradient::new(12)?;
        assert_eq!(gray.level(), 12);
        assert_eq!(Rgb::from(gray), Rgb::new(128, 128, 128));

        assert_eq!(EightBitColor::from(5), EightBitColor::Ansi(magenta));
        assert_eq!(EightBitColor::from(40), EightBitColor::Embedded(green));
        assert_eq!(EightBitColor::from(244), EightBitColor::Gray(gray));
        assert_eq!(Color::from(EightBitColor::from(244)), Color::Indexed(244));
        assert_ne!(Color::from(AnsiColor::Red), Color::Indexed(1));
        Ok(())
    }

    #[test]
    fn test_limits() -> Result<(), OutOfBoundsError> {
        let black_ansi = AnsiColor::try_from(0)?;
        assert_eq!(black_ansi, AnsiColor::Black);
        assert_eq!(u8::from(black_ansi), 0);
        let white_ansi = AnsiColor::try_from(15)?;
        assert_eq!(white_ansi, AnsiColor::BrightWhite);
        assert_eq!(u8::from(white_ansi), 15);
        assert!(AnsiColor::try_from(16).is_err());

        let black_rgb = EmbeddedRgb::try_from(16)?;
        assert_eq!(*black_rgb.as_ref(), [0_u8, 0_u8, 0_u8]);
        let white_rgb = EmbeddedRgb::try_from(231)?;
        assert_eq!(*white_rgb.as_ref(), [5_u8, 5_u8, 5_u8]);
        assert_eq!(Rgb::from(white_rgb), Rgb::new(255, 255, 255));
        assert!(EmbeddedRgb::try_from(232).is_err());
        assert!(EmbeddedRgb::new(6, 0, 0).is_err());

        let black_gray = GrayGradient::try_from(232)?;
        assert_eq!(black_gray.level(), 0);
        let white_gray = GrayGradient::try_from(255)?;
        assert_eq!(white_gray.level(), 23);
        assert_eq!(Rgb::from(white_gray), Rgb::new(238, 238, 238));
        assert!(GrayGradient::try_from(231).is_err());

        assert_eq!(AnsiColor::all().len(), 16);
        assert_eq!(AnsiColor::all().last(), Some(AnsiColor::BrightWhite));
        Ok(())
    }

    #[test]
    fn test_sgr_params() -> std::io::Result<()> {
        fn params(color: Color, layer: Layer) -> std::io::Result<String> {
            let mut buffer = Vec::new();
            color.write_sgr_params(layer, &mut buffer)?;
            Ok(String::from_utf8_lossy(&buffer).into_owned())
        }

        assert_eq!(params(Color::Ansi(AnsiColor::Red), Layer::Foreground)?, "31");
        assert_eq!(params(Color::Ansi(AnsiColor::BrightRed), Layer::Foreground)?, "91");
        assert_eq!(params(Color::Ansi(AnsiColor::Blue), Layer::Background)?, "44");
        assert_eq!(params(Color::Ansi(AnsiColor::BrightWhite), Layer::Background)?, "107");
        assert_eq!(params(Color::Ansi(AnsiColor::Green), Layer::Underline)?, "58;5;2");
        assert_eq!(params(Color::Indexed(208), Layer::Foreground)?, "38;5;208");
        assert_eq!(params(Color::Indexed(17), Layer::Background)?, "48;5;17");
        assert_eq!(params(Color::Rgb(Rgb::new(255, 133, 55)), Layer::Foreground)?, "38;2;255;133;55");
        Ok(())
    }
}
