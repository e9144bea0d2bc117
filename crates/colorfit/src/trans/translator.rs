use super::ConversionCache;
use crate::core::{delta_e_ok, find_closest, rgb_to_oklrab};
use crate::termco::{AnsiColor, Color, EightBitColor, Rgb};
use crate::theme::Palette;
use crate::{Float, Rank};

/// A color translator.
///
/// Instances of this struct convert terminal colors to the colors a terminal
/// with lesser [`Rank`] can render. They also maintain the state for doing so
/// efficiently, i.e., the palette's coordinates in Oklrab and a
/// [`ConversionCache`] with previous results.
///
/// All methods take `&self`, and a translator is `Send` and `Sync`. To share
/// one translator and its cache between several
/// [`Transcoder`](crate::Transcoder)s, wrap it in an
/// [`Arc`](std::sync::Arc).
pub struct Translator {
    /// The colors assumed for the 16 ANSI colors.
    palette: Palette,
    /// The ANSI color coordinates for matching to closest color.
    ansi: [[Float; 3]; 16],
    /// The coordinates of 8-bit colors 16 through 255 for matching to closest
    /// color.
    eight_bit: [[Float; 3]; 240],
    /// The previous conversions.
    cache: ConversionCache,
}

/// Resolve the 8-bit color to RGB.
fn index_to_rgb(palette: &Palette, index: u8) -> Rgb {
    match EightBitColor::from(index) {
        EightBitColor::Ansi(color) => palette[color],
        EightBitColor::Embedded(color) => color.into(),
        EightBitColor::Gray(color) => color.into(),
    }
}

impl Translator {
    /// Create a new translator for the given palette.
    pub fn new(palette: Palette) -> Self {
        let mut ansi: [[Float; 3]; 16] = [[0.0; 3]; 16];
        for color in AnsiColor::all() {
            ansi[color as usize] = rgb_to_oklrab(palette[color].as_ref());
        }

        let mut eight_bit: [[Float; 3]; 240] = [[0.0; 3]; 240];
        for (coordinates, index) in eight_bit.iter_mut().zip(16..=255_u8) {
            *coordinates = rgb_to_oklrab(index_to_rgb(&palette, index).as_ref());
        }

        Self {
            palette,
            ansi,
            eight_bit,
            cache: ConversionCache::new(),
        }
    }

    /// Access the palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Access the conversion cache.
    pub fn cache(&self) -> &ConversionCache {
        &self.cache
    }

    /// Resolve any terminal color to RGB.
    ///
    /// ANSI colors and 8-bit colors `0..=15` resolve through the palette.
    ///
    /// ```
    /// # use colorfit::Translator;
    /// # use colorfit::termco::{AnsiColor, Color, Rgb};
    /// let translator = Translator::default();
    /// assert_eq!(translator.resolve(&Color::Ansi(AnsiColor::Red)), Rgb::new(128, 0, 0));
    /// assert_eq!(translator.resolve(&Color::Indexed(9)), Rgb::new(255, 0, 0));
    /// assert_eq!(translator.resolve(&Color::Indexed(208)), Rgb::new(255, 135, 0));
    /// assert_eq!(translator.resolve(&Color::Indexed(232)), Rgb::new(8, 8, 8));
    /// ```
    pub fn resolve(&self, color: &Color) -> Rgb {
        match *color {
            Color::Ansi(color) => self.palette[color],
            Color::Indexed(index) => index_to_rgb(&self.palette, index),
            Color::Rgb(color) => color,
        }
    }

    /// Find the ANSI color that comes closest to the given color.
    ///
    /// This method compares the color to every palette color in Oklrab and
    /// picks the one with the smallest Euclidean distance. Ties go to the
    /// ANSI color with the smaller index.
    ///
    /// ```
    /// # use colorfit::Translator;
    /// # use colorfit::termco::{AnsiColor, Rgb};
    /// let translator = Translator::default();
    /// let orange = Rgb::new(255, 133, 55);
    /// assert_eq!(translator.to_closest_ansi(&orange), AnsiColor::BrightRed);
    /// ```
    pub fn to_closest_ansi(&self, color: &Rgb) -> AnsiColor {
        let coordinates = rgb_to_oklrab(color.as_ref());
        find_closest(&coordinates, &self.ansi, delta_e_ok)
            .map_or(AnsiColor::Black, |index| {
                AnsiColor::from_index_unchecked(index as u8)
            })
    }

    /// Find the 8-bit color that comes closest to the given color.
    ///
    /// This method compares the color to the embedded RGB cube and the gray
    /// gradient, i.e., 8-bit colors `16..=255`, in Oklrab and picks the one
    /// with the smallest Euclidean distance. It does not consider the ANSI
    /// colors because their values depend on the terminal. Ties go to the
    /// color with the smaller index.
    ///
    /// Tools that measure distance differently, e.g., in HSLuv, may pick a
    /// different but similar color. For instance, this method maps `#ff8537`
    /// to 208, i.e., `#ff8700`, whereas HSLuv-based tools pick 209, i.e.,
    /// `#ff875f`.
    ///
    /// ```
    /// # use colorfit::Translator;
    /// # use colorfit::termco::Rgb;
    /// let translator = Translator::default();
    /// assert_eq!(translator.to_closest_8bit(&Rgb::new(255, 133, 55)), 208);
    /// assert_eq!(translator.to_closest_8bit(&Rgb::new(255, 255, 255)), 231);
    /// assert_eq!(translator.to_closest_8bit(&Rgb::new(238, 238, 238)), 255);
    /// assert_eq!(translator.to_closest_8bit(&Rgb::new(255, 0, 0)), 196);
    /// ```
    pub fn to_closest_8bit(&self, color: &Rgb) -> u8 {
        let coordinates = rgb_to_oklrab(color.as_ref());
        find_closest(&coordinates, &self.eight_bit, delta_e_ok)
            .map_or(16, |index| index as u8 + 16)
    }

    /// Convert the color to one a terminal with the given rank can render.
    ///
    /// For [`Rank::Extended256`], ANSI and 8-bit colors remain unchanged,
    /// whereas RGB colors are converted to the closest 8-bit color. For
    /// [`Rank::Basic16`], ANSI colors remain unchanged, 8-bit colors
    /// `0..=15` become the corresponding ANSI colors, and all other colors
    /// are converted to the closest ANSI color. For all other ranks, this
    /// method returns the color as is: [`Rank::TrueColor`] renders all
    /// colors, while [`Rank::Monochrome`] and [`Rank::Plain`] render none.
    ///
    /// Conversions to [`Rank::Extended256`] and [`Rank::Basic16`] go
    /// through this translator's cache.
    ///
    /// ```
    /// # use colorfit::{Rank, Translator};
    /// # use colorfit::termco::{AnsiColor, Color, Rgb};
    /// let translator = Translator::default();
    /// let orange = Color::Rgb(Rgb::new(255, 133, 55));
    /// assert_eq!(translator.convert(Rank::TrueColor, &orange), orange);
    /// assert_eq!(translator.convert(Rank::Extended256, &orange), Color::Indexed(208));
    /// assert_eq!(
    ///     translator.convert(Rank::Basic16, &orange),
    ///     Color::Ansi(AnsiColor::BrightRed)
    /// );
    /// ```
    pub fn convert(&self, rank: Rank, color: &Color) -> Color {
        if !matches!(rank, Rank::Extended256 | Rank::Basic16) {
            return *color;
        }

        if let Some(result) = self.cache.lookup(rank, color) {
            return result;
        }

        let result = self.quantize(rank, color);
        self.cache.store(rank, *color, result);
        result
    }

    fn quantize(&self, rank: Rank, color: &Color) -> Color {
        match (rank, *color) {
            (_, Color::Ansi(_)) | (Rank::Extended256, Color::Indexed(_)) => *color,
            (Rank::Extended256, Color::Rgb(rgb)) => Color::Indexed(self.to_closest_8bit(&rgb)),
            (_, Color::Indexed(index)) if index < 16 => {
                Color::Ansi(AnsiColor::from_index_unchecked(index))
            }
            _ => Color::Ansi(self.to_closest_ansi(&self.resolve(color))),
        }
    }
}

impl Default for Translator {
    /// Create a new translator for xterm's default colors.
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("palette", &self.palette)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
