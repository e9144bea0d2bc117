use std::io::IsTerminal;
use std::str::FromStr;

use crate::env::{resolve, Env};
use crate::error::ParseRankError;
use crate::termco::Color;

/// The color capability of a terminal.
///
/// Ranks are totally ordered from least to most capable, so comparisons such
/// as `rank < Rank::Basic16` determine whether a terminal needs colors
/// converted:
///
/// ```
/// # use colorfit::Rank;
/// assert!(Rank::Plain < Rank::Monochrome);
/// assert!(Rank::Extended256 < Rank::TrueColor);
/// assert_eq!(Rank::Basic16.max(Rank::Monochrome), Rank::Basic16);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    /// Plain text, no escape sequences at all
    Plain,
    /// Escape sequences but no colors
    Monochrome,
    /// The 16 ANSI colors only
    Basic16,
    /// 8-bit indexed colors including the ANSI colors
    Extended256,
    /// 24-bit RGB colors
    TrueColor,
}

impl Rank {
    /// Determine the rank for terminal output based on the process
    /// environment.
    ///
    /// See [`resolve`] for the heuristics.
    pub fn from_environment(has_tty: bool) -> Self {
        resolve(&Env::default(), has_tty)
    }

    /// Determine the rank for output to the given stream based on the process
    /// environment.
    pub fn for_stream(stream: &impl IsTerminal) -> Self {
        Self::from_environment(stream.is_terminal())
    }

    /// Determine whether this rank suffices for rendering the color as is,
    /// without conversion.
    ///
    /// ```
    /// # use colorfit::Rank;
    /// # use colorfit::termco::{AnsiColor, Color, Rgb};
    /// assert!(Rank::Basic16.covers(&Color::Ansi(AnsiColor::Red)));
    /// assert!(!Rank::Basic16.covers(&Color::Indexed(1)));
    /// assert!(Rank::Extended256.covers(&Color::Indexed(208)));
    /// assert!(!Rank::Extended256.covers(&Color::Rgb(Rgb::new(1, 2, 3))));
    /// ```
    pub fn covers(&self, color: &Color) -> bool {
        Rank::from(color) <= *self
    }

    /// Get this rank's name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Monochrome => "mono",
            Self::Basic16 => "16",
            Self::Extended256 => "256",
            Self::TrueColor => "truecolor",
        }
    }
}

impl From<&Color> for Rank {
    /// Determine the minimum rank required for rendering the color.
    fn from(value: &Color) -> Self {
        match value {
            Color::Ansi(_) => Self::Basic16,
            Color::Indexed(_) => Self::Extended256,
            Color::Rgb(_) => Self::TrueColor,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rank {
    type Err = ParseRankError;

    /// Parse a rank from its name or a common alias, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "truecolor" | "24bit" | "24-bit" | "rgb" => Ok(Self::TrueColor),
            "256" | "ansi256" | "8bit" | "8-bit" => Ok(Self::Extended256),
            "16" | "ansi" | "basic" => Ok(Self::Basic16),
            "mono" | "monochrome" | "ascii" | "nocolor" => Ok(Self::Monochrome),
            "plain" | "none" | "notty" => Ok(Self::Plain),
            _ => Err(ParseRankError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Rank;
    use crate::termco::{AnsiColor, Color, Rgb};

    #[test]
    fn test_order() {
        let ranks = [
            Rank::Plain,
            Rank::Monochrome,
            Rank::Basic16,
            Rank::Extended256,
            Rank::TrueColor,
        ];

        for window in ranks.windows(2) {
            assert!(window[0] < window[1]);
        }
        assert!(Rank::Monochrome < Rank::Basic16);
        assert!(!(Rank::Extended256 < Rank::Basic16));
    }

    #[test]
    fn test_covers() {
        let ansi = Color::Ansi(AnsiColor::BrightBlue);
        let indexed = Color::Indexed(17);
        let rgb = Color::Rgb(Rgb::new(0, 0, 95));

        assert!(!Rank::Monochrome.covers(&ansi));
        assert!(Rank::Basic16.covers(&ansi));
        assert!(!Rank::Basic16.covers(&indexed));
        assert!(Rank::Extended256.covers(&indexed));
        assert!(!Rank::Extended256.covers(&rgb));
        assert!(Rank::TrueColor.covers(&rgb));
    }

    #[test]
    fn test_names() -> Result<(), crate::error::ParseRankError> {
        for rank in [
            Rank::Plain,
            Rank::Monochrome,
            Rank::Basic16,
            Rank::Extended256,
            Rank::TrueColor,
        ] {
            assert_eq!(rank.to_string().parse::<Rank>()?, rank);
        }

        assert_eq!("24bit".parse::<Rank>()?, Rank::TrueColor);
        assert_eq!("ANSI256".parse::<Rank>()?, Rank::Extended256);
        assert_eq!(" ansi ".parse::<Rank>()?, Rank::Basic16);
        assert_eq!("ascii".parse::<Rank>()?, Rank::Monochrome);
        assert_eq!("none".parse::<Rank>()?, Rank::Plain);

        let error = "sepia".parse::<Rank>().unwrap_err();
        assert!(error.to_string().starts_with("\"sepia\""));
        Ok(())
    }
}
