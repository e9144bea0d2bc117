//! # Colorfit
//!
//! Colorfit adapts the colors in a stream of styled terminal output to what
//! the terminal can actually display.
//!
//! Its main abstractions are:
//!
//!   * [`Rank`] captures a terminal's **color capability**, from plain text
//!     without any escape sequences to 24-bit colors. The [`env`] module
//!     resolves the rank from the process environment.
//!   * The [`termco`] module offers the **terminal-specific color formats**
//!     [`AnsiColor`](termco::AnsiColor), [`EmbeddedRgb`](termco::EmbeddedRgb),
//!     [`GrayGradient`](termco::GrayGradient), and [`Rgb`](termco::Rgb), as
//!     well as the wrapper [`Color`](termco::Color). The [`theme`] module
//!     supplies the concrete RGB values of the 16 ANSI colors.
//!   * [`Translator`] **quantizes colors** down to a lower rank. It searches
//!     for the perceptually closest color in the Oklrab color space and
//!     memoizes results in a thread-safe
//!     [`ConversionCache`](trans::ConversionCache).
//!   * [`Transcoder`] is an [`std::io::Write`] adapter that **rewrites select
//!     graphic rendition** escape sequences on the fly, passing all other
//!     output through. It relies on the resumable scanner from the `ansiseq`
//!     crate, so escape sequences may be split across writes.
//!
//!
//! ## Example
//!
//! ```
//! # use colorfit::{Rank, Transcoder};
//! # use std::io::Write;
//! let mut transcoder = Transcoder::new(Vec::new(), Rank::Basic16);
//! transcoder.write_all(b"\x1b[1;38;2;255;0;0mhot\x1b[0m")?;
//! let output = transcoder.finish()?;
//! assert_eq!(&output, b"\x1b[1;91mhot\x1b[0m");
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! Color conversion and environment inspection log through `tracing`, which
//! is silent unless the application installs a subscriber.

/// The floating point type used for color coordinates.
pub type Float = f64;

mod core;
pub mod env;
pub mod error;
mod rank;
pub mod style;
pub mod termco;
pub mod theme;
pub mod trans;
mod transcode;

pub use rank::Rank;
pub use trans::Translator;
pub use transcode::Transcoder;
