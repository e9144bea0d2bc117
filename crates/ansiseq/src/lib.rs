//! # ANSI Sequences
//!
//! This crate provides a **resumable scanner for text and escape sequences**
//! in byte streams written to terminals. Its main abstractions are:
//!
//!   * [`Scanner`] implements the state machine for recognizing escape
//!     sequences. It is fed one chunk of bytes at a time and carries
//!     incomplete escape sequences from one chunk to the next.
//!   * [`Token`] is the result of scanning: [`Token::Text`],
//!     [`Token::Control`], [`Token::Sequence`], or [`Token::Malformed`].
//!     Concatenating the bytes of all tokens reproduces the input.
//!   * [`Sequence`] combines a [`Control`] with the sequence's bytes. For
//!     control sequences, [`Sequence::csi`] exposes the parameters through
//!     the [`csi`] module.
//!   * The [`opt`] module has the scanner's options.
//!
//! The crate logs unusual input with the [`tracing`] facade but never
//! installs a subscriber.
//!
//!
//! # Example
//!
//! ```
//! # use ansiseq::{Scanner, Token};
//! let mut scanner = Scanner::new();
//! let mut input = b"\x1b[1;38;5;208mhot\x1b[m".as_slice();
//! let mut sgr_count = 0;
//!
//! while !input.is_empty() {
//!     let (consumed, token) = scanner.scan(input);
//!     if let Some(Token::Sequence(sequence)) = token {
//!         if sequence.csi().is_some_and(|csi| csi.is_sgr()) {
//!             sgr_count += 1;
//!         }
//!     }
//!     input = &input[consumed..];
//! }
//!
//! assert_eq!(sgr_count, 2);
//! ```

mod api;
pub mod csi;
pub mod opt;
mod scan;
pub mod util;

pub use api::{Control, Sequence, Token};
pub use scan::Scanner;
