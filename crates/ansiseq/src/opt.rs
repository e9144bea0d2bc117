//! Scanner options.
//!
//! There is one option so far, the length at which an escape sequence is
//! considered pathological:
//!
//! ```
//! # use ansiseq::opt::Options;
//! let options = Options::builder()
//!     .pathological_size(1_024)
//!     .build();
//!
//! assert_eq!(options.pathological_size(), 1_024);
//! assert_eq!(Options::default().pathological_size(), 4_096);
//! ```

/// The smallest permissible pathological size.
const MIN_PATHOLOGICAL_SIZE: usize = 16;

/// The options for a [`Scanner`](crate::Scanner).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pathological_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pathological_size: 4_096,
        }
    }
}

impl Options {
    /// Create a new builder, starting with the default options.
    pub fn builder() -> OptionBuilder {
        OptionBuilder(Self::default())
    }

    /// Get the length at which escape sequences are treated as malformed.
    pub fn pathological_size(&self) -> usize {
        self.pathological_size
    }
}

/// A builder of [`Options`].
#[derive(Debug)]
pub struct OptionBuilder(Options);

impl OptionBuilder {
    /// Set the pathological size.
    ///
    /// An escape sequence reaching this length is reported as malformed and
    /// the scanner returns to its ground state. Sizes below 16 bytes are
    /// raised to 16.
    pub fn pathological_size(&mut self, size: usize) -> &mut Self {
        self.0.pathological_size = size.max(MIN_PATHOLOGICAL_SIZE);
        self
    }

    /// Build the options.
    pub fn build(&self) -> Options {
        self.0.clone()
    }
}
