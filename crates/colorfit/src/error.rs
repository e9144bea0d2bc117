//! Utility module with colorfit's errors.

/// An out-of-bounds error.
///
/// This error indicates an index value that is out of bounds for some range.
/// The ranges used by this crate include:
///
///   * `0..=5` for coordinates of [`EmbeddedRgb`](crate::termco::EmbeddedRgb);
///   * `0..=15` for index values of [`AnsiColor`](crate::termco::AnsiColor);
///   * `0..=23` for the gray levels of [`GrayGradient`](crate::termco::GrayGradient);
///   * `16..=231` for index values of [`EmbeddedRgb`](crate::termco::EmbeddedRgb);
///   * `232..=255` for index values of [`GrayGradient`](crate::termco::GrayGradient).
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutOfBoundsError {
    pub value: usize,
    pub expected: std::ops::RangeInclusive<usize>,
}

impl OutOfBoundsError {
    /// Create a new out-of-bounds error.
    pub fn new<V: Into<usize>>(value: V, expected: std::ops::RangeInclusive<usize>) -> Self {
        Self {
            value: value.into(),
            expected,
        }
    }
}

impl std::fmt::Display for OutOfBoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} does not fit into range {}..={}",
            self.value,
            self.expected.start(),
            self.expected.end()
        )
    }
}

impl std::error::Error for OutOfBoundsError {}

// ====================================================================================================================

/// An error parsing a [`Rank`](crate::Rank) from its name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseRankError(pub(crate) String);

impl std::fmt::Display for ParseRankError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" should be one of truecolor, 256, 16, mono, or plain but is not",
            self.0
        )
    }
}

impl std::error::Error for ParseRankError {}

// ====================================================================================================================

/// An error writing transcoded output to the sink.
///
/// A transcoder returns this error only if it did not consume its input, so
/// the caller may retry with the same input. [`WriteError::written`] counts
/// bytes of output, not input: the bytes of earlier, retained output the sink
/// accepted during the failed write. The original I/O error is the source.
#[derive(Debug)]
pub struct WriteError {
    written: usize,
    source: std::io::Error,
}

impl WriteError {
    /// Create a new write error.
    pub fn new(written: usize, source: std::io::Error) -> Self {
        Self { written, source }
    }

    /// Get the number of output bytes the sink accepted before the error.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Get the kind of the underlying I/O error.
    pub fn kind(&self) -> std::io::ErrorKind {
        self.source.kind()
    }

    /// Unwrap the underlying I/O error.
    pub fn into_inner(self) -> std::io::Error {
        self.source
    }
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not write transcoded output after {} bytes: {}",
            self.written, self.source
        )
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<WriteError> for std::io::Error {
    fn from(value: WriteError) -> Self {
        std::io::Error::new(value.kind(), value)
    }
}
