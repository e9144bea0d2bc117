//! Helper module for decoding control sequence parameters.
//!
//! A control sequence's payload comprises an optional private marker, the
//! parameters, the intermediate bytes, and the final byte. Parameters are
//! separated by semicolons. Each parameter may further be divided into
//! sub-parameters by colons, as standardized by ITU T.416 for colors, e.g.,
//! `38:2::255:133:55`.
//!
//! # Example
//!
//! ```
//! # use ansiseq::csi::Csi;
//! let csi = Csi::parse(b"1;38:5:208m").unwrap();
//! assert!(csi.is_sgr());
//!
//! let params: Vec<_> = csi.params().collect();
//! assert_eq!(params.len(), 2);
//! assert_eq!(params[0].value(), Some(1));
//! assert_eq!(params[1].first(), Some(38));
//!
//! let selector: Vec<_> = params[1].sub_params().map(|p| p.value()).collect();
//! assert_eq!(selector, vec![Some(38), Some(5), Some(208)]);
//! ```

use crate::util::{is_colon, is_semicolon, parse_decimal};

/// A parsed control sequence payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Csi<'t> {
    marker: Option<u8>,
    params: &'t [u8],
    intermediates: &'t [u8],
    final_byte: u8,
}

impl<'t> Csi<'t> {
    /// Parse the payload of a control sequence, i.e., the bytes after the
    /// `ESC [` up to and including the final byte.
    ///
    /// This method returns `None` if the payload is empty or the last byte is
    /// not a valid final byte.
    pub fn parse(payload: &'t [u8]) -> Option<Self> {
        let (&final_byte, rest) = payload.split_last()?;
        if !(0x40..=0x7e).contains(&final_byte) {
            return None;
        }

        let split = rest
            .iter()
            .position(|byte| (0x20..=0x2f).contains(byte))
            .unwrap_or(rest.len());
        let (params, intermediates) = rest.split_at(split);

        let (marker, params) = match params.split_first() {
            Some((&marker, params)) if (0x3c..=0x3f).contains(&marker) => (Some(marker), params),
            _ => (None, params),
        };

        Some(Self {
            marker,
            params,
            intermediates,
            final_byte,
        })
    }

    /// Get the private marker, which is one of `<`, `=`, `>`, or `?`.
    pub fn marker(&self) -> Option<u8> {
        self.marker
    }

    /// Get the parameter bytes without private marker.
    pub fn raw_params(&self) -> &'t [u8] {
        self.params
    }

    /// Get the intermediate bytes.
    pub fn intermediates(&self) -> &'t [u8] {
        self.intermediates
    }

    /// Get the final byte.
    pub fn final_byte(&self) -> u8 {
        self.final_byte
    }

    /// Determine whether this sequence selects graphic rendition.
    ///
    /// SGR sequences have `m` as final byte and neither a private marker nor
    /// intermediate bytes.
    pub fn is_sgr(&self) -> bool {
        self.final_byte == b'm' && self.marker.is_none() && self.intermediates.is_empty()
    }

    /// Get an iterator over the parameters.
    ///
    /// A sequence without parameter bytes has no parameters. Otherwise, there
    /// is one more parameter than there are semicolons, and parameters may be
    /// empty.
    pub fn params(&self) -> Params<'t> {
        Params::new(self.params, is_semicolon)
    }
}

// ------------------------------------------------------------------------------------------------

/// An iterator over parameters or sub-parameters.
#[derive(Clone, Debug)]
pub struct Params<'t> {
    inner: Option<core::slice::Split<'t, u8, fn(&u8) -> bool>>,
}

impl<'t> Params<'t> {
    fn new(bytes: &'t [u8], separator: fn(&u8) -> bool) -> Self {
        let inner = if bytes.is_empty() {
            None
        } else {
            Some(bytes.split(separator))
        };
        Self { inner }
    }
}

impl<'t> Iterator for Params<'t> {
    type Item = Param<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(Param)
    }
}

/// A single parameter or sub-parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param<'t>(&'t [u8]);

impl<'t> Param<'t> {
    /// Get the parameter's bytes.
    pub fn raw(&self) -> &'t [u8] {
        self.0
    }

    /// Determine whether the parameter is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Determine whether the parameter has colon-separated sub-parameters.
    pub fn has_sub_params(&self) -> bool {
        self.0.iter().any(is_colon)
    }

    /// Get the parameter's numeric value.
    ///
    /// This method returns `None` if the parameter is empty, has
    /// sub-parameters, or does not fit into a `u32`.
    pub fn value(&self) -> Option<u32> {
        parse_decimal(self.0)
    }

    /// Get the numeric value of the first sub-parameter.
    ///
    /// For a parameter without colons, that is the parameter's value.
    pub fn first(&self) -> Option<u32> {
        self.sub_params().next().and_then(|param| param.value())
    }

    /// Get an iterator over the colon-separated sub-parameters.
    pub fn sub_params(&self) -> Params<'t> {
        Params::new(self.0, is_colon)
    }
}
