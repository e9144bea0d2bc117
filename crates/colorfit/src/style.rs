//! Encoding select graphic rendition (SGR) escape sequences.
//!
//! [`SgrBuilder`] collects the parameters of one SGR escape sequence, i.e.,
//! the attributes as raw parameters and at most one [`Paint`] per [`Layer`],
//! and then writes out the corresponding escape sequence.

use std::io::Write;

use crate::termco::Color;

/// The targeted display layer: Foreground, background, or underline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// The foreground or text layer.
    Foreground,
    /// The background layer.
    Background,
    /// The underline decoration.
    Underline,
}

impl Layer {
    /// All layers, in the order their colors appear in SGR escape sequences
    /// written by this crate.
    pub const ALL: [Layer; 3] = [Self::Foreground, Self::Background, Self::Underline];

    /// Determine the offset for this layer.
    ///
    /// The offset is added to the SGR parameter values for foreground colors
    /// and therefore zero for [`Layer::Foreground`].
    pub fn offset(&self) -> u8 {
        match self {
            Self::Foreground => 0,
            Self::Background => 10,
            Self::Underline => 20,
        }
    }

    /// Determine the layer for the first parameter of an extended color,
    /// i.e., `38`, `48`, or `58`.
    pub fn for_extended_color(param: u32) -> Option<Self> {
        match param {
            38 => Some(Self::Foreground),
            48 => Some(Self::Background),
            58 => Some(Self::Underline),
            _ => None,
        }
    }
}

/// The paint for a layer: A color or the default.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Paint {
    /// Paint the layer with the color.
    Set(Color),
    /// Restore the layer's default color.
    Reset,
}

impl Paint {
    /// Write this paint's SGR parameters for the given layer.
    pub fn write_sgr_params<W: Write>(&self, layer: Layer, out: &mut W) -> std::io::Result<()> {
        match *self {
            Self::Set(ref color) => color.write_sgr_params(layer, out),
            Self::Reset => write!(out, "{}", 39 + layer.offset()),
        }
    }
}

// ================================================================================================

/// A builder for one SGR escape sequence.
///
/// The builder accumulates attributes in order and remembers the last paint
/// for each layer. When writing the escape sequence, it emits the attributes
/// first and then the paints for the foreground, background, and underline.
/// A builder without attributes and paints writes `ESC [ m`.
///
/// ```
/// # use colorfit::style::{Layer, Paint, SgrBuilder};
/// # use colorfit::termco::{AnsiColor, Color};
/// let mut builder = SgrBuilder::new();
/// assert_eq!(builder.to_bytes(), b"\x1b[m");
///
/// builder
///     .set(Layer::Background, Paint::Set(Color::Indexed(17)))
///     .push_attribute(b"1")
///     .set(Layer::Foreground, Paint::Set(Color::Ansi(AnsiColor::Red)))
///     .push_attribute(b"4:3")
///     .set(Layer::Foreground, Paint::Set(Color::Ansi(AnsiColor::BrightRed)));
/// assert_eq!(builder.to_bytes(), b"\x1b[1;4:3;91;48;5;17m");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SgrBuilder {
    /// The attributes, separated by semicolons.
    attributes: Vec<u8>,
    /// The number of attributes.
    attribute_count: usize,
    /// The paints indexed by layer.
    paints: [Option<Paint>; 3],
}

impl SgrBuilder {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear this builder for reuse.
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.attribute_count = 0;
        self.paints = [None; 3];
    }

    /// Determine whether this builder has neither attributes nor paints.
    pub fn is_empty(&self) -> bool {
        self.attribute_count == 0 && self.paints.iter().all(Option::is_none)
    }

    /// Add an attribute.
    ///
    /// The attribute is a raw parameter and may be empty or contain
    /// colon-separated sub-parameters. It is written out as is.
    pub fn push_attribute(&mut self, raw: &[u8]) -> &mut Self {
        if 0 < self.attribute_count {
            self.attributes.push(b';');
        }
        self.attributes.extend_from_slice(raw);
        self.attribute_count += 1;
        self
    }

    /// Set the layer's paint, replacing any previous paint.
    pub fn set(&mut self, layer: Layer, paint: Paint) -> &mut Self {
        self.paints[layer as usize] = Some(paint);
        self
    }

    /// Get the layer's paint.
    pub fn paint(&self, layer: Layer) -> Option<Paint> {
        self.paints[layer as usize]
    }

    /// Write the SGR escape sequence.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(b"\x1b[")?;
        out.write_all(&self.attributes)?;

        let mut first = self.attribute_count == 0;
        for layer in Layer::ALL {
            if let Some(paint) = self.paint(layer) {
                if !first {
                    out.write_all(b";")?;
                }
                first = false;
                paint.write_sgr_params(layer, out)?;
            }
        }

        out.write_all(b"m")
    }

    /// Get the bytes of the SGR escape sequence.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.attributes.len() + 32);
        // Writing to a vector cannot fail.
        let _ = self.write_to(&mut buffer);
        buffer
    }
}
