use crate::csi::Csi;
use crate::util::nicely_str;

/// Control codes that start escape sequences.
///
/// Only the 7-bit forms, i.e., `ESC` followed by a byte, are recognized, since
/// the 8-bit C1 forms collide with UTF-8 continuation bytes. The discriminants
/// nonetheless are the C1 codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// Escape (C0) on its own, followed by optional intermediates and a final
    /// byte.
    ESC = 0x1b,
    /// Device control string: `ESC P`
    DCS = 0x90,
    /// Start of String: `ESC X`
    SOS = 0x98,
    /// Single Shift 2: `ESC N`
    SS2 = 0x8e,
    /// Single Shift 3: `ESC O`
    SS3 = 0x8f,
    /// Control Sequence Introducer: `ESC [`
    CSI = 0x9b,
    /// Operating System Command: `ESC ]`
    OSC = 0x9d,
    /// Privacy Message: `ESC ^`
    PM = 0x9e,
    /// Application Program Command: `ESC _`
    APC = 0x9f,
}

impl Control {
    /// Get the number of bytes of this control's 7-bit introducer.
    pub const fn introducer_len(&self) -> usize {
        match self {
            Self::ESC => 1,
            _ => 2,
        }
    }

    /// Determine whether this control starts a string terminated by `BEL` or
    /// `ST`.
    pub const fn is_string(&self) -> bool {
        matches!(
            self,
            Self::DCS | Self::SOS | Self::OSC | Self::PM | Self::APC
        )
    }
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::Control::*;

        f.write_str(match self {
            ESC => "\x1b",
            DCS => "\x1bP",
            SOS => "\x1bX",
            SS2 => "\x1bN",
            SS3 => "\x1bO",
            CSI => "\x1b[",
            OSC => "\x1b]",
            PM => "\x1b^",
            APC => "\x1b_",
        })
    }
}

// ------------------------------------------------------------------------------------------------

/// A complete escape sequence.
///
/// A sequence retains all of its bytes, starting with the `ESC` and ending
/// with the final byte or string terminator. Writing [`Sequence::raw`]
/// reproduces the sequence exactly.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Sequence<'t> {
    control: Control,
    raw: &'t [u8],
}

impl<'t> Sequence<'t> {
    /// Create a new sequence from its control and raw bytes.
    pub const fn new(control: Control, raw: &'t [u8]) -> Self {
        Self { control, raw }
    }

    /// Get the sequence's control.
    pub const fn control(&self) -> Control {
        self.control
    }

    /// Get all bytes of the sequence.
    pub const fn raw(&self) -> &'t [u8] {
        self.raw
    }

    /// Get the payload.
    ///
    /// The payload omits the introducer. For strings, it also omits the
    /// terminating `BEL` or `ST`. For all other sequences, it includes the
    /// final byte.
    pub fn payload(&self) -> &'t [u8] {
        let start = self.control.introducer_len().min(self.raw.len());
        let mut end = self.raw.len();
        if self.control.is_string() {
            if self.raw.ends_with(b"\x1b\\") {
                end -= 2;
            } else if self.raw.ends_with(b"\x07") {
                end -= 1;
            }
        }

        &self.raw[start..end.max(start)]
    }

    /// Parse this sequence as a control sequence.
    ///
    /// This method returns `None` for sequences that are not CSI.
    pub fn csi(&self) -> Option<Csi<'t>> {
        if self.control == Control::CSI {
            Csi::parse(self.payload())
        } else {
            None
        }
    }
}

impl std::fmt::Debug for Sequence<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Sequence")
            .field(&self.control)
            .field(&nicely_str(self.raw))
            .finish()
    }
}

// ------------------------------------------------------------------------------------------------

/// A text, control, or escape sequence token.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Token<'t> {
    /// A run of bytes without `ESC`. Text may include C0 controls as well as
    /// UTF-8 and other bytes with the high bit set.
    Text(&'t [u8]),
    /// A C0 control that appeared in the middle of an escape sequence. Since
    /// terminals execute such controls right away, the scanner reports them
    /// before the enclosing sequence. This token always has one byte.
    Control(&'t [u8]),
    /// A complete escape sequence.
    Sequence(Sequence<'t>),
    /// The bytes of an aborted or pathologically long escape sequence.
    Malformed(&'t [u8]),
}

impl<'t> Token<'t> {
    /// Get this token's control.
    pub fn control(&self) -> Option<Control> {
        match self {
            Token::Sequence(sequence) => Some(sequence.control()),
            _ => None,
        }
    }

    /// Get this token's bytes.
    ///
    /// Concatenating the bytes of all tokens reproduces the scanned input,
    /// with embedded controls moved in front of their sequences.
    pub fn as_bytes(&self) -> &'t [u8] {
        use self::Token::*;

        match *self {
            Text(data) | Control(data) | Malformed(data) => data,
            Sequence(ref sequence) => sequence.raw(),
        }
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Text(data) => f.debug_tuple("Text").field(&nicely_str(data)).finish(),
            Self::Control(data) => f.debug_tuple("Control").field(&nicely_str(data)).finish(),
            Self::Sequence(ref sequence) => std::fmt::Debug::fmt(sequence, f),
            Self::Malformed(data) => f.debug_tuple("Malformed").field(&nicely_str(data)).finish(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Control, Sequence, Token};

    #[test]
    fn test_payload() {
        let csi = Sequence::new(Control::CSI, b"\x1b[1;31m");
        assert_eq!(csi.payload(), b"1;31m");

        let osc = Sequence::new(Control::OSC, b"\x1b]0;title\x1b\\");
        assert_eq!(osc.payload(), b"0;title");

        let osc = Sequence::new(Control::OSC, b"\x1b]0;title\x07");
        assert_eq!(osc.payload(), b"0;title");

        let esc = Sequence::new(Control::ESC, b"\x1b7");
        assert_eq!(esc.payload(), b"7");
        assert!(esc.csi().is_none());
    }

    #[test]
    fn test_token_bytes() {
        let token = Token::Sequence(Sequence::new(Control::CSI, b"\x1b[m"));
        assert_eq!(token.as_bytes(), b"\x1b[m");
        assert_eq!(token.control(), Some(Control::CSI));
        assert_eq!(Token::Text(b"hi").control(), None);
        assert_eq!(format!("{:?}", Token::Control(b"\x07")), "Control(\"‹𝖻𝖾𝗅›\")");
    }
}
