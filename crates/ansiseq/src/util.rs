//! Helper module with utilities for byte strings.

use std::fmt;

/// Nicely format a byte.
///
/// Printable ASCII characters are written as is, common controls as
/// mnemonics in sans-serif math letters, and all other bytes as two-digit
/// hexadecimal numbers.
fn format_nicely<W>(byte: u8, output: &mut W) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    if (0x20..=0x7e).contains(&byte) {
        return output.write_char(byte as char);
    }

    let mnemonic = match byte {
        0x00 => "‹𝗇𝗎𝗅›",
        0x07 => "‹𝖻𝖾𝗅›",
        0x08 => "‹𝖻s›",
        0x09 => "‹𝗁𝗍›",
        0x0a => "‹𝗅𝖿›",
        0x0d => "‹𝖼𝗋›",
        0x18 => "‹𝖼𝖺𝗇›",
        0x1a => "‹𝗌𝗎𝖻›",
        0x1b => "‹𝖾𝗌𝖼›",
        0x7f => "‹𝖽𝖾𝗅›",
        _ => return write!(output, "‹{:02x}›", byte),
    };

    output.write_str(mnemonic)
}

/// A newtype for nicely formatting a byte slice.
struct ByteStringNicely<'a>(&'a [u8]);

impl fmt::Display for ByteStringNicely<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for &byte in self.0 {
            if byte == b'"' {
                f.write_str("\\\"")?;
            } else {
                format_nicely(byte, f)?;
            }
        }
        f.write_str("\"")
    }
}

impl fmt::Debug for ByteStringNicely<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Turn the slice into a value that displays nicely.
///
/// # Example
///
/// ```
/// # use ansiseq::util::nicely_str;
/// assert_eq!(format!("{}", nicely_str(b"\x1b[1m\xff")), "\"‹𝖾𝗌𝖼›[1m‹ff›\"");
/// ```
pub fn nicely_str(bytes: &[u8]) -> impl fmt::Debug + fmt::Display + '_ {
    ByteStringNicely(bytes)
}

// ------------------------------------------------------------------------------------------------

/// Parse a decimal number.
///
/// This function returns `None` for empty slices, non-digits, and numbers
/// that do not fit into a `u32`.
pub(crate) fn parse_decimal(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }

    let mut result: u32 = 0;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(byte - b'0'))?;
    }

    Some(result)
}

/// Determine whether the byte is a semicolon.
pub(crate) fn is_semicolon(b: &u8) -> bool {
    *b == b';'
}

/// Determine whether the byte is a colon.
pub(crate) fn is_colon(b: &u8) -> bool {
    *b == b':'
}
