use std::io::{ErrorKind, Write};
use std::sync::Arc;

use ansiseq::csi::{Csi, Param, Params};
use ansiseq::opt::Options;
use ansiseq::util::nicely_str;
use ansiseq::{Scanner, Token};
use tracing::trace;

use crate::error::WriteError;
use crate::style::{Layer, Paint, SgrBuilder};
use crate::termco::{AnsiColor, Color, Rgb};
use crate::{Rank, Translator};

/// A writer that adjusts the colors of terminal output to a terminal's
/// [`Rank`].
///
/// A transcoder scans the bytes written to it for escape sequences and
/// rewrites select graphic rendition (SGR) escape sequences, i.e., `ESC [ …
/// m`, so that the terminal can render their colors:
///
///   * For [`Rank::TrueColor`], all bytes pass through unchanged, though an
///     incomplete escape sequence is held back until it is complete.
///   * For [`Rank::Extended256`] and [`Rank::Basic16`], colors are converted
///     with the [`Translator`], while all other attributes are preserved.
///   * For [`Rank::Monochrome`], colors are removed, while all other
///     attributes are preserved.
///   * For [`Rank::Plain`], all escape sequences are removed.
///
/// Text, control characters, escape sequences other than SGR, and malformed
/// escape sequences pass through unchanged, unless the rank is
/// [`Rank::Plain`]. An escape sequence may be split across several writes.
/// Each write to the transcoder results in at most one `write_all` to the
/// sink.
///
/// If the sink fails before accepting any of a write's output, the write
/// returns the error and leaves the transcoder as it was, so the caller may
/// retry with the same bytes. If the sink accepts part of the output, the
/// write succeeds and the transcoder holds on to the rest, which it writes
/// before any further output, upon [`Write::flush`], and upon
/// [`Transcoder::finish`].
///
/// The rank may change between writes, also in the middle of an escape
/// sequence. Several transcoders can share one translator and hence its
/// cache of conversions.
///
/// # Example
///
/// ```
/// # use colorfit::{Rank, Transcoder};
/// # use std::io::Write;
/// let mut transcoder = Transcoder::new(Vec::new(), Rank::Basic16);
/// transcoder.write_all(b"\x1b[1;38;2;255;133;55mhot")?;
/// transcoder.write_all(b"\x1b[m")?;
/// assert_eq!(transcoder.get_ref(), b"\x1b[1;91mhot\x1b[m");
///
/// transcoder.set_rank(Rank::Extended256);
/// transcoder.write_all(b"\x1b[38:5:196m")?;
/// assert_eq!(&transcoder.get_ref()[13..], b"\x1b[38;5;196m");
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Transcoder<W: Write> {
    sink: W,
    rank: Rank,
    scanner: Scanner,
    checkpoint: Scanner,
    translator: Arc<Translator>,
    builder: SgrBuilder,
    buffer: Vec<u8>,
    backlog: Vec<u8>,
}

impl<W: Write> Transcoder<W> {
    /// Create a new transcoder with its own translator for xterm's default
    /// colors.
    pub fn new(sink: W, rank: Rank) -> Self {
        Self::with_translator(sink, rank, Arc::new(Translator::default()))
    }

    /// Create a new transcoder with the given translator.
    pub fn with_translator(sink: W, rank: Rank, translator: Arc<Translator>) -> Self {
        Self::with_options(sink, rank, translator, &Options::default())
    }

    /// Create a new transcoder with the given translator and scanner options.
    pub fn with_options(
        sink: W,
        rank: Rank,
        translator: Arc<Translator>,
        options: &Options,
    ) -> Self {
        Self {
            sink,
            rank,
            scanner: Scanner::with_options(options),
            checkpoint: Scanner::with_options(options),
            translator,
            builder: SgrBuilder::new(),
            buffer: Vec::with_capacity(1_024),
            backlog: Vec::new(),
        }
    }

    /// Create a new transcoder with the rank determined by the process
    /// environment.
    pub fn from_environment(sink: W, has_tty: bool) -> Self {
        Self::new(sink, Rank::from_environment(has_tty))
    }

    /// Get the rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Set the rank for subsequent writes.
    pub fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }

    /// Access the translator.
    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    /// Access the sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Mutably access the sink.
    ///
    /// Writing to the sink directly bypasses the transcoder and may interleave
    /// output with an incomplete escape sequence.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Unwrap the sink, discarding any incomplete escape sequence and any
    /// output the sink has not yet accepted.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Determine whether the transcoder holds an incomplete escape sequence.
    pub fn in_flight(&self) -> bool {
        self.scanner.in_flight()
    }

    /// Determine whether the transcoder holds output the sink has not yet
    /// accepted.
    pub fn has_backlog(&self) -> bool {
        !self.backlog.is_empty()
    }

    /// Finish transcoding.
    ///
    /// This method writes any output the sink has not yet accepted. If the
    /// last write ended with an incomplete escape sequence, it also writes
    /// the sequence's bytes as is, unless the rank is [`Rank::Plain`]. It then
    /// flushes the sink and returns it.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.write_backlog()?;
        if self.scanner.in_flight() && self.rank != Rank::Plain {
            self.sink.write_all(self.scanner.pending())?;
        }
        self.scanner.reset();
        self.sink.flush()?;
        Ok(self.sink)
    }

    /// Transcode the bytes and write the result to the sink.
    ///
    /// This method first writes any output the sink has not yet accepted.
    /// It then consumes all input, including any trailing incomplete escape
    /// sequence, which is completed by subsequent invocations, and returns
    /// the length of the input.
    ///
    /// An error means that the input has not been consumed. The error's
    /// [`WriteError::written`] counts the bytes of earlier output the sink
    /// accepted before failing. It is zero if the sink rejected the output
    /// for this input.
    pub fn transcode(&mut self, buf: &[u8]) -> Result<usize, WriteError> {
        self.write_backlog()?;

        self.checkpoint.clone_from(&self.scanner);
        self.transcode_into_buffer(buf);

        if let Err(error) = write_out(&mut self.sink, &self.buffer) {
            let written = error.written();
            if written == 0 {
                std::mem::swap(&mut self.scanner, &mut self.checkpoint);
                return Err(error);
            }

            trace!(
                written,
                retained = self.buffer.len() - written,
                error = %error.kind(),
                "retaining unwritten output"
            );
            self.backlog.extend_from_slice(&self.buffer[written..]);
        }
        Ok(buf.len())
    }

    /// Write the output the sink has not yet accepted.
    fn write_backlog(&mut self) -> Result<(), WriteError> {
        if self.backlog.is_empty() {
            return Ok(());
        }

        let result = write_out(&mut self.sink, &self.backlog);
        match result {
            Ok(()) => self.backlog.clear(),
            Err(ref error) => {
                self.backlog.drain(..error.written());
            }
        }
        result
    }

    fn transcode_into_buffer(&mut self, buf: &[u8]) {
        let Self {
            rank,
            scanner,
            translator,
            builder,
            buffer,
            ..
        } = self;

        buffer.clear();
        let mut input = buf;
        while !input.is_empty() {
            let (consumed, token) = scanner.scan(input);
            match token {
                None => {}
                Some(Token::Text(bytes)) | Some(Token::Control(bytes)) => {
                    buffer.extend_from_slice(bytes)
                }
                Some(_) if *rank == Rank::Plain => {}
                Some(Token::Malformed(bytes)) => buffer.extend_from_slice(bytes),
                Some(Token::Sequence(sequence)) if *rank == Rank::TrueColor => {
                    buffer.extend_from_slice(sequence.raw())
                }
                Some(Token::Sequence(sequence)) => match sequence.csi() {
                    Some(csi) if csi.is_sgr() => {
                        let mut sgr = Sgr {
                            rank: *rank,
                            translator: &**translator,
                            builder: &mut *builder,
                        };
                        sgr.rebuild(&csi, buffer);
                    }
                    _ => buffer.extend_from_slice(sequence.raw()),
                },
            }
            input = &input[consumed..];
        }
    }
}

impl<W: Write> Write for Transcoder<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.transcode(buf).map_err(std::io::Error::from)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.write_backlog()?;
        self.sink.flush()
    }
}

impl<W: Write> std::fmt::Debug for Transcoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcoder")
            .field("rank", &self.rank)
            .field("scanner", &self.scanner)
            .field("translator", &self.translator)
            .field("backlog", &self.backlog.len())
            .finish_non_exhaustive()
    }
}

/// Write all data to the sink, tracking the number of bytes written.
fn write_out<W: Write>(sink: &mut W, mut data: &[u8]) -> Result<(), WriteError> {
    let mut written = 0;
    while !data.is_empty() {
        match sink.write(data) {
            Ok(0) => return Err(WriteError::new(written, ErrorKind::WriteZero.into())),
            Ok(count) => {
                written += count;
                data = &data[count..];
            }
            Err(error) if error.kind() == ErrorKind::Interrupted => {}
            Err(error) => return Err(WriteError::new(written, error)),
        }
    }
    Ok(())
}

// ================================================================================================

/// The state for rebuilding one SGR escape sequence.
struct Sgr<'a> {
    rank: Rank,
    translator: &'a Translator,
    builder: &'a mut SgrBuilder,
}

impl Sgr<'_> {
    /// Rebuild the SGR escape sequence and append it to the buffer.
    fn rebuild(&mut self, csi: &Csi<'_>, buffer: &mut Vec<u8>) {
        self.builder.clear();

        let mut params = csi.params();
        while let Some(param) = params.next() {
            if param.has_sub_params() {
                self.colon_param(param);
                continue;
            }

            match param.value() {
                Some(value @ 30..=37) => self.ansi(Layer::Foreground, value - 30),
                Some(value @ 90..=97) => self.ansi(Layer::Foreground, value - 90 + 8),
                Some(value @ 40..=47) => self.ansi(Layer::Background, value - 40),
                Some(value @ 100..=107) => self.ansi(Layer::Background, value - 100 + 8),
                Some(39) => self.paint(Layer::Foreground, Some(Paint::Reset)),
                Some(49) => self.paint(Layer::Background, Some(Paint::Reset)),
                Some(59) => self.paint(Layer::Underline, Some(Paint::Reset)),
                Some(value @ (38 | 48 | 58)) => {
                    if let Some(layer) = Layer::for_extended_color(value) {
                        let color = semicolon_color(&mut params);
                        if color.is_none() {
                            trace!(
                                params = %nicely_str(csi.raw_params()),
                                ?layer,
                                "ignoring malformed color"
                            );
                        }
                        self.paint(layer, color.map(Paint::Set));
                    }
                }
                _ => {
                    self.builder.push_attribute(param.raw());
                }
            }
        }

        // Writing to a vector cannot fail.
        let _ = self.builder.write_to(buffer);
    }

    /// Process a parameter with colon-separated sub-parameters.
    fn colon_param(&mut self, param: Param<'_>) {
        let mut sub_params = param.sub_params();
        let layer = sub_params
            .next()
            .and_then(|introducer| introducer.value())
            .and_then(Layer::for_extended_color);

        if let Some(layer) = layer {
            let color = colon_color(sub_params);
            if color.is_none() {
                trace!(param = %nicely_str(param.raw()), ?layer, "ignoring malformed color");
            }
            self.paint(layer, color.map(Paint::Set));
        } else {
            self.builder.push_attribute(param.raw());
        }
    }

    fn ansi(&mut self, layer: Layer, index: u32) {
        let color = Color::Ansi(AnsiColor::from_index_unchecked(index as u8));
        self.paint(layer, Some(Paint::Set(color)));
    }

    /// Record the paint for the layer, converting its color as necessary.
    ///
    /// Monochrome output has no colors, and a missing paint leaves the layer
    /// as is.
    fn paint(&mut self, layer: Layer, paint: Option<Paint>) {
        if self.rank == Rank::Monochrome {
            return;
        }

        let paint = match paint {
            Some(Paint::Set(color)) => Paint::Set(self.translator.convert(self.rank, &color)),
            Some(Paint::Reset) => Paint::Reset,
            None => return,
        };
        self.builder.set(layer, paint);
    }
}

/// Get the parameter's numeric value. Empty parameters default to zero.
fn number(param: Param<'_>) -> Option<u32> {
    if param.is_empty() {
        Some(0)
    } else {
        param.value()
    }
}

/// Get the parameter's value as a color component.
fn component(param: Param<'_>) -> Option<u8> {
    number(param).and_then(|value| u8::try_from(value).ok())
}

/// Parse an extended color from semicolon-separated parameters, i.e., `5;n`
/// or `2;r;g;b` after the `38`, `48`, or `58`.
///
/// This function consumes the mode and as many values as the mode requires,
/// but no more than remain.
fn semicolon_color(params: &mut Params<'_>) -> Option<Color> {
    match number(params.next()?) {
        Some(5) => component(params.next()?).map(Color::Indexed),
        Some(2) => {
            let (r, g, b) = (params.next(), params.next(), params.next());
            Some(Color::Rgb(Rgb::new(
                component(r?)?,
                component(g?)?,
                component(b?)?,
            )))
        }
        _ => None,
    }
}

/// Parse an extended color from the colon-separated sub-parameters following
/// the `38`, `48`, or `58`, i.e., `5:n`, `2:r:g:b`, or `2:cs:r:g:b`.
fn colon_color(mut sub_params: Params<'_>) -> Option<Color> {
    match number(sub_params.next()?) {
        Some(5) => component(sub_params.next()?).map(Color::Indexed),
        Some(2) => {
            let values = (
                sub_params.next(),
                sub_params.next(),
                sub_params.next(),
                sub_params.next(),
            );
            let (r, g, b) = match values {
                (Some(_), Some(r), Some(g), Some(b)) => (r, g, b),
                (Some(r), Some(g), Some(b), None) => (r, g, b),
                _ => return None,
            };
            Some(Color::Rgb(Rgb::new(component(r)?, component(g)?, component(b)?)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::Transcoder;
    use crate::{Rank, Translator};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::io::{Error, ErrorKind, Write};
    use std::sync::Arc;

    fn transcode(rank: Rank, input: &[u8]) -> Vec<u8> {
        let mut transcoder = Transcoder::new(Vec::new(), rank);
        let count = transcoder.transcode(input).expect("writing to vector succeeds");
        assert_eq!(count, input.len());
        transcoder.into_inner()
    }

    macro_rules! assert_transcodes {
        ($rank:expr, $input:expr, $expected:expr $(,)?) => {
            let output = transcode($rank, $input);
            assert_eq!(
                output,
                $expected,
                "\n{:?} at {} should be\n{:?} but is\n{:?}",
                String::from_utf8_lossy($input),
                $rank,
                String::from_utf8_lossy($expected),
                String::from_utf8_lossy(&output),
            );
        };
    }

    /// Input, expected output for 256 colors, 16 colors, and monochrome.
    type Case = (&'static [u8], &'static [u8], &'static [u8], &'static [u8]);

    const CASES: &[Case] = &[
        (b"", b"", b"", b""),
        (b"hello world", b"hello world", b"hello world", b"hello world"),
        (
            b"hello \x1b[1mworld\x1b[m",
            b"hello \x1b[1mworld\x1b[m",
            b"hello \x1b[1mworld\x1b[m",
            b"hello \x1b[1mworld\x1b[m",
        ),
        (
            b"hello \x1b[31mworld\x1b[m",
            b"hello \x1b[31mworld\x1b[m",
            b"hello \x1b[31mworld\x1b[m",
            b"hello \x1b[mworld\x1b[m",
        ),
        (
            b"\x1b[31mhello \x1b[39mworld\x1b[m",
            b"\x1b[31mhello \x1b[39mworld\x1b[m",
            b"\x1b[31mhello \x1b[39mworld\x1b[m",
            b"\x1b[mhello \x1b[mworld\x1b[m",
        ),
        (
            b"\x1b[31;42mhello world\x1b[m",
            b"\x1b[31;42mhello world\x1b[m",
            b"\x1b[31;42mhello world\x1b[m",
            b"\x1b[mhello world\x1b[m",
        ),
        (
            b"\x1b[91;102mhello world\x1b[m",
            b"\x1b[91;102mhello world\x1b[m",
            b"\x1b[91;102mhello world\x1b[m",
            b"\x1b[mhello world\x1b[m",
        ),
        (
            b"hello \x1b[38;5;196mworld\x1b[m",
            b"hello \x1b[38;5;196mworld\x1b[m",
            b"hello \x1b[91mworld\x1b[m",
            b"hello \x1b[mworld\x1b[m",
        ),
        (
            b"\x1b[48;5;196mhello world\x1b[m",
            b"\x1b[48;5;196mhello world\x1b[m",
            b"\x1b[101mhello world\x1b[m",
            b"\x1b[mhello world\x1b[m",
        ),
        (
            b"hello \x1b[38;2;255;133;55mworld\x1b[m",
            b"hello \x1b[38;5;208mworld\x1b[m",
            b"hello \x1b[91mworld\x1b[m",
            b"hello \x1b[mworld\x1b[m",
        ),
        (
            b"hello \x1b[38:2::255:133:55mworld\x1b[m",
            b"hello \x1b[38;5;208mworld\x1b[m",
            b"hello \x1b[91mworld\x1b[m",
            b"hello \x1b[mworld\x1b[m",
        ),
        (
            b"hello \x1b[48:5:196mworld\x1b[m",
            b"hello \x1b[48;5;196mworld\x1b[m",
            b"hello \x1b[101mworld\x1b[m",
            b"hello \x1b[mworld\x1b[m",
        ),
        (
            b"\x1b[31mhello \x1b[;1mworld",
            b"\x1b[31mhello \x1b[;1mworld",
            b"\x1b[31mhello \x1b[;1mworld",
            b"\x1b[mhello \x1b[;1mworld",
        ),
        (
            b"\x1b[1;38;5;204mhello \x1b[38;5;204mworld\x1b[m",
            b"\x1b[1;38;5;204mhello \x1b[38;5;204mworld\x1b[m",
            b"\x1b[1;91mhello \x1b[91mworld\x1b[m",
            b"\x1b[1mhello \x1b[mworld\x1b[m",
        ),
        (
            b"\x1b[1;3;59mhello\x1b[m \x1b[38;2;255;133;55mworld\x1b[m",
            b"\x1b[1;3;59mhello\x1b[m \x1b[38;5;208mworld\x1b[m",
            b"\x1b[1;3;59mhello\x1b[m \x1b[91mworld\x1b[m",
            b"\x1b[1;3mhello\x1b[m \x1b[mworld\x1b[m",
        ),
    ];

    #[test]
    fn test_ranks() {
        for &(input, extended, basic, mono) in CASES {
            assert_transcodes!(Rank::TrueColor, input, input);
            assert_transcodes!(Rank::Extended256, input, extended);
            assert_transcodes!(Rank::Basic16, input, basic);
            assert_transcodes!(Rank::Monochrome, input, mono);
        }
    }

    #[test]
    fn test_plain() {
        assert_transcodes!(
            Rank::Plain,
            b"hello \x1b[1;31mworld\x1b[m\x1b[2J\x1b]0;title\x07!\n",
            b"hello world!\n",
        );
        assert_transcodes!(Rank::Plain, b"\x1b[31\x1b[1mX", b"X");
        assert_transcodes!(Rank::Plain, b"\x1b[3\x081mX", b"\x08X");
        assert_transcodes!(Rank::Plain, "h\u{e9}llo \u{2713}".as_bytes(), "h\u{e9}llo \u{2713}".as_bytes());
    }

    #[test]
    fn test_passthrough() {
        let input: &[u8] = b"\x1b[2J\x1b[?25h\x1b[>4;2m\x1b]8;;https://example.com\x1b\\link\x1b]8;;\x1b\\\x1bM";
        for rank in [Rank::Extended256, Rank::Basic16, Rank::Monochrome] {
            assert_transcodes!(rank, input, input);
            assert_transcodes!(rank, b"\x1b[31\x1b[1mX", b"\x1b[31\x1b[1mX");
            assert_transcodes!(rank, "h\u{e9}llo \u{2713}".as_bytes(), "h\u{e9}llo \u{2713}".as_bytes());
        }
    }

    #[test]
    fn test_extended_colors() {
        let rank = Rank::Basic16;
        assert_transcodes!(rank, b"\x1b[38;5m", b"\x1b[m");
        assert_transcodes!(rank, b"\x1b[38m", b"\x1b[m");
        assert_transcodes!(rank, b"\x1b[1;38;2;10;20m", b"\x1b[1m");
        assert_transcodes!(rank, b"\x1b[38;7;4;1m", b"\x1b[4;1m");
        assert_transcodes!(rank, b"\x1b[38;5;300;1m", b"\x1b[1m");
        assert_transcodes!(rank, b"\x1b[38;5;;1m", b"\x1b[1;30m");
        assert_transcodes!(rank, b"\x1b[38:9:1m", b"\x1b[m");
        assert_transcodes!(rank, b"\x1b[38:2:1m", b"\x1b[m");
        assert_transcodes!(rank, b"\x1b[4:3;58;2;255;0;0m", b"\x1b[4:3;58;5;9m");

        let rank = Rank::Extended256;
        assert_transcodes!(rank, b"\x1b[38:2:0:255:0:0m", b"\x1b[38;5;196m");
        assert_transcodes!(rank, b"\x1b[58;2;255;0;0m", b"\x1b[58;5;196m");
        assert_transcodes!(rank, b"\x1b[38:5:196m", b"\x1b[38;5;196m");
        assert_transcodes!(rank, b"\x1b[48;2;107;80;255m", b"\x1b[48;5;63m");
    }

    #[test]
    fn test_last_writer_wins() {
        let rank = Rank::Basic16;
        assert_transcodes!(rank, b"\x1b[31;32m", b"\x1b[32m");
        assert_transcodes!(rank, b"\x1b[31;39m", b"\x1b[39m");
        assert_transcodes!(rank, b"\x1b[42;1;31m", b"\x1b[1;31;42m");
        assert_transcodes!(rank, b"\x1b[58;5;1;4;49;59m", b"\x1b[4;49;59m");
    }

    #[test]
    fn test_split_writes() -> std::io::Result<()> {
        let input: &[u8] = b"hello \x1b[1;38;2;255;133;55mworld\x1b[m";
        for rank in [
            Rank::TrueColor,
            Rank::Extended256,
            Rank::Basic16,
            Rank::Monochrome,
            Rank::Plain,
        ] {
            let expected = transcode(rank, input);
            for split in 0..=input.len() {
                let mut transcoder = Transcoder::new(Vec::new(), rank);
                transcoder.write_all(&input[..split])?;
                transcoder.write_all(&input[split..])?;
                assert!(!transcoder.in_flight());
                assert_eq!(transcoder.into_inner(), expected, "split at {}", split);
            }
        }
        Ok(())
    }

    #[test]
    fn test_random_chunks() -> std::io::Result<()> {
        let input: &[u8] = b"\x1b[1;3;59mhello\x1b[m \x1b[38:2::255:133:55mw\xc3\xb6rld\x1b[m\n\
            \x1b]0;title\x07\x1b[2J\x1b[31\x1b[48;5;196mX\x1b[4:3;58;2;1;2;3mY\x1b[m";
        let mut rng = StdRng::seed_from_u64(42);

        for rank in [
            Rank::TrueColor,
            Rank::Extended256,
            Rank::Basic16,
            Rank::Monochrome,
            Rank::Plain,
        ] {
            let expected = transcode(rank, input);
            for _ in 0..50 {
                let mut transcoder = Transcoder::new(Vec::new(), rank);
                let mut rest = input;
                while !rest.is_empty() {
                    let size = rng.random_range(1..=7).min(rest.len());
                    transcoder.write_all(&rest[..size])?;
                    rest = &rest[size..];
                }
                assert_eq!(transcoder.finish()?, expected);
            }
        }
        Ok(())
    }

    #[test]
    fn test_rank_change() -> std::io::Result<()> {
        let mut transcoder = Transcoder::new(Vec::new(), Rank::Extended256);
        assert_eq!(transcoder.rank(), Rank::Extended256);
        transcoder.write_all(b"a\x1b[38;2;1")?;
        assert!(transcoder.in_flight());
        assert_eq!(transcoder.get_ref(), b"a");

        transcoder.set_rank(Rank::TrueColor);
        transcoder.write_all(b";2;3mb")?;
        assert!(!transcoder.in_flight());
        assert_eq!(transcoder.get_ref(), b"a\x1b[38;2;1;2;3mb");

        transcoder.set_rank(Rank::Monochrome);
        transcoder.write_all(b"\x1b[1;31mc")?;
        transcoder.set_rank(Rank::Basic16);
        transcoder.write_all(b"\x1b[1;31md")?;
        assert_eq!(
            transcoder.get_ref(),
            b"a\x1b[38;2;1;2;3mb\x1b[1mc\x1b[1;31md"
        );
        Ok(())
    }

    #[test]
    fn test_finish() -> std::io::Result<()> {
        let mut transcoder = Transcoder::new(Vec::new(), Rank::Extended256);
        transcoder.write_all(b"abc\x1b[38;5")?;
        assert_eq!(transcoder.get_ref(), b"abc");
        assert_eq!(transcoder.finish()?, b"abc\x1b[38;5");

        let mut transcoder = Transcoder::new(Vec::new(), Rank::Plain);
        transcoder.write_all(b"abc\x1b[38;5")?;
        assert_eq!(transcoder.finish()?, b"abc");

        let mut transcoder = Transcoder::new(Vec::new(), Rank::Basic16);
        transcoder.write_all(b"abc\x1b]0;ti")?;
        assert_eq!(transcoder.into_inner(), b"abc");
        Ok(())
    }

    struct FlakySink {
        accepted: Vec<u8>,
        capacity: usize,
        interruptions: usize,
        blocks: usize,
    }

    impl FlakySink {
        fn new(capacity: usize) -> Self {
            Self {
                accepted: Vec::new(),
                capacity,
                interruptions: 0,
                blocks: 0,
            }
        }
    }

    impl Write for FlakySink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if 0 < self.interruptions {
                self.interruptions -= 1;
                return Err(ErrorKind::Interrupted.into());
            } else if 0 < self.blocks {
                self.blocks -= 1;
                return Err(ErrorKind::WouldBlock.into());
            } else if self.capacity == 0 {
                return Err(Error::new(ErrorKind::BrokenPipe, "sink is full"));
            }

            let count = buf.len().min(self.capacity).min(3);
            self.accepted.extend_from_slice(&buf[..count]);
            self.capacity -= count;
            Ok(count)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error() {
        let mut sink = FlakySink::new(7);
        sink.interruptions = 2;
        let mut transcoder = Transcoder::new(sink, Rank::Basic16);

        // The sink accepts part of the output, so the input is consumed.
        assert_eq!(transcoder.transcode(b"\x1b[38;5;196mhello").ok(), Some(16));
        assert_eq!(transcoder.get_ref().accepted, b"\x1b[91mhe");
        assert!(transcoder.has_backlog());

        // The sink accepts nothing, so the input is not consumed.
        let error = transcoder.transcode(b"!").expect_err("sink is full");
        assert_eq!(error.written(), 0);
        assert_eq!(error.kind(), ErrorKind::BrokenPipe);
        let error = transcoder.write(b"!").expect_err("sink is full");
        assert_eq!(error.kind(), ErrorKind::BrokenPipe);
        assert!(transcoder.flush().is_err());

        transcoder.get_mut().capacity = 2;
        let error = transcoder.transcode(b"!").expect_err("sink fills up");
        assert_eq!(error.written(), 2);
        assert_eq!(transcoder.get_ref().accepted, b"\x1b[91mhell");

        transcoder.get_mut().capacity = 10;
        assert_eq!(transcoder.transcode(b"!\x1b[m").ok(), Some(4));
        assert!(!transcoder.has_backlog());
        assert_eq!(transcoder.get_ref().accepted, b"\x1b[91mhello!\x1b[m");
    }

    #[test]
    fn test_retry_after_error() -> std::io::Result<()> {
        let mut sink = FlakySink::new(usize::MAX);
        sink.blocks = 1;
        let mut transcoder = Transcoder::new(sink, Rank::Basic16);

        let error = transcoder.write(b"hello\x1b[38;5").expect_err("sink blocks");
        assert_eq!(error.kind(), ErrorKind::WouldBlock);
        assert!(!transcoder.in_flight());
        assert!(transcoder.get_ref().accepted.is_empty());

        transcoder.write_all(b"hello\x1b[38;5")?;
        assert!(transcoder.in_flight());
        transcoder.write_all(b";196mX\x1b[m")?;
        assert_eq!(transcoder.get_ref().accepted, b"hello\x1b[91mX\x1b[m");

        // A failed write in the middle of a sequence also leaves it pending.
        transcoder.get_mut().blocks = 1;
        transcoder.write_all(b"\x1b[4")?;
        assert!(transcoder.write(b"8;2;0;0;255m").is_err());
        assert_eq!(transcoder.scanner.pending(), b"\x1b[4");
        transcoder.write_all(b"8;2;0;0;255mY")?;
        assert_eq!(
            transcoder.finish()?.accepted,
            b"hello\x1b[91mX\x1b[m\x1b[104mY"
        );
        Ok(())
    }

    #[test]
    fn test_rank_change_mid_sequence() -> std::io::Result<()> {
        let mut transcoder = Transcoder::new(Vec::new(), Rank::TrueColor);
        transcoder.write_all(b"a\x1b[38;2;1")?;
        assert!(transcoder.in_flight());
        assert_eq!(transcoder.get_ref(), b"a");

        transcoder.set_rank(Rank::Basic16);
        transcoder.write_all(b";2;3mX")?;
        assert_eq!(transcoder.get_ref(), b"a\x1b[30mX");

        transcoder.set_rank(Rank::TrueColor);
        transcoder.write_all(b"\x1b[1;38:2::9:8:7mY\x1b]0;title\x07")?;
        assert_eq!(
            transcoder.finish()?,
            b"a\x1b[30mX\x1b[1;38:2::9:8:7mY\x1b]0;title\x07"
        );
        Ok(())
    }

    #[test]
    fn test_shared_translator() {
        let translator = Arc::new(Translator::default());
        let input: &'static [u8] = b"\x1b[38;2;255;133;55mhello\x1b[48;2;107;80;255m world\x1b[m";

        let handles: Vec<_> = [Rank::Extended256, Rank::Basic16, Rank::Extended256, Rank::Basic16]
            .into_iter()
            .map(|rank| {
                let translator = Arc::clone(&translator);
                std::thread::spawn(move || {
                    let mut transcoder = Transcoder::with_translator(Vec::new(), rank, translator);
                    for chunk in input.chunks(5) {
                        transcoder.transcode(chunk).expect("writing to vector succeeds");
                    }
                    (rank, transcoder.into_inner())
                })
            })
            .collect();

        for handle in handles {
            let (rank, output) = handle.join().expect("transcoding thread should not panic");
            assert_eq!(output, transcode(rank, input));
        }
        assert_eq!(translator.cache().len(), 4);
    }
}
