mod machine;

use tracing::trace;

use self::machine::{transition, Action, State};
use super::opt::Options;
use super::{Control, Sequence, Token};

// ================================================================================================

/// A resumable scanner for text and escape sequences.
///
/// This struct builds Paul Flo Williams' [parser for DEC's ANSI-compatible
/// terminals](https://vt100.net/emu/dec_ansi_parser) to implement a state
/// machine for recognizing escape sequences in a byte stream. Unlike a parser
/// reading from a terminal, this scanner is fed one chunk at a time by its
/// caller, and escape sequences may span any number of chunks. The scanner
/// hence carries the state machine state together with the bytes of the
/// escape sequence being recognized from one invocation of [`Scanner::scan`]
/// to the next.
///
/// Text is zero-copy: A text token is a run of input bytes up to the next
/// `ESC`. It may include C0 controls, UTF-8, and any other bytes with the
/// high bit set. Only 7-bit escape sequences are recognized, which ensures
/// that UTF-8 is never mistaken for C1 controls. Escape sequences are
/// returned as slices of the scanner's internal buffer.
///
/// Every input byte ends up in exactly one token. Notably, malformed escape
/// sequences are not errors but [`Token::Malformed`] tokens with the bytes
/// seen so far. The state machine has been engineered to return to the
/// ground state after malformed sequences, so scanning can always continue.
pub struct Scanner {
    /// The state machine state for the escape sequence being recognized.
    state: State,
    /// The control for the escape sequence being recognized.
    control: Option<Control>,
    /// The bytes of the escape sequence being recognized.
    raw: Vec<u8>,
    /// The flag for `raw` holding a token returned by the previous scan.
    is_complete: bool,
    /// The flag for the next sequence starting with the last byte of the
    /// previous, malformed sequence, which is an `ESC`.
    resume_with_escape: bool,
    /// The maximum length for any escape sequence.
    max_sequence_length: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::with_options(&Options::default())
    }
}

impl Scanner {
    /// Create a new scanner with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new scanner with the given options.
    pub fn with_options(options: &Options) -> Self {
        Self {
            state: State::Ground,
            control: None,
            raw: Vec::with_capacity(32),
            is_complete: false,
            resume_with_escape: false,
            max_sequence_length: options.pathological_size(),
        }
    }

    // ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~
    // Carry-over state

    /// Release the bytes of the previously returned token.
    fn tidy(&mut self) {
        if self.is_complete {
            self.raw.clear();
            self.is_complete = false;
            if self.resume_with_escape {
                self.raw.push(0x1b);
                self.resume_with_escape = false;
            }
        }
    }

    /// Determine whether this scanner's state machine is in-flight, i.e., has
    /// consumed some but not all bytes of an escape sequence.
    pub fn in_flight(&self) -> bool {
        !matches!(self.state, State::Ground)
    }

    /// Get the bytes of the incomplete escape sequence.
    pub fn pending(&self) -> &[u8] {
        if !self.in_flight() {
            &[]
        } else if !self.is_complete {
            &self.raw
        } else if self.resume_with_escape {
            b"\x1b"
        } else {
            &[]
        }
    }

    /// Reset this scanner to the ground state, discarding any incomplete
    /// escape sequence.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.control = None;
        self.raw.clear();
        self.is_complete = false;
        self.resume_with_escape = false;
    }

    // ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~

    /// Scan the input for the next token.
    ///
    /// This method returns the number of input bytes consumed and, if
    /// complete, the next token. If the input ends in the middle of an escape
    /// sequence, this method consumes all input and returns `None`; the next
    /// invocation picks up where this one left off. When aborting a malformed
    /// sequence, this method may return a token without consuming input.
    /// Either way, it makes progress as long as the input is not empty.
    ///
    /// A token must be processed before the next invocation, which reuses the
    /// internal buffer.
    pub fn scan<'a>(&'a mut self, input: &'a [u8]) -> (usize, Option<Token<'a>>) {
        self.tidy();

        // Fast path for text
        if !self.in_flight() {
            let length = input
                .iter()
                .position(|&byte| byte == 0x1b)
                .unwrap_or(input.len());
            if 0 < length {
                return (length, Some(Token::Text(&input[..length])));
            }
        }

        // Run the state machine for escape sequences
        for (index, &byte) in input.iter().enumerate() {
            use self::Action::*;

            let (state, action, control) = transition(self.state, byte);
            self.state = state;
            if control.is_some() {
                self.control = control;
            }

            match action {
                Print => return (index + 1, Some(Token::Text(&input[index..=index]))),
                HandleControl => return (index + 1, Some(Token::Control(&input[index..=index]))),
                StartSequence => {
                    self.raw.clear();
                    self.raw.push(byte);
                }
                Continue => {
                    self.raw.push(byte);
                    if self.max_sequence_length <= self.raw.len() {
                        trace!(length = self.raw.len(), "pathological escape sequence");
                        self.state = State::Ground;
                        self.is_complete = true;
                        return (index + 1, Some(Token::Malformed(self.raw.as_slice())));
                    }
                }
                Dispatch => {
                    self.raw.push(byte);
                    self.is_complete = true;
                    let control = self.control.unwrap_or(Control::ESC);
                    let sequence = Sequence::new(control, self.raw.as_slice());
                    return (index + 1, Some(Token::Sequence(sequence)));
                }
                AbortSequence => {
                    self.raw.push(byte);
                    self.is_complete = true;
                    return (index + 1, Some(Token::Malformed(self.raw.as_slice())));
                }
                AbortThenRetry => {
                    self.is_complete = true;
                    if matches!(state, State::Escape) {
                        // The string's ESC starts the next sequence.
                        self.resume_with_escape = true;
                        let end = self.raw.len().saturating_sub(1);
                        return (index, Some(Token::Malformed(&self.raw[..end])));
                    }
                    return (index, Some(Token::Malformed(self.raw.as_slice())));
                }
            }
        }

        (input.len(), None)
    }
}

impl Clone for Scanner {
    fn clone(&self) -> Self {
        let mut scanner = Self::new();
        scanner.clone_from(self);
        scanner
    }

    /// Copy the source's state into this scanner, reusing this scanner's
    /// buffer.
    fn clone_from(&mut self, source: &Self) {
        self.state = source.state;
        self.control = source.control;
        self.raw.clone_from(&source.raw);
        self.is_complete = source.is_complete;
        self.resume_with_escape = source.resume_with_escape;
        self.max_sequence_length = source.max_sequence_length;
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("state", &self.state)
            .field("control", &self.control)
            .field("raw", &crate::util::nicely_str(&self.raw))
            .field("is_complete", &self.is_complete)
            .field("resume_with_escape", &self.resume_with_escape)
            .field("max_sequence_length", &self.max_sequence_length)
            .finish()
    }
}

// ================================================================================================
