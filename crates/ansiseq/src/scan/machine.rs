// State Machine States, Actions, and Transitions
use crate::Control;

/// The current state when processing escape sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    SingleShift,
    StringBody,
    StringEnd,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    DcsEntry,
    DcsParam,
    DcsIntermediate,
    DcsPassthrough,
    DcsPassthroughEnd,
    DcsIgnore,
    DcsIgnoreEnd,
}

/// The next action to take.
///
/// Since the scanner reproduces output byte for byte, it keeps every byte of
/// an escape sequence. Hence there is no distinction between ignored and
/// retained bytes, only between bytes that continue the sequence and bytes
/// that complete or abort it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Action {
    /// Print the byte as text. Only valid in the ground state.
    Print,
    /// Start a new escape sequence with an `ESC`.
    StartSequence,
    /// Keep the byte as part of the escape sequence.
    Continue,
    /// Abort the escape sequence, including the current byte.
    AbortSequence,
    /// Abort the escape sequence without the current byte, then process the
    /// current byte again in the new state. When the new state is not ground,
    /// the aborted sequence's trailing `ESC` starts the next sequence.
    AbortThenRetry,
    /// Dispatch the escape sequence, including the current byte.
    Dispatch,
    /// Execute the current byte as a C0 control embedded in an escape
    /// sequence.
    HandleControl,
}

// ------------------------------------------------------------------------------------------------

const fn otherwise(byte: u8, state: State) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x00..=0x17 | 0x19 | 0x1c..=0x1f => (state, HandleControl, None),
        0x18 | 0x1a | 0x1b => (Ground, AbortThenRetry, None),
        0x20..=0x7f => (state, Continue, None),
        // Bytes with the high bit set are text, typically UTF-8, and
        // never part of a 7-bit sequence.
        _ => (Ground, AbortThenRetry, None),
    }
}

// ------------------------------------------------------------------------------------------------
// Ground

const fn ground(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x1b => (Escape, StartSequence, Some(Control::ESC)),
        _ => (Ground, Print, None),
    }
}

// ------------------------------------------------------------------------------------------------
// Escape

const fn escape(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x20..=0x2f => (EscapeIntermediate, Continue, None),
        0x30..=0x4d | 0x51..=0x57 | 0x59 | 0x5a | 0x5c | 0x60..=0x7e => (Ground, Dispatch, None),
        0x4e => (SingleShift, Continue, Some(Control::SS2)),
        0x4f => (SingleShift, Continue, Some(Control::SS3)),
        0x50 => (DcsEntry, Continue, Some(Control::DCS)),
        0x58 => (StringBody, Continue, Some(Control::SOS)),
        0x5b => (CsiEntry, Continue, Some(Control::CSI)),
        0x5d => (StringBody, Continue, Some(Control::OSC)),
        0x5e => (StringBody, Continue, Some(Control::PM)),
        0x5f => (StringBody, Continue, Some(Control::APC)),
        _ => otherwise(byte, Escape),
    }
}

const fn escape_intermediate(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x20..=0x2f => (EscapeIntermediate, Continue, None),
        0x30..=0x7e => (Ground, Dispatch, None),
        _ => otherwise(byte, EscapeIntermediate),
    }
}

// ------------------------------------------------------------------------------------------------
// SS2, SS3

const fn single_shift(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x20..=0x7e => (Ground, Dispatch, None),
        _ => otherwise(byte, SingleShift),
    }
}

// ------------------------------------------------------------------------------------------------
// APC, PM, OSC, SOS

const fn string_body(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x07 => (Ground, Dispatch, None),
        0x18 | 0x1a => (Ground, AbortThenRetry, None),
        0x1b => (StringEnd, Continue, None),
        // Strings may carry UTF-8, e.g., window titles and hyperlinks.
        _ => (StringBody, Continue, None),
    }
}

const fn string_end(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x5c => (Ground, Dispatch, None),
        _ => (Escape, AbortThenRetry, Some(Control::ESC)),
    }
}

// ------------------------------------------------------------------------------------------------
// CSI

const fn csi_entry(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x20..=0x2f => (CsiIntermediate, Continue, None),
        // Colons separate sub-parameters, as in ITU T.416 colors.
        0x30..=0x3f => (CsiParam, Continue, None),
        0x40..=0x7e => (Ground, Dispatch, None),
        _ => otherwise(byte, CsiEntry),
    }
}

const fn csi_param(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x20..=0x2f => (CsiIntermediate, Continue, None),
        0x30..=0x3b => (CsiParam, Continue, None),
        0x3c..=0x3f => (CsiIgnore, Continue, None),
        0x40..=0x7e => (Ground, Dispatch, None),
        _ => otherwise(byte, CsiParam),
    }
}

const fn csi_intermediate(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x20..=0x2f => (CsiIntermediate, Continue, None),
        0x30..=0x3f => (CsiIgnore, Continue, None),
        0x40..=0x7e => (Ground, Dispatch, None),
        _ => otherwise(byte, CsiIntermediate),
    }
}

const fn csi_ignore(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x20..=0x3f => (CsiIgnore, Continue, None),
        0x40..=0x7e => (Ground, AbortSequence, None),
        _ => otherwise(byte, CsiIgnore),
    }
}

// ------------------------------------------------------------------------------------------------
// DCS

const fn dcs_entry(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x00..=0x17 | 0x19 | 0x1c..=0x1f => (DcsEntry, Continue, None),
        0x20..=0x2f => (DcsIntermediate, Continue, None),
        0x30..=0x39 | 0x3b..=0x3f => (DcsParam, Continue, None),
        0x3a => (DcsIgnore, Continue, None),
        0x40..=0x7e => (DcsPassthrough, Continue, None),
        _ => otherwise(byte, DcsEntry),
    }
}

const fn dcs_param(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x00..=0x17 | 0x19 | 0x1c..=0x1f => (DcsParam, Continue, None),
        0x20..=0x2f => (DcsIntermediate, Continue, None),
        0x30..=0x39 | 0x3b => (DcsParam, Continue, None),
        0x3a | 0x3c..=0x3f => (DcsIgnore, Continue, None),
        0x40..=0x7e => (DcsPassthrough, Continue, None),
        _ => otherwise(byte, DcsParam),
    }
}

const fn dcs_intermediate(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x00..=0x17 | 0x19 | 0x1c..=0x1f => (DcsIntermediate, Continue, None),
        0x20..=0x2f => (DcsIntermediate, Continue, None),
        0x30..=0x3f => (DcsIgnore, Continue, None),
        0x40..=0x7e => (DcsPassthrough, Continue, None),
        _ => otherwise(byte, DcsIntermediate),
    }
}

const fn dcs_passthrough(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x07 => (Ground, Dispatch, None),
        0x18 | 0x1a => (Ground, AbortThenRetry, None),
        0x1b => (DcsPassthroughEnd, Continue, None),
        _ => (DcsPassthrough, Continue, None),
    }
}

const fn dcs_passthrough_end(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x5c => (Ground, Dispatch, None),
        _ => (Escape, AbortThenRetry, Some(Control::ESC)),
    }
}

const fn dcs_ignore(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x07 => (Ground, AbortSequence, None),
        0x18 | 0x1a => (Ground, AbortThenRetry, None),
        0x1b => (DcsIgnoreEnd, Continue, None),
        _ => (DcsIgnore, Continue, None),
    }
}

const fn dcs_ignore_end(byte: u8) -> (State, Action, Option<Control>) {
    use self::Action::*;
    use self::State::*;

    match byte {
        0x5c => (Ground, AbortSequence, None),
        _ => (Escape, AbortThenRetry, Some(Control::ESC)),
    }
}

// ------------------------------------------------------------------------------------------------
// Complete transition function

/// Determine the next state and action.
pub(super) const fn transition(state: State, byte: u8) -> (State, Action, Option<Control>) {
    use self::State::*;

    match state {
        Ground => ground(byte),
        Escape => escape(byte),
        EscapeIntermediate => escape_intermediate(byte),
        SingleShift => single_shift(byte),
        StringBody => string_body(byte),
        StringEnd => string_end(byte),
        CsiEntry => csi_entry(byte),
        CsiParam => csi_param(byte),
        CsiIntermediate => csi_intermediate(byte),
        CsiIgnore => csi_ignore(byte),
        DcsEntry => dcs_entry(byte),
        DcsParam => dcs_param(byte),
        DcsIntermediate => dcs_intermediate(byte),
        DcsPassthrough => dcs_passthrough(byte),
        DcsPassthroughEnd => dcs_passthrough_end(byte),
        DcsIgnore => dcs_ignore(byte),
        DcsIgnoreEnd => dcs_ignore_end(byte),
    }
}
