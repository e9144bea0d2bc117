//! Determining a terminal's color capability from environment variables.
//!
//! The heuristics are implemented by [`resolve`], which reads the environment
//! through the [`Environment`] trait. [`Env`] is the process environment,
//! whereas [`EnvSnapshot`] is a captured or hand-crafted set of variables.

use std::collections::HashMap;
use std::ffi::OsString;

use tracing::debug;

use crate::Rank;

/// The environment variables consulted by [`resolve`].
pub const VARIABLES: [&str; 6] = [
    "TERM",
    "COLORTERM",
    "NO_COLOR",
    "CLICOLOR",
    "CLICOLOR_FORCE",
    "WT_SESSION",
];

/// Read-only access to environment variables.
///
/// Implementors provide [`Environment::read_os`]; the other methods derive
/// from it. [`resolve`] only ever reads through this trait, so tests can
/// substitute an [`EnvSnapshot`] for the process environment.
pub trait Environment {
    /// Try reading the environment variable as an OS string.
    fn read_os(&self, key: &str) -> Option<OsString>;

    /// Try reading the environment variable as a string.
    fn read(&self, key: &str) -> Result<String, std::env::VarError> {
        self.read_os(key).map_or_else(
            || Err(std::env::VarError::NotPresent),
            |s| s.into_string().map_err(std::env::VarError::NotUnicode),
        )
    }

    /// Determine whether the environment variable is defined.
    fn is_defined(&self, key: &str) -> bool {
        self.read_os(key).is_some()
    }

    /// Determine whether the environment variable is defined with a non-empty
    /// value.
    fn is_non_empty(&self, key: &str) -> bool {
        self.read_os(key).is_some_and(|v| !v.is_empty())
    }

    /// Determine whether the environment variable has the given value.
    fn has_value(&self, key: &str, expected_value: &str) -> bool {
        self.read_os(key).is_some_and(|v| v == expected_value)
    }
}

/// The process environment.
#[derive(Debug, Default)]
pub struct Env();

impl Environment for Env {
    fn read_os(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

impl Environment for HashMap<String, String> {
    fn read_os(&self, key: &str) -> Option<OsString> {
        self.get(key).map(OsString::from)
    }
}

// ------------------------------------------------------------------------------------------------

/// A snapshot of environment variables.
///
/// ```
/// # use colorfit::env::{resolve, EnvSnapshot};
/// # use colorfit::Rank;
/// let env = EnvSnapshot::from_environ(["TERM=xterm-256color", "COLORTERM=truecolor"]);
/// assert_eq!(resolve(&env, true), Rank::TrueColor);
/// assert_eq!(resolve(&env, false), Rank::Plain);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    bindings: HashMap<String, OsString>,
}

impl EnvSnapshot {
    /// Create a new, empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the variables consulted by [`resolve`] from the process
    /// environment.
    pub fn capture() -> Self {
        let bindings = VARIABLES
            .iter()
            .filter_map(|&key| std::env::var_os(key).map(|value| (key.to_string(), value)))
            .collect();
        Self { bindings }
    }

    /// Create a new snapshot from `KEY=VALUE` entries.
    ///
    /// The value extends from the first equals sign to the end of the entry.
    /// Entries without an equals sign are ignored. Later entries override
    /// earlier ones.
    pub fn from_environ<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut snapshot = Self::new();
        for entry in entries {
            if let Some((key, value)) = entry.as_ref().split_once('=') {
                snapshot.set(key, value);
            }
        }
        snapshot
    }

    /// Set the variable.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        self.bindings
            .insert(key.as_ref().to_string(), OsString::from(value.as_ref()));
        self
    }

    /// Remove the variable.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.bindings.remove(key);
        self
    }
}

impl Environment for EnvSnapshot {
    fn read_os(&self, key: &str) -> Option<OsString> {
        self.bindings.get(key).cloned()
    }
}

// ================================================================================================

/// The rank implied by the terminal type, with the flag for terminal
/// multiplexers, which cap the rank at [`Rank::Extended256`].
fn classify_terminal(term: &str) -> (Rank, bool) {
    const LEGACY_FAMILIES: [&str; 6] = ["xterm", "vt100", "vt220", "rxvt", "konsole", "putty"];
    const LEGACY_NAMES: [&str; 4] = ["linux", "ansi", "cygwin", "color"];

    if term.is_empty() || term == "dumb" {
        (Rank::Plain, false)
    } else if term.ends_with("-direct")
        || term.contains("truecolor")
        || term.contains("24bit")
        || term == "xterm-kitty"
        || term == "xterm-ghostty"
    {
        (Rank::TrueColor, false)
    } else if term.starts_with("screen") || term.starts_with("tmux") {
        (Rank::Extended256, true)
    } else if term.contains("256color") || term.ends_with("-256") {
        (Rank::Extended256, false)
    } else if LEGACY_FAMILIES.iter().any(|family| term.starts_with(family))
        || LEGACY_NAMES.contains(&term)
    {
        (Rank::Basic16, false)
    } else {
        // Unknown terminals are probably recent ones.
        (Rank::TrueColor, false)
    }
}

/// Determine a terminal's color capability from the environment.
///
/// This function consults `TERM`, `COLORTERM`, `NO_COLOR`, `CLICOLOR_FORCE`,
/// and `WT_SESSION` with the following precedence:
///
///  1. Output that does not go to a terminal is [`Rank::Plain`], unless
///     `CLICOLOR_FORCE` is set.
///  2. `TERM` determines the base rank. An empty or `dumb` terminal is
///     [`Rank::Plain`], direct-color terminals are [`Rank::TrueColor`],
///     `screen` and `tmux` as well as `256color` terminals are
///     [`Rank::Extended256`], and legacy terminals such as `xterm` or `linux`
///     are [`Rank::Basic16`]. Other terminals are assumed to be recent and
///     hence [`Rank::TrueColor`].
///  3. `CLICOLOR_FORCE` raises the rank to at least [`Rank::Basic16`].
///  4. `COLORTERM` raises a color rank to [`Rank::TrueColor`].
///  5. `WT_SESSION` raises the rank to [`Rank::TrueColor`].
///  6. Terminal multiplexers cap the rank at [`Rank::Extended256`].
///  7. `NO_COLOR` lowers the rank to [`Rank::Monochrome`], unless the base
///     rank is [`Rank::Plain`].
///
/// Variables count as set only if they are not empty. `CLICOLOR` is logged
/// but does not affect the result.
pub fn resolve(env: &impl Environment, is_terminal: bool) -> Rank {
    let term = env
        .read_os("TERM")
        .map(|term| term.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let is_forced = env.is_non_empty("CLICOLOR_FORCE");
    let has_colorterm = env.is_non_empty("COLORTERM");
    let is_windows_terminal = env.is_non_empty("WT_SESSION");
    let is_no_color = env.is_non_empty("NO_COLOR");
    let (base, is_multiplexed) = classify_terminal(&term);

    let rank = if !is_terminal && !is_forced {
        Rank::Plain
    } else {
        let mut rank = base;
        if is_forced {
            rank = rank.max(Rank::Basic16);
        }
        if has_colorterm && Rank::Plain < rank {
            rank = Rank::TrueColor;
        }
        if is_windows_terminal {
            rank = Rank::TrueColor;
        }
        if is_multiplexed {
            rank = rank.min(Rank::Extended256);
        }
        if is_no_color {
            rank = if base == Rank::Plain {
                Rank::Plain
            } else {
                Rank::Monochrome
            };
        }
        rank
    };

    debug!(
        term = %term,
        is_terminal,
        is_forced,
        has_colorterm,
        is_windows_terminal,
        is_no_color,
        clicolor = env.is_defined("CLICOLOR"),
        %rank,
        "resolved color rank"
    );
    rank
}

#[cfg(test)]
mod test {
    use super::{classify_terminal, resolve, Env, EnvSnapshot, Environment, VARIABLES};
    use crate::Rank;
    use std::collections::HashMap;

    #[test]
    fn test_environment() {
        let env = &mut EnvSnapshot::new();
        env.set("TERM", "xterm").set("NO_COLOR", "");
        assert!(env.is_defined("NO_COLOR"));
        assert!(!env.is_non_empty("NO_COLOR"));
        assert!(env.has_value("TERM", "xterm"));
        assert_eq!(env.read("TERM").as_deref(), Ok("xterm"));
        assert!(env.read("COLORTERM").is_err());

        env.remove("TERM");
        assert!(!env.is_defined("TERM"));

        let env = EnvSnapshot::from_environ(["A=1=2", "B", "C=", "A=3"]);
        assert!(env.has_value("A", "3"));
        assert!(!env.is_defined("B"));
        assert!(env.is_defined("C"));

        let captured = EnvSnapshot::capture();
        for key in VARIABLES {
            assert_eq!(captured.read_os(key), Env::default().read_os(key), "{}", key);
        }
        assert!(!captured.is_defined("HOME"));

        let mut map = HashMap::new();
        map.insert("TERM".to_string(), "screen".to_string());
        assert_eq!(resolve(&map, true), Rank::Extended256);
    }

    #[test]
    fn test_classify_terminal() {
        for (term, rank, is_multiplexed) in [
            ("", Rank::Plain, false),
            ("dumb", Rank::Plain, false),
            ("xterm-direct", Rank::TrueColor, false),
            ("xterm-truecolor", Rank::TrueColor, false),
            ("xterm-kitty", Rank::TrueColor, false),
            ("xterm-ghostty", Rank::TrueColor, false),
            ("screen", Rank::Extended256, true),
            ("tmux-256color", Rank::Extended256, true),
            ("xterm-256color", Rank::Extended256, false),
            ("putty-256", Rank::Extended256, false),
            ("xterm", Rank::Basic16, false),
            ("xterm-16color", Rank::Basic16, false),
            ("vt100", Rank::Basic16, false),
            ("rxvt-unicode", Rank::Basic16, false),
            ("linux", Rank::Basic16, false),
            ("cygwin", Rank::Basic16, false),
            ("alacritty", Rank::TrueColor, false),
        ] {
            assert_eq!(classify_terminal(term), (rank, is_multiplexed), "TERM={}", term);
        }
    }

    #[test]
    fn test_resolve() {
        let cases: &[(&[&str], Rank)] = &[
            (&[], Rank::Plain),
            (&["TERM=dumb"], Rank::Plain),
            (&["TERM=dumb", "COLORTERM=truecolor"], Rank::Plain),
            (
                &["TERM=dumb", "COLORTERM=truecolor", "CLICOLOR_FORCE=1"],
                Rank::TrueColor,
            ),
            (&["TERM=dumb", "CLICOLOR_FORCE=1"], Rank::Basic16),
            (&["TERM=dumb", "CLICOLOR=1"], Rank::Plain),
            (&["TERM=dumb", "NO_COLOR=1"], Rank::Plain),
            (&["TERM=xterm-256color"], Rank::Extended256),
            (&["TERM=xterm-256color", "CLICOLOR=1"], Rank::Extended256),
            (&["TERM=xterm-256color", "COLORTERM=yes"], Rank::TrueColor),
            (&["TERM=xterm-256color", "NO_COLOR=1"], Rank::Monochrome),
            (&["TERM=xterm-256color", "NO_COLOR=0"], Rank::Monochrome),
            (&["TERM=xterm-256color", "NO_COLOR="], Rank::Extended256),
            (&["TERM=xterm"], Rank::Basic16),
            (&["TERM=XTERM"], Rank::Basic16),
            (&["TERM=xterm", "NO_COLOR=1"], Rank::Monochrome),
            (&["TERM=xterm", "CLICOLOR=1"], Rank::Basic16),
            (&["TERM=xterm", "CLICOLOR_FORCE=1"], Rank::Basic16),
            (&["TERM=xterm-16color"], Rank::Basic16),
            (&["TERM=xterm-color"], Rank::Basic16),
            (
                &["TERM=xterm-256color", "NO_COLOR=1", "CLICOLOR_FORCE=1"],
                Rank::Monochrome,
            ),
            (&["WT_SESSION=1"], Rank::TrueColor),
            (&["TERM=xterm", "WT_SESSION=1"], Rank::TrueColor),
            (&["TERM=screen"], Rank::Extended256),
            (&["TERM=screen", "COLORTERM=truecolor"], Rank::Extended256),
            (&["TERM=tmux", "COLORTERM=truecolor"], Rank::Extended256),
            (&["TERM=tmux", "WT_SESSION=1"], Rank::Extended256),
            (&["TERM=tmux-256color"], Rank::Extended256),
            (&["TERM=wezterm"], Rank::TrueColor),
        ];

        for &(environ, expected) in cases {
            let env = EnvSnapshot::from_environ(environ);
            assert_eq!(resolve(&env, true), expected, "{:?}", environ);
        }
    }

    #[test]
    fn test_resolve_without_terminal() {
        let env = &mut EnvSnapshot::new();
        env.set("TERM", "dumb");
        assert_eq!(resolve(env, false), Rank::Plain);

        env.set("TERM", "xterm-256color").set("COLORTERM", "truecolor");
        assert_eq!(resolve(env, false), Rank::Plain);

        env.set("TERM", "dumb").set("CLICOLOR_FORCE", "1").remove("COLORTERM");
        assert_eq!(resolve(env, false), Rank::Basic16);

        env.set("COLORTERM", "truecolor");
        assert_eq!(resolve(env, false), Rank::TrueColor);

        env.set("TERM", "screen");
        assert_eq!(resolve(env, false), Rank::Extended256);
    }
}
