//! Select Graphic Rendition (SGR) codes and helpers for styling text.
//!
//! Only the codes accepted by [`sanitize`] can be represented by [`Sgr`], so
//! anything built from these types is safe to pass through a sanitizing
//! terminal handler unchanged.

pub mod sanitize;

pub use sanitize::{sanitize, strip};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single SGR parameter from the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Sgr(u8);

impl Sgr {
    pub const RESET: Sgr = Sgr(0);
    pub const BOLD: Sgr = Sgr(1);
    pub const DIM: Sgr = Sgr(2);
    pub const ITALIC: Sgr = Sgr(3);
    pub const UNDERLINE: Sgr = Sgr(4);
    pub const BLINK: Sgr = Sgr(5);
    pub const RAPID_BLINK: Sgr = Sgr(6);
    pub const REVERSE: Sgr = Sgr(7);
    pub const HIDDEN: Sgr = Sgr(8);
    pub const STRIKETHROUGH: Sgr = Sgr(9);

    pub const FG_BLACK: Sgr = Sgr(30);
    pub const FG_RED: Sgr = Sgr(31);
    pub const FG_GREEN: Sgr = Sgr(32);
    pub const FG_YELLOW: Sgr = Sgr(33);
    pub const FG_BLUE: Sgr = Sgr(34);
    pub const FG_MAGENTA: Sgr = Sgr(35);
    pub const FG_CYAN: Sgr = Sgr(36);
    pub const FG_WHITE: Sgr = Sgr(37);

    pub const BG_BLACK: Sgr = Sgr(40);
    pub const BG_RED: Sgr = Sgr(41);
    pub const BG_GREEN: Sgr = Sgr(42);
    pub const BG_YELLOW: Sgr = Sgr(43);
    pub const BG_BLUE: Sgr = Sgr(44);
    pub const BG_MAGENTA: Sgr = Sgr(45);
    pub const BG_CYAN: Sgr = Sgr(46);
    pub const BG_WHITE: Sgr = Sgr(47);

    pub const FG_BRIGHT_BLACK: Sgr = Sgr(90);
    pub const FG_BRIGHT_RED: Sgr = Sgr(91);
    pub const FG_BRIGHT_GREEN: Sgr = Sgr(92);
    pub const FG_BRIGHT_YELLOW: Sgr = Sgr(93);
    pub const FG_BRIGHT_BLUE: Sgr = Sgr(94);
    pub const FG_BRIGHT_MAGENTA: Sgr = Sgr(95);
    pub const FG_BRIGHT_CYAN: Sgr = Sgr(96);
    pub const FG_BRIGHT_WHITE: Sgr = Sgr(97);

    pub const BG_BRIGHT_BLACK: Sgr = Sgr(100);
    pub const BG_BRIGHT_RED: Sgr = Sgr(101);
    pub const BG_BRIGHT_GREEN: Sgr = Sgr(102);
    pub const BG_BRIGHT_YELLOW: Sgr = Sgr(103);
    pub const BG_BRIGHT_BLUE: Sgr = Sgr(104);
    pub const BG_BRIGHT_MAGENTA: Sgr = Sgr(105);
    pub const BG_BRIGHT_CYAN: Sgr = Sgr(106);
    pub const BG_BRIGHT_WHITE: Sgr = Sgr(107);

    /// Returns the code if it is on the allow-list.
    pub fn new(code: u8) -> Option<Sgr> {
        is_allowed(u32::from(code)).then_some(Sgr(code))
    }

    pub fn code(self) -> u8 {
        self.0
    }
}

/// Whether a numeric SGR parameter may be passed through to a terminal.
pub(crate) fn is_allowed(code: u32) -> bool {
    matches!(code, 0..=9 | 30..=37 | 40..=47 | 90..=97 | 100..=107)
}

impl TryFrom<u8> for Sgr {
    type Error = InvalidSgr;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Sgr::new(code).ok_or(InvalidSgr(code))
    }
}

impl From<Sgr> for u8 {
    fn from(sgr: Sgr) -> u8 {
        sgr.code()
    }
}

/// Error returned when an SGR code is outside the allow-list.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("SGR code {0} is not allowed")]
pub struct InvalidSgr(pub u8);

/// An ordered set of SGR codes applied together. Empty means unstyled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sgrs(pub Vec<Sgr>);

impl Sgrs {
    pub fn new(codes: impl IntoIterator<Item = Sgr>) -> Self {
        Sgrs(codes.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Writes `text` wrapped in this styling, followed by a reset.
    pub fn paint(&self, out: &mut String, text: &str) {
        if self.0.is_empty() {
            out.push_str(text);
            return;
        }
        out.push_str(&self.to_string());
        out.push_str(text);
        out.push_str("\x1b[0m");
    }
}

impl fmt::Display for Sgrs {
    /// Formats the escape sequence that enables this styling.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str("\x1b[")?;
        for (i, sgr) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", sgr.code())?;
        }
        f.write_str("m")
    }
}

impl<const N: usize> From<[Sgr; N]> for Sgrs {
    fn from(codes: [Sgr; N]) -> Self {
        Sgrs::new(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_boundaries() {
        for code in [0u8, 9, 30, 37, 40, 47, 90, 97, 100, 107] {
            assert!(Sgr::new(code).is_some(), "{code} should be allowed");
        }
        for code in [10u8, 29, 38, 39, 48, 49, 89, 98, 99, 108, 255] {
            assert!(Sgr::new(code).is_none(), "{code} should be rejected");
        }
    }

    #[test]
    fn paint_wraps_and_resets() {
        let mut out = String::new();
        Sgrs::from([Sgr::FG_RED, Sgr::BOLD]).paint(&mut out, "err");
        assert_eq!(out, "\x1b[31;1merr\x1b[0m");
    }

    #[test]
    fn empty_styling_paints_plain_text() {
        let mut out = String::new();
        Sgrs::default().paint(&mut out, "plain");
        assert_eq!(out, "plain");
    }

    #[test]
    fn deserialize_rejects_unsafe_codes() {
        let ok: Sgrs = serde_json::from_str("[32, 1]").unwrap();
        assert_eq!(ok, Sgrs::from([Sgr::FG_GREEN, Sgr::BOLD]));
        assert!(serde_json::from_str::<Sgrs>("[38]").is_err());
    }
}
