//! Removal and filtering of ANSI control sequences in untrusted text.
//!
//! [`strip`] drops every CSI sequence and is used for plain-text renderings.
//! [`sanitize`] keeps SGR sequences whose parameters are all on the
//! allow-list and drops everything else. Both escape control characters into
//! a visible backslash form, except tab and newline which are passed through.
//!
//! Malformed sequences get the same treatment in both modes: parameters
//! followed by a byte that cannot end a sequence are dropped, and a bare
//! introducer stays visible as escaped text.

use std::borrow::Cow;
use std::fmt::Write as _;

const CSI: &str = "\x1b[";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strip,
    Sanitize,
}

/// Removes every CSI sequence from `text` and escapes control characters.
pub fn strip(text: &str) -> Cow<'_, str> {
    scan(text, Mode::Strip)
}

/// Keeps only allow-listed SGR sequences and escapes control characters.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    scan(text, Mode::Sanitize)
}

enum Csi<'a> {
    /// Parameters followed by a final byte in `@`..=`~`.
    Complete { params: &'a str, command: char },
    /// Parameters followed by something that is not a command byte.
    Invalid { params: &'a str },
    /// Input ended before a command byte.
    Incomplete,
}

/// Parses what follows a CSI introducer.
fn parse_csi(after: &str) -> Csi<'_> {
    let params_len = after
        .bytes()
        .take_while(|b| (0x30..=0x3f).contains(b))
        .count();
    let params = &after[..params_len];
    match after[params_len..].chars().next() {
        None => Csi::Incomplete,
        Some(command) if ('\x40'..='\x7e').contains(&command) => {
            Csi::Complete { params, command }
        }
        Some(_) => Csi::Invalid { params },
    }
}

fn is_safe_sgr(params: &str, command: char) -> bool {
    command == 'm'
        && params.split(';').all(|param| {
            param.is_empty()
                || param
                    .parse::<u32>()
                    .map_or(false, super::is_allowed)
        })
}

fn scan(text: &str, mode: Mode) -> Cow<'_, str> {
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix(CSI) {
            match parse_csi(after) {
                Csi::Incomplete => break,
                Csi::Complete { params, command } => {
                    let len = CSI.len() + params.len() + command.len_utf8();
                    if mode == Mode::Sanitize && is_safe_sgr(params, command) {
                        out.push_str(&rest[..len]);
                    }
                    rest = &rest[len..];
                    continue;
                }
                Csi::Invalid { params } if !params.is_empty() => {
                    // Drop introducer and parameters; the offending byte is
                    // handled as ordinary text.
                    rest = &after[params.len()..];
                    continue;
                }
                Csi::Invalid { .. } => {
                    push_escaped(&mut out, '\x1b');
                    out.push('[');
                    rest = after;
                    continue;
                }
            }
        }

        if needs_escape(c) {
            push_escaped(&mut out, c);
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

fn needs_escape(c: char) -> bool {
    match c {
        '\t' | '\n' => false,
        // Bidirectional overrides can visually reorder the rest of a line.
        '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}' => true,
        c => c.is_control(),
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '\x07' => out.push_str("\\a"),
        '\x08' => out.push_str("\\b"),
        '\x0b' => out.push_str("\\v"),
        '\x0c' => out.push_str("\\f"),
        '\r' => out.push_str("\\r"),
        c if c.is_ascii() => {
            let _ = write!(out, "\\x{:02x}", c as u32);
        }
        c => {
            let _ = write!(out, "\\u{:04x}", c as u32);
        }
    }
}
