use proptest::prelude::*;

use termlog::ansi::{sanitize, strip};

const ALLOWED: &[&str] = &[
    "", "0", "1", "2", "3", "4", "5", "7", "9", "31", "37", "40", "47", "90", "97", "100", "107",
];

/// Text built from fragments that tend to form escape sequences.
fn escape_heavy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("\x1b[".to_string()),
        Just("\x1b".to_string()),
        Just("[".to_string()),
        Just(";".to_string()),
        Just("m".to_string()),
        Just("H".to_string()),
        Just("J".to_string()),
        Just("\0".to_string()),
        Just("\r".to_string()),
        Just("\n".to_string()),
        Just("\u{202e}".to_string()),
        Just("é".to_string()),
        "[0-9]{1,3}",
        "[a-z ]{1,4}",
    ];
    proptest::collection::vec(fragment, 0..40).prop_map(|parts| parts.concat())
}

fn safe_sgr() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::sample::select(ALLOWED), 1..4)
        .prop_map(|params| format!("\x1b[{}m", params.join(";")))
}

/// Text mixing printable runs with allow-listed SGR sequences only.
fn safe_text() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![safe_sgr(), "[a-zA-Z0-9 ;\\[\\]]{0,8}", Just("\t\n".to_string())];
    proptest::collection::vec(fragment, 0..16).prop_map(|parts| parts.concat())
}

/// Every CSI sequence in `text` as (parameters, command).
fn csi_sequences(text: &str) -> Vec<(String, Option<char>)> {
    text.match_indices("\x1b[")
        .map(|(at, _)| {
            let after = &text[at + 2..];
            let params: String = after
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == ';')
                .collect();
            let command = after[params.len()..].chars().next();
            (params, command)
        })
        .collect()
}

fn param_allowed(param: &str) -> bool {
    param.is_empty()
        || matches!(param.parse::<u32>(), Ok(0..=9 | 30..=37 | 40..=47 | 90..=97 | 100..=107))
}

proptest! {
    #[test]
    fn strip_is_idempotent(text in escape_heavy()) {
        let once = strip(&text).into_owned();
        prop_assert_eq!(strip(&once).into_owned(), once);
    }

    #[test]
    fn strip_is_idempotent_on_arbitrary_text(text in any::<String>()) {
        let once = strip(&text).into_owned();
        prop_assert_eq!(strip(&once).into_owned(), once);
    }

    #[test]
    fn strip_leaves_no_escape_byte(text in escape_heavy()) {
        let out = strip(&text);
        prop_assert!(!out.contains("\x1b["));
        prop_assert!(!out.contains('\x1b'));
    }

    #[test]
    fn sanitize_keeps_safe_text_unchanged(text in safe_text()) {
        prop_assert_eq!(sanitize(&text).into_owned(), text);
    }

    #[test]
    fn sanitize_leaves_only_allowed_sgr(text in escape_heavy()) {
        let out = sanitize(&text);
        for (params, command) in csi_sequences(&out) {
            prop_assert_eq!(command, Some('m'));
            prop_assert!(params.split(';').all(param_allowed), "params {:?}", params);
        }
    }

    #[test]
    fn output_has_no_raw_control_characters(text in escape_heavy()) {
        for out in [strip(&text), sanitize(&text)] {
            prop_assert!(out
                .chars()
                .all(|c| c == '\t' || c == '\n' || c == '\x1b' || !c.is_control()));
        }
    }
}
