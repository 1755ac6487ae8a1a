use crate::ansi::{Sgr, Sgrs};
use serde::Deserialize;
use tracing::Level;

/// Styling for every role a terminal handler paints.
///
/// Every entry is optional; missing entries are filled from
/// [`Palette::default`] when a handler is built. `Some(Sgrs::default())`
/// explicitly leaves a role unstyled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub group_name: Option<Sgrs>,
    pub attr_key: Option<Sgrs>,
    pub attr_value: Option<Sgrs>,
    pub time: Option<Sgrs>,
    pub level_trace: Option<Sgrs>,
    pub message_trace: Option<Sgrs>,
    pub level_debug: Option<Sgrs>,
    pub message_debug: Option<Sgrs>,
    pub level_info: Option<Sgrs>,
    pub message_info: Option<Sgrs>,
    pub level_warn: Option<Sgrs>,
    pub message_warn: Option<Sgrs>,
    pub level_error: Option<Sgrs>,
    pub message_error: Option<Sgrs>,
    pub file: Option<Sgrs>,
    pub line: Option<Sgrs>,
    pub function: Option<Sgrs>,
}

/// A [`ColorScheme`] with every role resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub group_name: Sgrs,
    pub attr_key: Sgrs,
    pub attr_value: Sgrs,
    pub time: Sgrs,
    pub level_trace: Sgrs,
    pub message_trace: Sgrs,
    pub level_debug: Sgrs,
    pub message_debug: Sgrs,
    pub level_info: Sgrs,
    pub message_info: Sgrs,
    pub level_warn: Sgrs,
    pub message_warn: Sgrs,
    pub level_error: Sgrs,
    pub message_error: Sgrs,
    pub file: Sgrs,
    pub line: Sgrs,
    pub function: Sgrs,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            group_name: Sgrs::from([Sgr::FG_BLUE, Sgr::BOLD]),
            attr_key: Sgrs::from([Sgr::FG_CYAN]),
            attr_value: Sgrs::default(),
            time: Sgrs::from([Sgr::DIM]),
            level_trace: Sgrs::from([Sgr::FG_MAGENTA]),
            message_trace: Sgrs::from([Sgr::DIM]),
            level_debug: Sgrs::from([Sgr::FG_BRIGHT_BLACK, Sgr::BOLD]),
            message_debug: Sgrs::from([Sgr::FG_BRIGHT_BLACK]),
            level_info: Sgrs::from([Sgr::FG_GREEN, Sgr::BOLD]),
            message_info: Sgrs::from([Sgr::BOLD]),
            level_warn: Sgrs::from([Sgr::FG_YELLOW, Sgr::BOLD]),
            message_warn: Sgrs::from([Sgr::FG_YELLOW]),
            level_error: Sgrs::from([Sgr::FG_RED, Sgr::BOLD]),
            message_error: Sgrs::from([Sgr::FG_RED, Sgr::BOLD]),
            file: Sgrs::from([Sgr::DIM]),
            line: Sgrs::from([Sgr::DIM]),
            function: Sgrs::from([Sgr::DIM, Sgr::ITALIC]),
        }
    }
}

impl Palette {
    /// Completes `scheme` with the built-in defaults.
    pub fn from_scheme(scheme: &ColorScheme) -> Self {
        Self::from_scheme_with(scheme, Palette::default())
    }

    /// Completes `scheme` with entries from `defaults`.
    pub fn from_scheme_with(scheme: &ColorScheme, defaults: Palette) -> Self {
        macro_rules! pick {
            ($($field:ident),*) => {
                Palette {
                    $($field: scheme.$field.clone().unwrap_or(defaults.$field),)*
                }
            };
        }
        pick!(
            group_name,
            attr_key,
            attr_value,
            time,
            level_trace,
            message_trace,
            level_debug,
            message_debug,
            level_info,
            message_info,
            level_warn,
            message_warn,
            level_error,
            message_error,
            file,
            line,
            function
        )
    }

    pub fn level(&self, level: Level) -> &Sgrs {
        match level {
            Level::TRACE => &self.level_trace,
            Level::DEBUG => &self.level_debug,
            Level::INFO => &self.level_info,
            Level::WARN => &self.level_warn,
            _ => &self.level_error,
        }
    }

    pub fn message(&self, level: Level) -> &Sgrs {
        match level {
            Level::TRACE => &self.message_trace,
            Level::DEBUG => &self.message_debug,
            Level::INFO => &self.message_info,
            Level::WARN => &self.message_warn,
            _ => &self.message_error,
        }
    }
}
