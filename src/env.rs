//! Environment variable names for selecting a handler without code changes.
//!
//! These are purely helpers; handlers themselves never read the environment.

use crate::config::{parse_flag, parse_level, ConfigError, HandlerConfig};

/// Handler name: `tree`, `line` or `json`.
pub const TERMLOG_HANDLER_ENV: &str = "TERMLOG_HANDLER";

/// Minimum level, e.g. `debug`.
pub const TERMLOG_LEVEL_ENV: &str = "TERMLOG_LEVEL";

/// Set to a true value to append the call site to each record.
pub const TERMLOG_ADD_SOURCE_ENV: &str = "TERMLOG_ADD_SOURCE";

/// Set to a true value to show local time on terminal handlers.
pub const TERMLOG_TIME_ENV: &str = "TERMLOG_TIME";

/// Set to a true value to emit colors even when not writing to a terminal.
pub const TERMLOG_FORCE_COLOR_ENV: &str = "TERMLOG_FORCE_COLOR";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str) -> Result<bool, ConfigError> {
    parse_flag(key, &env_or(key, ""))
}

/// Build a [`HandlerConfig`] from the `TERMLOG_*` variables.
///
/// Unset variables keep their [`HandlerConfig::default`] values. Switches
/// that are set to anything but a boolean are rejected.
pub fn config_from_env() -> Result<HandlerConfig, ConfigError> {
    let defaults = HandlerConfig::default();
    let handler = match std::env::var(TERMLOG_HANDLER_ENV) {
        Ok(name) => name.trim().parse()?,
        Err(_) => defaults.handler,
    };
    let level = match std::env::var(TERMLOG_LEVEL_ENV) {
        Ok(text) => parse_level(text.trim())?,
        Err(_) => defaults.level,
    };
    Ok(HandlerConfig {
        handler,
        level,
        add_source: env_flag(TERMLOG_ADD_SOURCE_ENV)?,
        time: env_flag(TERMLOG_TIME_ENV)?,
        force_color: env_flag(TERMLOG_FORCE_COLOR_ENV)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flag_is_off() {
        assert_eq!(env_flag("TERMLOG_TEST_SURELY_UNSET_FLAG"), Ok(false));
    }

    #[test]
    fn unrecognized_flag_is_an_error() {
        std::env::set_var("TERMLOG_TEST_BAD_FLAG", "maybe");
        assert_eq!(
            env_flag("TERMLOG_TEST_BAD_FLAG"),
            Err(ConfigError::InvalidFlag {
                name: "TERMLOG_TEST_BAD_FLAG".to_string(),
                value: "maybe".to_string(),
            })
        );
    }

    #[test]
    fn env_or_falls_back_for_missing_keys() {
        assert_eq!(env_or("TERMLOG_TEST_SURELY_UNSET_VARIABLE", "dflt"), "dflt");
    }
}
