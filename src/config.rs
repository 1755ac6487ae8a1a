use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use tracing::Level;

use crate::handler::Handler;
use crate::terminal::{Layout, TerminalHandler, TerminalOptions};

/// Time layout used when terminal timestamps are switched on.
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Handlers that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerKind {
    #[default]
    Tree,
    Line,
    Json,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 3] = [HandlerKind::Tree, HandlerKind::Line, HandlerKind::Json];

    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::Tree => "tree",
            HandlerKind::Line => "line",
            HandlerKind::Json => "json",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a handler name.
///
/// Accepts `tree`, `line` and `json`, plus `terminal-tree` / `terminal-line`.
impl FromStr for HandlerKind {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "tree" | "terminal-tree" => Ok(HandlerKind::Tree),
            "line" | "terminal-line" => Ok(HandlerKind::Line),
            "json" => Ok(HandlerKind::Json),
            _ => Err(ConfigError::UnknownHandler(name.to_string())),
        }
    }
}

/// Parse a minimum level such as `debug` or `WARN`.
pub fn parse_level(text: &str) -> Result<Level, ConfigError> {
    if text.eq_ignore_ascii_case("warning") {
        return Ok(Level::WARN);
    }
    text.parse::<Level>()
        .map_err(|_| ConfigError::InvalidLevel(text.to_string()))
}

/// Parse an on/off switch; empty text counts as off.
pub fn parse_flag(name: &str, text: &str) -> Result<bool, ConfigError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::InvalidFlag {
            name: name.to_string(),
            value: text.to_string(),
        }),
    }
}

/// Error type returned when configuration values are rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid log handler name '{0}', valid options are [tree|line|json]")]
    UnknownHandler(String),

    #[error("invalid log level '{0}', valid options are [trace|debug|info|warn|error]")]
    InvalidLevel(String),

    #[error("invalid value '{value}' for {name}, expected true or false")]
    InvalidFlag { name: String, value: String },

    #[error("json feature is not enabled")]
    JsonFeatureDisabled,
}

/// Handler selection and the handful of switches exposed to end users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub handler: HandlerKind,
    pub level: Level,
    pub add_source: bool,
    /// Show local time on terminal handlers, using [`DEFAULT_TIME_LAYOUT`].
    pub time: bool,
    pub force_color: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            handler: HandlerKind::default(),
            level: Level::INFO,
            add_source: false,
            time: false,
            force_color: false,
        }
    }
}

impl HandlerConfig {
    /// Build config from textual handler and level names.
    pub fn parse(handler: &str, level: &str) -> Result<Self, ConfigError> {
        Ok(HandlerConfig {
            handler: handler.parse()?,
            level: parse_level(level)?,
            ..Default::default()
        })
    }

    pub fn terminal_options(&self) -> TerminalOptions {
        TerminalOptions {
            level: self.level,
            add_source: self.add_source,
            time_layout: self.time.then(|| DEFAULT_TIME_LAYOUT.to_string()),
            force_color: self.force_color,
            ..Default::default()
        }
    }

    /// Create the configured handler writing to `writer`.
    ///
    /// This is the main entry point for applications that select a handler
    /// by name instead of constructing one directly.
    pub fn build<W>(&self, writer: W) -> Result<Arc<dyn Handler>, ConfigError>
    where
        W: Write + Send + 'static,
    {
        match self.handler {
            HandlerKind::Tree => Ok(Arc::new(TerminalHandler::new(
                Layout::Tree,
                writer,
                self.terminal_options(),
            ))),
            HandlerKind::Line => Ok(Arc::new(TerminalHandler::new(
                Layout::Line,
                writer,
                self.terminal_options(),
            ))),
            HandlerKind::Json => {
                #[cfg(feature = "json")]
                {
                    use crate::json::{JsonHandler, JsonOptions};

                    let options = JsonOptions {
                        level: self.level,
                        add_source: self.add_source,
                        ..Default::default()
                    };
                    Ok(Arc::new(JsonHandler::new(writer, options)))
                }

                #[cfg(not(feature = "json"))]
                {
                    let _ = writer;
                    Err(ConfigError::JsonFeatureDisabled)
                }
            }
        }
    }
}
