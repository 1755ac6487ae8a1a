//! Structured log handlers for terminals.
//!
//! A [`Handler`] receives [`Record`]s and renders or forwards them. The
//! terminal handlers lay records out as an indented tree or as one line per
//! record, and sanitize everything they print so log contents cannot move
//! the cursor, clear the screen or smuggle other escape sequences. Values
//! may carry their own SGR styling through [`LogValue::terminal_value`],
//! which survives sanitization when colors are on.
//!
//! [`MultiHandler`] fans records out, [`BufferedHandler`] holds them until
//! flushed, and [`HandlerLayer`] feeds `tracing` events and spans into any
//! handler.

pub mod ansi;
pub mod buffered;
pub mod color;
pub mod config;
pub mod env;
pub mod handler;
pub mod init;
#[cfg(feature = "json")]
pub mod json;
pub mod layer;
pub mod multi;
pub mod record;
pub mod state;
pub mod terminal;
pub mod value;

pub use buffered::BufferedHandler;
pub use color::{ColorScheme, Palette};
pub use config::{parse_flag, parse_level, ConfigError, HandlerConfig, HandlerKind};
pub use handler::{HandleError, Handler, ReplaceAttr};
pub use init::{init_logging, init_logging_with_config, InitError};
#[cfg(feature = "json")]
pub use json::{JsonHandler, JsonOptions};
pub use layer::HandlerLayer;
pub use multi::MultiHandler;
pub use record::{Record, Source};
pub use state::HandlerState;
pub use terminal::{Layout, TerminalHandler, TerminalOptions};
pub use value::{Attr, LogValue, TerminalValue, Value};

pub use tracing::Level;
