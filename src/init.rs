use crate::config::{ConfigError, HandlerConfig};
use crate::handler::Handler;
use crate::layer::HandlerLayer;
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Error type returned when the global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to set global subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Route every `tracing` event in the process to `handler`.
///
/// **Parameters**
/// - `handler`: implementation of [`Handler`] receiving one [`crate::Record`]
///   per enabled event.
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`HandlerLayer`] as the global
/// default subscriber. Fails if a global subscriber is already set.
pub fn init_logging(handler: Arc<dyn Handler>) -> Result<(), InitError> {
    let subscriber = Registry::default().with(HandlerLayer::new(handler));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Build the handler described by `config` and install it globally.
///
/// Equivalent to [`HandlerConfig::build`] followed by [`init_logging`].
/// Typical callers pass `std::io::stderr()`.
pub fn init_logging_with_config<W>(config: &HandlerConfig, writer: W) -> Result<(), InitError>
where
    W: Write + Send + 'static,
{
    init_logging(config.build(writer)?)
}
