use crate::record::Record;
use crate::value::Attr;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::Level;

/// Rewrites or drops an attribute before it is rendered.
///
/// Receives the group path leading to the attribute and the attribute as it
/// was logged. Group attributes are not passed, their members are.
pub type ReplaceAttr = Arc<dyn Fn(&[&str], Attr) -> Option<Attr> + Send + Sync>;

/// Destination for [`Record`]s: renders them, forwards them, or both.
///
/// Implementations are immutable once built. `with_group` and `with_attrs`
/// return new handlers and leave the receiver untouched, so handlers derived
/// from a common ancestor can be used from different threads.
pub trait Handler: Send + Sync {
    /// Whether a record at `level` would be handled.
    ///
    /// Callers should check this before building a record.
    fn enabled(&self, level: Level) -> bool;

    /// Handle a single record.
    ///
    /// **Parameters**
    /// - `record`: fully-populated [`Record`] for one logging call.
    ///
    /// **Returns**
    /// - `Ok(())` once the record was written or forwarded.
    /// - `Err(..)` if writing to the underlying sink failed. Handlers never
    ///   retry; malformed record contents are rendered, not reported.
    fn handle(&self, record: &Record) -> Result<(), HandleError>;

    /// A handler whose records carry `attrs` in the current group.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// A handler whose subsequent attributes are nested under `name`.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}

/// Error type returned by [`Handler::handle`].
#[derive(thiserror::Error, Debug)]
pub enum HandleError {
    #[error("failed to write log record: {0}")]
    Io(#[from] io::Error),

    #[error("{}", MultiDisplay(.0))]
    Multi(Vec<HandleError>),
}

impl HandleError {
    /// Folds a list of delegate failures into a single result.
    pub fn collect(mut errors: Vec<HandleError>) -> Result<(), HandleError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(HandleError::Multi(errors)),
        }
    }
}

struct MultiDisplay<'a>(&'a [HandleError]);

impl fmt::Display for MultiDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} handlers failed", self.0.len())?;
        for err in self.0 {
            write!(f, "; {err}")?;
        }
        Ok(())
    }
}
