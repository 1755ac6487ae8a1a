use crate::handler::{HandleError, Handler};
use crate::record::Record;
use crate::value::Attr;
use std::sync::Arc;
use tracing::Level;

/// Forwards every record to several handlers.
///
/// Each delegate applies its own level check. A failing delegate does not
/// stop the others; all failures are reported together.
#[derive(Clone)]
pub struct MultiHandler {
    handlers: Arc<[Arc<dyn Handler>]>,
}

impl MultiHandler {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        MultiHandler {
            handlers: handlers.into(),
        }
    }
}

impl Handler for MultiHandler {
    fn enabled(&self, level: Level) -> bool {
        self.handlers.iter().any(|h| h.enabled(level))
    }

    fn handle(&self, record: &Record) -> Result<(), HandleError> {
        let errors = self
            .handlers
            .iter()
            .filter(|h| h.enabled(record.level))
            .filter_map(|h| h.handle(record).err())
            .collect();
        HandleError::collect(errors)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(MultiHandler::new(
            self.handlers
                .iter()
                .map(|h| h.with_attrs(attrs.clone()))
                .collect(),
        ))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(MultiHandler::new(
            self.handlers.iter().map(|h| h.with_group(name)).collect(),
        ))
    }
}
