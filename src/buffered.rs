use crate::handler::{HandleError, Handler};
use crate::record::Record;
use crate::value::Attr;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::Level;

struct Pending {
    handler: Arc<dyn Handler>,
    record: Record,
}

/// Holds records back until [`BufferedHandler::flush`] is called.
///
/// Handlers derived with `with_group` / `with_attrs` share the queue of the
/// handler they came from, so one flush releases everything logged through
/// any of them, in arrival order.
#[derive(Clone)]
pub struct BufferedHandler {
    handler: Arc<dyn Handler>,
    queue: Arc<Mutex<Vec<Pending>>>,
}

impl BufferedHandler {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        BufferedHandler {
            handler,
            queue: Arc::default(),
        }
    }

    /// Forward every queued record to the wrapped handler and empty the queue.
    ///
    /// **Returns**
    /// - `Ok(())` if every record was handled.
    /// - `Err(..)` with the failures of the wrapped handler. Records that
    ///   failed are not queued again.
    pub fn flush(&self) -> Result<(), HandleError> {
        let mut queue = self.queue.lock();
        let errors = queue
            .drain(..)
            .filter_map(|pending| pending.handler.handle(&pending.record).err())
            .collect();
        HandleError::collect(errors)
    }

    /// Number of records waiting for the next flush.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    fn derive(&self, handler: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(BufferedHandler {
            handler,
            queue: Arc::clone(&self.queue),
        })
    }
}

impl Handler for BufferedHandler {
    fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(level)
    }

    fn handle(&self, record: &Record) -> Result<(), HandleError> {
        self.queue.lock().push(Pending {
            handler: Arc::clone(&self.handler),
            record: record.clone(),
        });
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        self.derive(self.handler.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        self.derive(self.handler.with_group(name))
    }
}
