use crate::handler::Handler;
use crate::record::{Record, Source};
use crate::value::{Attr, Value};
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::{LookupSpan, SpanRef};

/// `tracing_subscriber` layer that turns events into [`Record`]s for a
/// [`Handler`].
///
/// Each span opens a group named after the span, holding the span's fields.
/// The derived handler is cached in the span's extensions, so an event only
/// pays for its own fields.
pub struct HandlerLayer {
    handler: Arc<dyn Handler>,
}

/// Handler derived for one span, stored in the registry's span extensions.
struct SpanHandler(Arc<dyn Handler>);

impl HandlerLayer {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    fn handler_for<S>(&self, span: Option<SpanRef<'_, S>>) -> Arc<dyn Handler>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        span.and_then(|span| span.extensions().get::<SpanHandler>().map(|h| h.0.clone()))
            .unwrap_or_else(|| self.handler.clone())
    }
}

impl<S> Layer<S> for HandlerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        metadata.is_span() || self.handler.enabled(*metadata.level())
    }

    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let parent = self.handler_for(span.parent());

        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        let handler = parent
            .with_group(span.name())
            .with_attrs(visitor.into_span_attrs());
        span.extensions_mut().insert(SpanHandler(handler));
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);
        let attrs = visitor.into_span_attrs();
        if attrs.is_empty() {
            return;
        }

        let mut extensions = span.extensions_mut();
        if let Some(current) = extensions.get_mut::<SpanHandler>() {
            current.0 = current.0.with_attrs(attrs);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = *meta.level();
        let handler = self.handler_for(ctx.event_span(event));
        if !handler.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record =
            Record::new(level, visitor.message.unwrap_or_default()).with_attrs(visitor.attrs);
        if let Some(file) = meta.file() {
            record = record.with_source(Source {
                file: file.to_string(),
                line: meta.line(),
                function: meta.module_path().map(|s| s.to_string()),
            });
        }

        if let Err(e) = handler.handle(&record) {
            eprintln!("error writing log record: {}", e);
        }
    }
}

/// Collects `tracing` fields as [`Attr`]s, keeping the `message` field apart.
#[derive(Default)]
pub struct FieldVisitor {
    pub attrs: Vec<Attr>,
    pub message: Option<String>,
}

impl FieldVisitor {
    /// Span fields have no message slot; a `message` field stays an attribute.
    fn into_span_attrs(mut self) -> Vec<Attr> {
        if let Some(message) = self.message.take() {
            self.attrs.insert(0, Attr::new("message", message));
        }
        self.attrs
    }

    fn push(&mut self, field: &Field, value: impl Into<Value>) {
        self.attrs.push(Attr::new(field.name(), value));
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push(field, value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, format!("{:?}", value));
        }
    }
}
