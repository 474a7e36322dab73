//! The structured, secret-redacting log sink.

use std::io::Write;

use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::record::{ContextFields, FieldVisitor, LogRecord};
use crate::redact::Redactor;

/// A [`Layer`] that renders every event as a [`LogRecord`], scrubs it, and
/// writes it to `W`.
///
/// Span fields (such as a `device` tag) are carried into every event emitted
/// inside the span.
pub struct RedactingLayer<W> {
    make_writer: W,
    redactor: Redactor,
    include_causes: bool,
}

impl<W> RedactingLayer<W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    /// Create a layer writing to `make_writer` with the default scrub rules.
    #[must_use]
    pub fn new(make_writer: W) -> Self {
        Self {
            make_writer,
            redactor: Redactor::default(),
            include_causes: false,
        }
    }

    /// Replace the scrub rules.
    #[must_use]
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Print error cause chains under each line.
    #[must_use]
    pub fn with_causes(mut self, include_causes: bool) -> Self {
        self.include_causes = include_causes;
        self
    }
}

impl<S, W> Layer<S> for RedactingLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(visitor.context);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<ContextFields>() {
            fields.extend(&visitor.context);
        } else {
            extensions.insert(visitor.context);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut context = ContextFields::default();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(fields) = span.extensions().get::<ContextFields>() {
                    context.extend(fields);
                }
            }
        }

        let record = LogRecord::from_event(event, context);
        let line = self.redactor.redact(&record.render(self.include_causes));

        let mut writer = self.make_writer.make_writer_for(event.metadata());
        // Logging must never fail the caller
        let _ = writer.write_all(line.as_bytes());
    }
}
