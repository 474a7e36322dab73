//! The internal log event type.
//!
//! Direct `tracing` calls and records bridged from the `log` facade both end
//! up here. Bridged records arrive as `tracing` events whose real call site
//! lives in `log.*` fields; [`NormalizeEvent`] recovers it so both paths
//! produce identical records.

use std::error::Error;
use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use tracing::field::{Field, Visit};
use tracing::{Event, Level};
use tracing_log::NormalizeEvent;

/// Field that carries the device a log line is about.
pub const DEVICE_FIELD: &str = "device";

/// Fields recorded on an event or span, in recording order.
#[derive(Debug, Clone, Default)]
pub struct ContextFields {
    /// The `device` tag, if recorded.
    pub device: Option<String>,
    /// Every other field as `(name, rendered value)`.
    pub fields: Vec<(String, String)>,
}

impl ContextFields {
    /// Merge `other` in, keeping recording order; a later device tag wins.
    pub fn extend(&mut self, other: &Self) {
        if other.device.is_some() {
            self.device.clone_from(&other.device);
        }
        self.fields.extend(other.fields.iter().cloned());
    }
}

/// A single log line before rendering.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Severity.
    pub level: Level,
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
    /// Module path of the call site.
    pub module: String,
    /// Source line of the call site.
    pub line: Option<u32>,
    /// Span fields from the root down, then the event's own fields.
    pub context: ContextFields,
    /// The message as written at the call site.
    pub message: String,
    /// Error sources attached to the event, outermost first.
    pub causes: Vec<String>,
}

impl LogRecord {
    /// Build a record from a `tracing` event and the fields of its enclosing spans.
    #[must_use]
    pub fn from_event(event: &Event<'_>, mut context: ContextFields) -> Self {
        let normalized = event.normalized_metadata();
        let meta = normalized.as_ref().unwrap_or_else(|| event.metadata());

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        context.extend(&visitor.context);

        Self {
            level: *meta.level(),
            timestamp: Utc::now(),
            module: meta.module_path().unwrap_or_else(|| meta.target()).to_string(),
            line: meta.line(),
            context,
            message: visitor.message.unwrap_or_default(),
            causes: visitor.causes,
        }
    }

    /// Render the record as a single output line (plus cause lines).
    ///
    /// ```text
    /// 2026-10-19 12:00:00.000 | INFO     | my_crate::module:42 - edge-r1 - message key=value
    /// ```
    #[must_use]
    pub fn render(&self, include_causes: bool) -> String {
        let mut out = String::with_capacity(128 + self.message.len());
        let _ = write!(
            out,
            "{} | {:<8} | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level.as_str(),
            self.module,
        );
        if let Some(line) = self.line {
            let _ = write!(out, ":{line}");
        }
        out.push_str(" - ");
        if let Some(device) = &self.context.device {
            let _ = write!(out, "{device} - ");
        }
        out.push_str(&self.message);
        for (name, value) in &self.context.fields {
            let _ = write!(out, " {name}={value}");
        }
        if include_causes {
            for cause in &self.causes {
                let _ = write!(out, "\n    caused by: {cause}");
            }
        }
        out.push('\n');
        out
    }
}

/// Collects message, device tag, other fields and error chains.
#[derive(Default)]
pub(crate) struct FieldVisitor {
    pub(crate) message: Option<String>,
    pub(crate) context: ContextFields,
    pub(crate) causes: Vec<String>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            DEVICE_FIELD => self.context.device = Some(value),
            // Call-site metadata of bridged `log` records
            name if name.starts_with("log.") => {}
            name => self.context.fields.push((name.to_string(), value)),
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" | DEVICE_FIELD => self.push(field, value.to_string()),
            _ => self.push(field, format!("\"{value}\"")),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.push(field, value.to_string());
        let mut source = value.source();
        while let Some(cause) = source {
            self.causes.push(cause.to_string());
            source = cause.source();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}
