//! Structured logging.
//!
//! Every record is a single JSON object on its own line:
//!
//! ```text
//! {"ts":"2025-08-25T10:00:00.000Z","level":"info","service":"porttrack-api","env":"dev","msg":"list ships","count":2}
//! ```
//!
//! Fields of enclosing spans are merged in after the fixed keys, then the
//! event's own fields. Later keys win, so an event may override any of the
//! fixed keys.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{JsonFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{Config, LogFormat, ServiceConfig};
use crate::error::{PortTrackError, Result};

/// Event formatter producing one JSON record per line.
#[derive(Debug, Clone)]
pub struct RecordFormat {
    service: String,
    env: String,
}

impl RecordFormat {
    /// Creates a formatter stamping `service` and `env` on every record.
    pub fn new(service: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            env: env.into(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let mut record = Map::new();
        record.insert("ts".into(), Value::String(timestamp()));
        record.insert("level".into(), level_name(event.metadata().level()).into());
        record.insert("service".into(), Value::String(self.service.clone()));
        record.insert("env".into(), Value::String(self.env.clone()));
        record.insert("msg".into(), visitor.message.unwrap_or_default().into());

        // Span fields are stored pre-rendered by `JsonFields`.
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    let parsed = serde_json::from_str::<Value>(fields.as_str());
                    if let Ok(Value::Object(fields)) = parsed {
                        record.extend(fields);
                    }
                }
            }
        }

        record.extend(visitor.fields);

        let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        _ => "error",
    }
}

/// Collects event fields as JSON values.
#[derive(Default)]
struct RecordVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl RecordVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{:?}", value);
        match field.name() {
            "message" => self.message = Some(text),
            name if JSON_FIELDS.contains(&name) => {
                let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
                self.insert(field, value);
            }
            _ => self.insert(field, Value::String(text)),
        }
    }
}

/// Fields recorded as pre-rendered JSON (see [`json_field`]). Every other
/// field is written as a string.
pub const JSON_FIELDS: &[&str] = &["keys"];

/// Renders `value` for a field listed in [`JSON_FIELDS`].
///
/// ```ignore
/// info!(keys = %json_field(&names), "Loaded secret");
/// ```
pub fn json_field<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Builds the JSON record layer writing to `writer`.
pub fn record_layer<S, W>(service: &ServiceConfig, writer: W) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .fmt_fields(JsonFields::new())
        .event_format(RecordFormat::new(&service.name, &service.env))
        .with_writer(writer)
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_directive()));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.logging.format {
        LogFormat::Json => registry
            .with(record_layer(&config.service, std::io::stdout))
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
    };

    installed.map_err(|e| PortTrackError::config_with_source("Failed to install logger", e))
}
