pub mod lenient;
pub mod signal;
pub mod time_format;

use std::fmt;

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Console output: dim timestamp, coloured level, then the message.
struct ConsoleLayer;

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let Some(message) = visitor.message else {
            return;
        };
        let timestamp = Local::now().format("%b %d %H:%M:%S");
        let (color_code, level_str) = level_style(event.metadata().level());
        println!(
            "\x1b[2m{}\x1b[0m {}{:>5}\x1b[0m {}{}",
            timestamp, color_code, level_str, message, visitor.fields
        );
    }
}

fn level_style(level: &tracing::Level) -> (&'static str, &'static str) {
    match *level {
        tracing::Level::ERROR => ("\x1b[31m", "ERROR"),
        tracing::Level::WARN => ("\x1b[33m", " WARN"),
        tracing::Level::INFO => ("\x1b[32m", " INFO"),
        tracing::Level::DEBUG => ("\x1b[36m", "DEBUG"),
        tracing::Level::TRACE => ("\x1b[35m", "TRACE"),
    }
}

/// Collects the `message` field plus any structured fields as ` key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push_str(&format!(" {}={}", field.name(), value));
        }
    }
}

pub fn init_logger(log_level: &str) -> anyhow::Result<()> {
    let console_layer = ConsoleLayer.with_filter(build_console_filter(log_level));
    tracing_subscriber::registry().with(console_layer).try_init()?;
    Ok(())
}

/// Keeps dependency chatter (sqlx slow-query warnings and the like) out of the console.
fn build_console_filter(base_level: &str) -> EnvFilter {
    EnvFilter::builder().parse_lossy(format!(
        "{},\
            sqlx::query=error,\
            sqlx=error,\
            sea_orm::database=error,\
            sea_orm_migration=warn,\
            hyper=warn,\
            reqwest=warn,\
            h2=warn",
        base_level
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_filter_keeps_base_level() {
        let filter = build_console_filter("debug");
        let rendered = filter.to_string();
        assert!(rendered.contains("debug"));
        assert!(rendered.contains("sqlx=error"));
        assert!(rendered.contains("hyper=warn"));
    }

    #[test]
    fn test_level_style() {
        assert_eq!(level_style(&tracing::Level::WARN).1, " WARN");
        assert_eq!(level_style(&tracing::Level::ERROR).0, "\x1b[31m");
    }
}
