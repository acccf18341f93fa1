//! Ships log lines to CloudWatch Logs when running on EC2.
//!
//! The layer is part of the subscriber from the start but stays silent until
//! [`start_cloudwatch_logging`] attaches a shipper, which happens once the instance id is known.

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::core::client::logs::{LogLine, LogsClient, LogsError};
use crate::utils::logging::SpanFields;

/// Log group every worker writes to
pub const LOG_GROUP: &str = "curate";
/// Lines are sent at least this often
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(5);
/// Upper bound of lines per PutLogEvents call
pub const MAX_BATCH_SIZE: usize = 1000;

const SHIPPED_TARGET_PREFIX: &str = "curate";
// the shipper's own warnings would feed back into the stream it is failing to write
const SHIPPER_TARGET: &str = module_path!();

/// Where the layer drops formatted lines. Cloning shares the same destination.
#[derive(Clone, Debug, Default)]
pub struct CloudWatchSink {
    sender: Arc<OnceLock<mpsc::UnboundedSender<LogLine>>>,
}

impl CloudWatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects the sink to a shipper. Only the first call has an effect.
    pub fn attach(&self, sender: mpsc::UnboundedSender<LogLine>) -> bool {
        self.sender.set(sender).is_ok()
    }

    pub fn is_attached(&self) -> bool {
        self.sender.get().is_some()
    }

    fn send(&self, line: LogLine) {
        if let Some(sender) = self.sender.get() {
            // a stopped shipper only loses remote copies
            let _ = sender.send(line);
        }
    }
}

/// Formats events of this crate as single lines for the sink
pub struct CloudWatchLayer {
    sink: CloudWatchSink,
}

impl CloudWatchLayer {
    pub fn new(sink: CloudWatchSink) -> Self {
        Self { sink }
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "message" {
            self.message = value;
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

impl<S> Layer<S> for CloudWatchLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        if !self.sink.is_attached() {
            return;
        }
        let target = event.metadata().target();
        if !target.starts_with(SHIPPED_TARGET_PREFIX) || target.starts_with(SHIPPER_TARGET) {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let mut line = format!("{} {}: {}", event.metadata().level(), target, visitor.message);
        if let Some(span) = ctx.event_span(event) {
            if let Some(fields) = span.extensions().get::<SpanFields>() {
                let mut span_fields: Vec<_> = fields.raw_fields.iter().collect();
                span_fields.sort();
                for (key, value) in span_fields {
                    let _ = write!(line, " {}={}", key, value);
                }
            }
        }
        line.push_str(&visitor.fields);

        self.sink.send(LogLine { timestamp: Utc::now().timestamp_millis(), message: line });
    }
}

/// Creates the group and stream, then attaches a shipper task to `sink`.
///
/// # Arguments
/// * `client` - Remote log storage.
/// * `sink` - The sink installed by `init_logging`.
/// * `stream` - Stream name, the instance id.
///
/// # Returns
/// * `Result<JoinHandle<()>, LogsError>` - The shipper task, which ends once the sink is dropped.
pub async fn start_cloudwatch_logging(
    client: Box<dyn LogsClient>,
    sink: &CloudWatchSink,
    stream: &str,
) -> Result<JoinHandle<()>, LogsError> {
    client.create_log_group(LOG_GROUP).await?;
    client.create_log_stream(LOG_GROUP, stream).await?;

    let (sender, receiver) = mpsc::unbounded_channel();
    if !sink.attach(sender) {
        tracing::warn!("CloudWatch shipping already attached");
    }

    let stream = stream.to_string();
    Ok(tokio::spawn(async move { run_shipper(client, &stream, receiver, FLUSH_INTERVAL).await }))
}

/// Batches received lines and sends them on every tick, when a batch is full and when the
/// channel closes.
pub async fn run_shipper(
    client: Box<dyn LogsClient>,
    stream: &str,
    mut receiver: mpsc::UnboundedReceiver<LogLine>,
    flush_interval: Duration,
) {
    let mut batch = Vec::new();
    let mut ticker = tokio::time::interval(flush_interval);

    loop {
        tokio::select! {
            line = receiver.recv() => match line {
                Some(line) => {
                    batch.push(line);
                    if batch.len() >= MAX_BATCH_SIZE {
                        flush(client.as_ref(), stream, &mut batch).await;
                    }
                }
                None => {
                    flush(client.as_ref(), stream, &mut batch).await;
                    break;
                }
            },
            _ = ticker.tick() => flush(client.as_ref(), stream, &mut batch).await,
        }
    }
}

async fn flush(client: &dyn LogsClient, stream: &str, batch: &mut Vec<LogLine>) {
    if batch.is_empty() {
        return;
    }
    let lines = std::mem::take(batch);
    let count = lines.len();
    if let Err(e) = client.put_log_events(LOG_GROUP, stream, lines).await {
        tracing::warn!(error = %e, dropped = count, "Failed to ship log lines");
    }
}
