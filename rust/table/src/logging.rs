use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::field::{Field, Visit};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,headsup_table=debug,headsup_engine=debug";

/// Output format of [`init_logging`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// One event as seen by [`TestLogSubscriber`]
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Structured fields other than `message`, rendered to text
    pub fields: BTreeMap<String, String>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// In-memory event sink for tests.
///
/// Clones share one buffer, so a test keeps a handle and hands another to
/// [`TestLogSubscriber::into_layer`].
#[derive(Debug, Clone, Default)]
pub struct TestLogSubscriber {
    captured: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.buffer().clone()
    }

    /// Entries whose message contains `needle`.
    pub fn find(&self, needle: &str) -> Vec<LogEntry> {
        self.buffer()
            .iter()
            .filter(|entry| entry.message.contains(needle))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }

    pub fn into_layer(self) -> CaptureLayer {
        CaptureLayer { sink: self }
    }

    // a test that panicked while logging must not hide later entries
    fn buffer(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.captured
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Layer feeding a [`TestLogSubscriber`]
pub struct CaptureLayer {
    sink: TestLogSubscriber,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collected = EntryFields::default();
        event.record(&mut collected);

        let meta = event.metadata();
        self.sink.buffer().push(LogEntry {
            level: *meta.level(),
            target: meta.target().to_owned(),
            message: collected.message,
            fields: collected.rest,
        });
    }
}

#[derive(Default)]
struct EntryFields {
    message: String,
    rest: BTreeMap<String, String>,
}

impl EntryFields {
    fn put(&mut self, field: &Field, text: String) {
        match field.name() {
            "message" => self.message = text,
            name => {
                self.rest.insert(name.to_owned(), text);
            }
        }
    }
}

impl Visit for EntryFields {
    // without this, string fields would arrive quoted through `record_debug`
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.put(field, format!("{value:?}"));
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
pub fn init_logging(format: LogFormat) -> Result<(), SetGlobalDefaultError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(fmt.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(fmt.json().finish()),
    }
}

/// Process-wide capturing subscriber for integration tests. Entries are
/// cleared on every call.
pub fn init_test_logging() -> TestLogSubscriber {
    static SINK: OnceLock<TestLogSubscriber> = OnceLock::new();

    let mut first_call = false;
    let sink = SINK.get_or_init(|| {
        first_call = true;
        TestLogSubscriber::new()
    });

    if first_call {
        let registry = Registry::default().with(sink.clone().into_layer());
        if let Err(err) = tracing::subscriber::set_global_default(registry) {
            eprintln!("test subscriber not installed: {err}");
        }
    }

    sink.clear();
    sink.clone()
}
