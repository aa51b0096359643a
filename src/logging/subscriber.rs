//! Tracing subscriber: coloured console output plus a per-command log file.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;
use tracing::field::{Field, Visit};

use super::utils::{HEADER_TIMESTAMP, LINE_TIMESTAMP, log_file_path, strip_ansi, utc_now};

/// Target used by [`Logger::stage`](super::Logger::stage).
pub(super) const STAGE_TARGET: &str = "swaplaunch::stage";

/// Target used by [`Logger::dry_run`](super::Logger::dry_run).
pub(super) const DRY_RUN_TARGET: &str = "swaplaunch::dry_run";

/// How an event is rendered, decided from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Info,
    Debug,
    Warn,
    Error,
}

impl Kind {
    fn of(level: Level, target: &str) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO if target == STAGE_TARGET => Self::Stage,
            Level::INFO if target == DRY_RUN_TARGET => Self::DryRun,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Pulls the formatted `message` field out of an event.
#[derive(Default)]
struct Message(String);

impl Message {
    fn of(event: &tracing::Event<'_>) -> String {
        let mut visitor = Self::default();
        event.record(&mut visitor);
        visitor.0
    }
}

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// Appends every event at `DEBUG` and above to
/// `<cache dir>/<command>.log`, independent of console verbosity.
///
/// The file is truncated at the start of each run, so it always holds the
/// most recent invocation of that command.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the log file for `command` and write the run header.
    ///
    /// `None` when the cache directory or the file cannot be created; the
    /// launcher then logs to the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version = option_env!("SWAPLAUNCH_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        let header = format!(
            "# swaplaunch {version} {command}, started {} UTC\n",
            utc_now(HEADER_TIMESTAMP)
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let meta = event.metadata();
        let line = file_line(
            &utc_now(LINE_TIMESTAMP),
            *meta.level(),
            meta.target(),
            &strip_ansi(&Message::of(event)),
        );
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}

/// One log-file line.
///
/// Events raised inside the library rather than through
/// [`Logger`](super::Logger) carry their module path, so swap and launch
/// internals can be told apart.
fn file_line(ts: &str, level: Level, target: &str, msg: &str) -> String {
    let origin = target
        .strip_prefix("swaplaunch::")
        .filter(|m| !matches!(*m, "stage" | "dry_run" | "logging::logger"))
        .map_or_else(String::new, |m| format!("{m}: "));
    let tag = match Kind::of(level, target) {
        Kind::Stage => return format!("[{ts}] ==> {msg}"),
        Kind::DryRun => return format!("[{ts}]     [dry run] {msg}"),
        Kind::Error => "[error] ",
        Kind::Warn => "[warn] ",
        Kind::Debug => "[debug] ",
        Kind::Info => "",
    };
    format!("[{ts}]     {tag}{origin}{msg}")
}

/// Console rendering: `==>` stage headers, yellow warnings, red errors and
/// dimmed debug output.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let msg = Message::of(event);
        match Kind::of(*meta.level(), meta.target()) {
            Kind::Error => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            Kind::Warn => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            Kind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Kind::DryRun => writeln!(writer, "  \x1b[33m[dry run]\x1b[0m {msg}"),
            Kind::Info => writeln!(writer, "  {msg}"),
            Kind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the global subscriber for one command run.
///
/// Warnings and errors go to stderr, everything else to stdout; `verbose`
/// lowers the console threshold to `DEBUG`. The file layer always records
/// `DEBUG`. Later calls in the same process keep the first subscriber.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));
    let console = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(writer)
        .with_filter(console_level);
    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .ok();
}
