use std::fmt::{self, Debug, Display, Formatter, Write};
use std::io::IsTerminal;

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::metadata::LevelFilter;
use tracing::span::Attributes;
use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing::{Event, Id, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Installs the [`Logger`] as the global subscriber.
pub fn init() -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::registry().with(Logger::new());
    set_global_default(subscriber)
}

/// A [`Layer`] printing events to stdout, prefixed with the spans they occurred in.
#[derive(Debug)]
pub struct Logger {
    is_tty: bool,
    level: LevelFilter,
}

impl Logger {
    /// Creates a new `Logger` with the level taken from the `RUST_LOG` environment variable.
    pub fn new() -> Self {
        let level = std::env::var("RUST_LOG")
            .map(|e| parse_level(&e))
            .unwrap_or(LevelFilter::INFO);

        Self::with_level(level)
    }

    pub fn with_level(level: LevelFilter) -> Self {
        Self {
            is_tty: std::io::stdout().is_terminal(),
            level,
        }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    fn log<T>(&self, level: Level, target: &str, scope: &str, content: T)
    where
        T: Display,
    {
        if level > self.level {
            return;
        }

        let now = Local::now().format("%Y-%m-%d %H:%M:%S:%f");

        let (level, color) = match level {
            Level::ERROR => ("ERROR", Color::RED),
            Level::WARN => ("WARN", Color::YELLOW),
            Level::INFO => ("INFO", Color::GREEN),
            Level::DEBUG => ("DEBUG", Color::LIGHT_GRAY_BOLD),
            Level::TRACE => ("TRACE", Color::LIGHT_GRAY_BOLD),
        };

        if self.is_tty {
            let now = ColorText::new(format!("[{}]", now), Color::LIGHT_GRAY);
            let level = ColorText::new(level, color);
            let target = ColorText::new(target, Color::LIGHT_GRAY);

            println!("{} {} {}{} {}", now, level, target, scope, content);
        } else {
            println!("[{}] {} {}{} {}", now, level, target, scope, content);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a level name. Unknown names fall back to `INFO`.
pub fn parse_level(name: &str) -> LevelFilter {
    match name {
        "error" | "ERROR" => LevelFilter::ERROR,
        "warn" | "WARN" => LevelFilter::WARN,
        "info" | "INFO" => LevelFilter::INFO,
        "debug" | "DEBUG" => LevelFilter::DEBUG,
        "trace" | "TRACE" => LevelFilter::TRACE,
        "off" | "OFF" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

impl<S> Layer<S> for Logger
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.level
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > self.level {
            return;
        }

        let mut scope = String::new();
        if let Some(spans) = ctx.event_scope(event) {
            for span in spans.from_root() {
                let _ = write!(scope, " {}", span.name());
            }
        }

        let mut visitor = Visitor::new();
        event.record(&mut visitor);

        self.log(
            *metadata.level(),
            metadata.module_path().unwrap_or("???"),
            &scope,
            visitor,
        );
    }

    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
        let metadata = attrs.metadata();
        if *metadata.level() > self.level || attrs.values().is_empty() {
            return;
        }

        let mut visitor = Visitor::new();
        attrs.record(&mut visitor);

        self.log(
            *metadata.level(),
            metadata.module_path().unwrap_or("???"),
            &format!(" {}", metadata.name()),
            format!("--> {} {}", id.into_u64(), visitor),
        );
    }
}

struct Visitor {
    buf: String,
}

impl Visitor {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(32),
        }
    }
}

impl Visit for Visitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }

        let _ = match field.name() {
            "message" => write!(self.buf, "{:?}", value),
            _ => write!(self.buf, "{} = {:?}", field, value),
        };
    }
}

impl Display for Visitor {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.buf, f)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct Color([u8; 2]);

impl Color {
    // Bold
    pub const RED: Self = Self([1, 31]);
    pub const YELLOW: Self = Self([1, 33]);
    pub const GREEN: Self = Self([1, 32]);
    pub const LIGHT_GRAY_BOLD: Self = Self([1, 37]);

    pub const LIGHT_GRAY: Self = Self([2, 37]);
}

struct ColorText<T>
where
    T: Display,
{
    text: T,
    color: Color,
}

impl<T> ColorText<T>
where
    T: Display,
{
    fn new(text: T, color: Color) -> Self {
        Self { text, color }
    }
}

impl<T> Display for ColorText<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\x1b[{};{}m{}\x1b[0m",
            self.color.0[0], self.color.0[1], self.text
        )
    }
}
