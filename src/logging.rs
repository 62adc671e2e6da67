//! Browser console logging
//!
//! `tracing` events are forwarded to the matching `console` method. The level
//! filter sits behind a reload handle so a page can tighten or loosen it after
//! the module has started.

use std::cell::RefCell;
use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};
use wasm_bindgen::JsValue;

use crate::config::DEFAULT_LOG_FILTER;
use crate::error::{ClientError, Result};

/// Reload handle for the installed filter and the directive it was built from
struct ActiveFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    directive: String,
}

thread_local! {
    static ACTIVE_FILTER: RefCell<Option<ActiveFilter>> = const { RefCell::new(None) };
}

/// Destination for formatted log lines
pub type ConsoleSink = fn(&Level, &str);

/// Layer writing formatted events to the browser console
pub struct ConsoleLayer {
    sink: ConsoleSink,
}

impl ConsoleLayer {
    pub fn new() -> Self {
        Self { sink: write_to_console }
    }

    /// Route lines somewhere other than `console`
    pub fn with_sink(sink: ConsoleSink) -> Self {
        Self { sink }
    }
}

impl Default for ConsoleLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let line = format!("[{}] {}{}", meta.target(), visitor.message, visitor.fields);
        (self.sink)(meta.level(), &line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

fn write_to_console(level: &Level, line: &str) {
    let value = JsValue::from_str(line);
    match *level {
        Level::ERROR => web_sys::console::error_1(&value),
        Level::WARN => web_sys::console::warn_1(&value),
        Level::INFO => web_sys::console::info_1(&value),
        _ => web_sys::console::debug_1(&value),
    }
}

fn parse_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| ClientError::LogFilter(e.to_string()))
}

fn is_installed() -> bool {
    ACTIVE_FILTER.with(|cell| cell.borrow().is_some())
}

fn remember(handle: reload::Handle<EnvFilter, Registry>, directive: &str) {
    let active = ActiveFilter {
        handle,
        directive: directive.to_string(),
    };
    ACTIVE_FILTER.with(|cell| *cell.borrow_mut() = Some(active));
}

/// Install the console subscriber. Calling it again only updates the filter.
pub fn init(directive: &str) -> Result<()> {
    if is_installed() {
        return set_filter(directive);
    }

    let (filter, handle) = reload::Layer::new(parse_filter(directive)?);
    tracing_subscriber::registry()
        .with(filter)
        .with(ConsoleLayer::new())
        .try_init()
        .map_err(|e| ClientError::LogFilter(e.to_string()))?;

    remember(handle, directive);
    Ok(())
}

/// Apply the `logFilter` of a config object.
/// `None` keeps the active filter, or installs the default one if there is none yet.
pub fn apply(directive: Option<&str>) -> Result<()> {
    match directive {
        Some(directive) => init(directive),
        None if is_installed() => Ok(()),
        None => init(DEFAULT_LOG_FILTER),
    }
}

/// Replace the active filter directive
pub fn set_filter(directive: &str) -> Result<()> {
    let filter = parse_filter(directive)?;
    ACTIVE_FILTER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(active) => {
            active
                .handle
                .reload(filter)
                .map_err(|e| ClientError::LogFilter(e.to_string()))?;
            active.directive = directive.to_string();
            Ok(())
        }
        None => Err(ClientError::LogFilter("logging is not initialized".to_string())),
    })
}

/// The directive currently in effect, if logging is installed
pub fn current_filter() -> Option<String> {
    ACTIVE_FILTER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|active| active.directive.clone())
    })
}
