//! Event logging for the dataflow pipeline.
//!
//! The engine and the passes record what they did into an append-only [`EventLog`] instead of
//! writing to a logging facade. Events can be inspected for debugging, summarized, or ignored.
//!
//! # Architecture
//!
//! - [`Event`] - A single recorded event
//! - [`EventLog`] - Thread-safe collection of events with query and summary helpers
//! - [`EventBuilder`] - Fluent API for creating events
//!
//! # Example
//!
//! ```rust
//! use hlsflow::compiler::{EventKind, EventLog};
//!
//! let log = EventLog::new();
//! log.record(EventKind::DeadDefinition)
//!     .procedure("fir")
//!     .location(12)
//!     .message("'tmp' is never read");
//! log.info("scheduler finished");
//!
//! assert_eq!(log.count_kind(EventKind::DeadDefinition), 1);
//! assert_eq!(log.summary(), "1 dead definition");
//! ```

use std::{collections::HashMap, fmt};

use strum::{EnumCount, EnumIter};

/// Categories of events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum EventKind {
    /// The definition catalog was built.
    CatalogBuilt,
    /// Control-flow edges were built.
    EdgesBuilt,
    /// Reaching definitions were solved.
    Solved,
    /// Def/use chains were built.
    ChainsBuilt,
    /// Previous annotations were discarded.
    ResultsCleared,

    /// A consumer pass started on a procedure.
    PassStarted,
    /// A consumer pass completed on a procedure.
    PassCompleted,

    /// A loop-carried feedback read was found.
    FeedbackDetected,
    /// A read was found to always see the same constant.
    ConstantUse,
    /// A definition was found to be dead.
    DeadDefinition,

    /// Informational message.
    Info,
    /// Warning (something unexpected but recoverable).
    Warning,
    /// Error (something failed).
    Error,
}

impl EventKind {
    /// Returns a human-readable description of this event kind.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            // Engine
            Self::CatalogBuilt => "catalog built",
            Self::EdgesBuilt => "edges built",
            Self::Solved => "reaching definitions solved",
            Self::ChainsBuilt => "chains built",
            Self::ResultsCleared => "results cleared",
            // Passes
            Self::PassStarted => "pass started",
            Self::PassCompleted => "pass completed",
            // Findings
            Self::FeedbackDetected => "feedback read",
            Self::ConstantUse => "constant use",
            Self::DeadDefinition => "dead definition",
            // Diagnostic
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Returns true if this event reports a finding of a consumer pass.
    #[must_use]
    pub fn is_finding(&self) -> bool {
        matches!(
            self,
            Self::FeedbackDetected | Self::ConstantUse | Self::DeadDefinition
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single logged event.
#[derive(Debug, Clone)]
pub struct Event {
    /// The type of event.
    pub kind: EventKind,
    /// The procedure the event concerns (if applicable).
    pub procedure: Option<String>,
    /// Location within the procedure (statement index).
    pub location: Option<usize>,
    /// Human-readable description.
    pub message: String,
    /// Associated pass name (if from a pass).
    pub pass: Option<String>,
}

impl Event {
    fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            procedure: None,
            location: None,
            message: message.into(),
            pass: None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(procedure) = &self.procedure {
            write!(f, " {procedure}")?;
            if let Some(location) = self.location {
                write!(f, "#{location}")?;
            }
            f.write_str(":")?;
        }
        write!(f, " {}", self.message)
    }
}

/// Builder for creating events with a fluent API.
///
/// Created by [`EventLog::record`]. The event is added to the log when the builder is dropped.
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    kind: EventKind,
    procedure: Option<String>,
    location: Option<usize>,
    message: Option<String>,
    pass: Option<String>,
}

impl<'a> EventBuilder<'a> {
    fn new(log: &'a EventLog, kind: EventKind) -> Self {
        Self {
            log,
            kind,
            procedure: None,
            location: None,
            message: None,
            pass: None,
        }
    }

    /// Sets the procedure the event concerns.
    pub fn procedure(mut self, name: impl Into<String>) -> Self {
        self.procedure = Some(name.into());
        self
    }

    /// Sets the location (statement index) within the procedure.
    pub fn location(mut self, location: usize) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets a custom message describing the event.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Associates this event with a specific pass.
    pub fn pass(mut self, pass_name: impl Into<String>) -> Self {
        self.pass = Some(pass_name.into());
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        let message = self
            .message
            .take()
            .unwrap_or_else(|| self.kind.description().to_string());

        self.log.events.push(Event {
            kind: self.kind,
            procedure: self.procedure.take(),
            location: self.location.take(),
            message,
            pass: self.pass.take(),
        });
    }
}

/// Collection of events from the dataflow pipeline.
///
/// This type is thread-safe: events can be appended concurrently from multiple threads using
/// shared references (`&self`).
#[derive(Debug)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventLog {
    fn clone(&self) -> Self {
        let log = Self::new();
        log.merge(self);
        log
    }
}

impl EventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: boxcar::Vec::new(),
        }
    }

    /// Returns true if no events have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.count() == 0
    }

    /// Returns the total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Starts building a new event of the given kind.
    ///
    /// The event is added when the builder is dropped.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder::new(self, kind)
    }

    /// Records an informational message.
    pub fn info(&self, message: impl Into<String>) {
        self.events.push(Event::new(EventKind::Info, message));
    }

    /// Appends copies of all events of `other`.
    pub fn merge(&self, other: &EventLog) {
        for (_, event) in &other.events {
            self.events.push(event.clone());
        }
    }

    /// Returns true if any event of the given kind exists.
    #[must_use]
    pub fn has(&self, kind: EventKind) -> bool {
        self.events.iter().any(|(_, e)| e.kind == kind)
    }

    /// Counts events of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|(_, e)| e.kind == kind).count()
    }

    /// Returns an iterator over all events in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, e)| e)
    }

    /// Returns an iterator over events of a specific kind.
    pub fn filter_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.iter().filter(move |e| e.kind == kind)
    }

    /// Returns an iterator over pass findings only.
    pub fn findings(&self) -> impl Iterator<Item = &Event> + '_ {
        self.iter().filter(|e| e.kind.is_finding())
    }

    /// Counts events grouped by kind.
    #[must_use]
    pub fn count_by_kind(&self) -> HashMap<EventKind, usize> {
        let mut counts = HashMap::with_capacity(EventKind::COUNT);
        for event in self.iter() {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Generates a human-readable summary of the findings.
    ///
    /// Falls back to the plain event count when no pass reported anything.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no events".to_string();
        }

        let mut parts: Vec<String> = self
            .count_by_kind()
            .iter()
            .filter(|(kind, _)| kind.is_finding())
            .map(|(kind, count)| {
                let plural = if *count == 1 { "" } else { "s" };
                format!("{count} {}{plural}", kind.description())
            })
            .collect();

        if parts.is_empty() {
            return format!("{} events", self.len());
        }

        parts.sort();
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_builder_appends_on_drop() {
        let log = EventLog::new();
        log.record(EventKind::Solved)
            .procedure("fir")
            .location(3)
            .message("12 definitions");

        let event = log.iter().next().unwrap();
        assert_eq!(event.kind, EventKind::Solved);
        assert_eq!(event.procedure.as_deref(), Some("fir"));
        assert_eq!(event.location, Some(3));
        assert_eq!(event.to_string(), "[reaching definitions solved] fir#3: 12 definitions");
    }

    #[test]
    fn test_default_message_is_description() {
        let log = EventLog::new();
        log.record(EventKind::EdgesBuilt);
        assert_eq!(log.iter().next().unwrap().message, "edges built");
    }

    #[test]
    fn test_summary_counts_findings() {
        let log = EventLog::new();
        assert_eq!(log.summary(), "no events");

        log.info("starting");
        assert_eq!(log.summary(), "1 events");

        log.record(EventKind::ConstantUse);
        log.record(EventKind::ConstantUse);
        log.record(EventKind::FeedbackDetected);
        assert_eq!(log.summary(), "1 feedback read, 2 constant uses");
    }

    #[test]
    fn test_filters() {
        let log = EventLog::new();
        log.record(EventKind::DeadDefinition).procedure("a");
        log.record(EventKind::DeadDefinition).procedure("b");
        log.info("odd");

        assert_eq!(log.filter_kind(EventKind::DeadDefinition).count(), 2);
        assert_eq!(log.findings().count(), 2);
        assert!(log.has(EventKind::Info));
        assert!(!log.has(EventKind::Warning));
    }

    #[test]
    fn test_merge_and_clone() {
        let a = EventLog::new();
        a.info("one");
        let b = a.clone();
        b.info("two");
        a.merge(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_every_kind_has_description() {
        for kind in EventKind::iter() {
            assert!(!kind.description().is_empty());
        }
        assert_eq!(EventKind::iter().count(), EventKind::COUNT);
    }
}
