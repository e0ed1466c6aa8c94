//! Status sinks: where the client reports progress and toggles its trigger.
//!
//! A sink stands in for the page the scripts originally wrote into: a text
//! area for status lines, a blocking alert, and a submit control that can be
//! disabled while a job is in flight.

use std::sync::Mutex;

/// Receiver for user-facing status updates.
pub trait StatusSink {
    /// Show a status line.
    fn report(&self, text: &str);

    /// Show a message that needs the user's attention.
    fn alert(&self, text: &str) {
        self.report(text);
    }

    /// Enable or disable the control that starts a new job.
    fn set_trigger_enabled(&self, enabled: bool);
}

impl<S: StatusSink + ?Sized> StatusSink for &S {
    fn report(&self, text: &str) {
        (**self).report(text)
    }

    fn alert(&self, text: &str) {
        (**self).alert(text)
    }

    fn set_trigger_enabled(&self, enabled: bool) {
        (**self).set_trigger_enabled(enabled)
    }
}

/// Disables a sink's trigger for as long as it is alive.
///
/// Dropping the guard re-enables the trigger, so every exit path restores
/// the control, including `?` returns and unwinding.
pub struct TriggerGuard<'a, S: StatusSink + ?Sized> {
    sink: &'a S,
}

impl<'a, S: StatusSink + ?Sized> TriggerGuard<'a, S> {
    pub fn new(sink: &'a S) -> Self {
        sink.set_trigger_enabled(false);
        Self { sink }
    }
}

impl<S: StatusSink + ?Sized> Drop for TriggerGuard<'_, S> {
    fn drop(&mut self) {
        self.sink.set_trigger_enabled(true);
    }
}

/// Sink that writes to the terminal.
///
/// Status lines go to stdout, alerts to stderr. Trigger changes are only
/// logged since a terminal has no button to grey out.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConsoleSink {
    quiet: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress status lines; alerts are still printed.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl StatusSink for ConsoleSink {
    fn report(&self, text: &str) {
        log::info!("{}", text);
        if !self.quiet {
            println!("{}", text);
        }
    }

    fn alert(&self, text: &str) {
        log::warn!("{}", text);
        eprintln!("{}", text);
    }

    fn set_trigger_enabled(&self, enabled: bool) {
        log::debug!("Trigger {}", if enabled { "enabled" } else { "disabled" });
    }
}

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Report(String),
    Alert(String),
    Trigger(bool),
}

/// Sink that keeps every call in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far, oldest first.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    /// Just the reported status lines.
    pub fn reports(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Report(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Just the alerts.
    pub fn alerts(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Alert(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Current trigger state; enabled until something disables it.
    pub fn trigger_enabled(&self) -> bool {
        self.lock()
            .iter()
            .rev()
            .find_map(|e| match e {
                SinkEvent::Trigger(enabled) => Some(*enabled),
                _ => None,
            })
            .unwrap_or(true)
    }

    fn push(&self, event: SinkEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEvent>> {
        // A poisoned log is still a usable log.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StatusSink for MemorySink {
    fn report(&self, text: &str) {
        self.push(SinkEvent::Report(text.to_string()));
    }

    fn alert(&self, text: &str) {
        self.push(SinkEvent::Alert(text.to_string()));
    }

    fn set_trigger_enabled(&self, enabled: bool) {
        self.push(SinkEvent::Trigger(enabled));
    }
}
