//! Warning sinks for non-fatal problems found while resolving sources or
//! parsing tool output.

use parking_lot::Mutex;

/// Receives warnings produced by source resolution and output parsers.
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Sink that forwards every warning to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Sink that keeps warnings in memory.
#[derive(Debug, Default)]
pub struct WarningBuffer {
    messages: Mutex<Vec<String>>,
}

impl WarningBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected warnings.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl WarningSink for WarningBuffer {
    fn warn(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// Sends `message` to `sink`, or to `tracing` when no sink is given.
pub fn emit(sink: Option<&dyn WarningSink>, message: &str) {
    match sink {
        Some(sink) => sink.warn(message),
        None => TracingSink.warn(message),
    }
}
