//! AI diagnostics
//!
//! The engine reports its AI decisions (and non-decisions) to an injected sink.
//! Nothing written here affects the simulation.

use bevy::log::debug;

/// Receives human-readable diagnostic messages from the engine.
pub trait DiagnosticSink: Send + Sync {
    fn record(&mut self, message: String);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _message: String) {}
}

/// Forwards messages to the log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, message: String) {
        debug!(target: "duelsim::ai", "{}", message);
    }
}

/// Keeps messages in memory, for tests and tooling.
impl DiagnosticSink for Vec<String> {
    fn record(&mut self, message: String) {
        self.push(message);
    }
}

/// Sink chosen by the `debug_ai` setting.
pub fn sink_for(debug_ai: bool) -> Box<dyn DiagnosticSink> {
    if debug_ai {
        Box::new(LogSink)
    } else {
        Box::new(NullSink)
    }
}
