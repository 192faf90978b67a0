//! Progress reporting for captures.

use std::sync::Arc;

/// Receives progress updates from a running capture.
///
/// Every method has a no-op default so reporters only implement what they need.
pub trait ProgressReporter {
    /// `fraction` is in `[0, 1]`.
    fn update(&self, _label: &str, _fraction: f32) {}

    /// Called once when the capture ends, on every exit path.
    fn close(&self) {}

    /// Polled between samples; returning true aborts the capture.
    fn abort_requested(&self) -> bool {
        false
    }
}

impl ProgressReporter for () {}

/// Logs progress through `tracing`, at most once per `every` updates.
#[derive(Debug, Clone)]
pub struct LogProgress {
    every: u32,
    counter: std::cell::Cell<u32>,
}

impl LogProgress {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            counter: std::cell::Cell::new(0),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ProgressReporter for LogProgress {
    fn update(&self, label: &str, fraction: f32) {
        let n = self.counter.get();
        self.counter.set(n.wrapping_add(1));
        if n % self.every == 0 || fraction >= 1.0 {
            tracing::info!("{} [{:.1}%]", label, fraction * 100.0);
        }
    }

    fn close(&self) {
        tracing::debug!("Progress closed");
    }
}

/// A progress update delivered to a [`CallbackProgress`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Update { label: String, fraction: f32 },
    Closed,
}

/// Callback receiving progress events, shareable across threads.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Forwards progress to an optional callback.
#[derive(Clone, Default)]
pub struct CallbackProgress {
    callback: Option<ProgressCallback>,
}

impl CallbackProgress {
    pub fn new(callback: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    /// Reporter that drops every event.
    pub fn none() -> Self {
        Self { callback: None }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}

impl std::fmt::Debug for CallbackProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackProgress")
            .field("callback", &self.callback.as_ref().map(|_| "Fn(ProgressEvent)"))
            .finish()
    }
}

impl ProgressReporter for CallbackProgress {
    fn update(&self, label: &str, fraction: f32) {
        self.emit(ProgressEvent::Update {
            label: label.to_string(),
            fraction,
        });
    }

    fn close(&self) {
        self.emit(ProgressEvent::Closed);
    }
}
