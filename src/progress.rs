//! Monotonic progress reporting

use tokio::sync::watch;

type Callback = Box<dyn FnMut(f64) + Send>;

/// Forwards export progress in `[0, 1]` to a callback.
///
/// Values are clamped into range and never go backwards: a report lower than
/// the last emitted value is dropped.
pub struct Progress {
    callback: Option<Callback>,
    last: f64,
}

impl Progress {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            last: 0.0,
        }
    }

    /// A reporter that discards everything.
    pub fn none() -> Self {
        Self {
            callback: None,
            last: 0.0,
        }
    }

    /// A reporter publishing into a `watch` channel, for callers that poll
    /// progress from another task.
    pub fn watch() -> (Self, watch::Receiver<f64>) {
        let (tx, rx) = watch::channel(0.0);
        let progress = Self::new(move |value| {
            let _ = tx.send(value);
        });
        (progress, rx)
    }

    pub fn report(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        let value = value.clamp(0.0, 1.0);
        if value < self.last {
            return;
        }
        self.last = value;
        if let Some(cb) = self.callback.as_mut() {
            cb(value);
        }
    }

    /// The last value emitted.
    pub fn last(&self) -> f64 {
        self.last
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("last", &self.last)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
