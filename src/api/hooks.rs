//! UI-facing side channels: the busy indicator and notifications.
//!
//! Both are handed to the client at construction time through [`ApiHooks`].

use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Success,
  Error,
  Warning,
  Info,
}

impl Severity {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Success => "success",
      Self::Error => "error",
      Self::Warning => "warning",
      Self::Info => "info",
    }
  }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
  fn notify(&self, message: &str, severity: Severity);
}

/// Sink for the global busy indicator.
pub trait LoadingSink: Send + Sync {
  fn set_visible(&self, visible: bool);
}

/// Notifier that turns notifications into log events.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, message: &str, severity: Severity) {
    match severity {
      Severity::Error => error!(notification = true, "{}", message),
      Severity::Warning => warn!(notification = true, "{}", message),
      Severity::Success | Severity::Info => info!(notification = true, "{}", message),
    }
  }
}

/// Loading sink that ignores visibility changes.
pub struct NoopLoading;

impl LoadingSink for NoopLoading {
  fn set_visible(&self, _visible: bool) {}
}

/// Reference-counted busy indicator.
///
/// The sink sees `true` when the first tracked request starts and `false`
/// when the last one finishes, so overlapping requests keep it visible.
pub struct LoadingTracker {
  in_flight: Mutex<usize>,
  sink: Arc<dyn LoadingSink>,
}

impl LoadingTracker {
  pub fn new(sink: Arc<dyn LoadingSink>) -> Self {
    Self {
      in_flight: Mutex::new(0),
      sink,
    }
  }

  /// Start tracking a request. The returned guard stops tracking on drop.
  pub fn begin(self: &Arc<Self>) -> LoadingGuard {
    self.adjust(true);
    LoadingGuard {
      tracker: Arc::clone(self),
    }
  }

  /// Number of tracked requests currently outstanding.
  pub fn in_flight(&self) -> usize {
    self.in_flight.lock().map(|n| *n).unwrap_or(0)
  }

  pub fn is_visible(&self) -> bool {
    self.in_flight() > 0
  }

  fn adjust(&self, start: bool) {
    // Sink is called under the lock so transitions are delivered in order
    let Ok(mut count) = self.in_flight.lock() else {
      return;
    };
    if start {
      *count += 1;
      if *count == 1 {
        self.sink.set_visible(true);
      }
    } else if *count > 0 {
      *count -= 1;
      if *count == 0 {
        self.sink.set_visible(false);
      }
    }
  }
}

/// Keeps one request counted until dropped.
pub struct LoadingGuard {
  tracker: Arc<LoadingTracker>,
}

impl Drop for LoadingGuard {
  fn drop(&mut self) {
    self.tracker.adjust(false);
  }
}

/// Side-channel handles injected into the request pipeline.
#[derive(Clone)]
pub struct ApiHooks {
  pub loading: Arc<LoadingTracker>,
  pub notifier: Arc<dyn Notifier>,
}

impl ApiHooks {
  pub fn new(loading: Arc<dyn LoadingSink>, notifier: Arc<dyn Notifier>) -> Self {
    Self {
      loading: Arc::new(LoadingTracker::new(loading)),
      notifier,
    }
  }

  pub fn success(&self, message: &str) {
    self.notifier.notify(message, Severity::Success);
  }

  pub fn error(&self, message: &str) {
    self.notifier.notify(message, Severity::Error);
  }
}

impl Default for ApiHooks {
  fn default() -> Self {
    Self::new(Arc::new(NoopLoading), Arc::new(TracingNotifier))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct RecordingSink {
    events: Mutex<Vec<bool>>,
  }

  impl LoadingSink for RecordingSink {
    fn set_visible(&self, visible: bool) {
      self.events.lock().unwrap().push(visible);
    }
  }

  #[test]
  fn test_overlapping_requests_keep_indicator_visible() {
    let sink = Arc::new(RecordingSink::default());
    let tracker = Arc::new(LoadingTracker::new(sink.clone()));

    let first = tracker.begin();
    let second = tracker.begin();
    assert_eq!(tracker.in_flight(), 2);

    drop(first);
    assert!(tracker.is_visible());
    assert_eq!(*sink.events.lock().unwrap(), vec![true]);

    drop(second);
    assert!(!tracker.is_visible());
    assert_eq!(*sink.events.lock().unwrap(), vec![true, false]);
  }

  #[test]
  fn test_guard_released_on_early_return() {
    let sink = Arc::new(RecordingSink::default());
    let tracker = Arc::new(LoadingTracker::new(sink.clone()));

    let run = |fail: bool| -> Result<(), ()> {
      let _guard = tracker.begin();
      if fail {
        return Err(());
      }
      Ok(())
    };

    assert!(run(true).is_err());
    assert!(run(false).is_ok());
    assert_eq!(tracker.in_flight(), 0);
    assert_eq!(*sink.events.lock().unwrap(), vec![true, false, true, false]);
  }
}
