//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::{Arc, Mutex};

use wrmc::api::wire::DateShift;
use wrmc::api::{ApiClient, ApiHooks, LoadingSink, Notifier, SessionStore, Severity};
use wrmc::cache::Clock;
use wrmc::store::{MemoryStore, SharedStore};

/// Records every notification.
#[derive(Default)]
pub struct RecordingNotifier {
  pub events: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
  pub fn events(&self) -> Vec<(String, Severity)> {
    self.events.lock().unwrap().clone()
  }

  pub fn errors(&self) -> Vec<String> {
    self.of(Severity::Error)
  }

  pub fn successes(&self) -> Vec<String> {
    self.of(Severity::Success)
  }

  fn of(&self, severity: Severity) -> Vec<String> {
    self
      .events()
      .into_iter()
      .filter(|(_, s)| *s == severity)
      .map(|(m, _)| m)
      .collect()
  }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, message: &str, severity: Severity) {
    self
      .events
      .lock()
      .unwrap()
      .push((message.to_string(), severity));
  }
}

/// Records loading visibility transitions.
#[derive(Default)]
pub struct RecordingSink {
  pub transitions: Mutex<Vec<bool>>,
}

impl RecordingSink {
  pub fn transitions(&self) -> Vec<bool> {
    self.transitions.lock().unwrap().clone()
  }
}

impl LoadingSink for RecordingSink {
  fn set_visible(&self, visible: bool) {
    self.transitions.lock().unwrap().push(visible);
  }
}

/// Clock that only moves when told to.
pub struct ManualClock {
  now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self {
      now: Mutex::new(start),
    }
  }

  pub fn advance(&self, by: chrono::Duration) {
    *self.now.lock().unwrap() += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap()
  }
}

pub struct Harness {
  pub api: ApiClient,
  pub store: SharedStore,
  pub notifier: Arc<RecordingNotifier>,
  pub sink: Arc<RecordingSink>,
}

impl Harness {
  pub fn new(base_url: &str) -> Self {
    Self::with_store(base_url, Arc::new(MemoryStore::new()))
  }

  pub fn with_store(base_url: &str, store: SharedStore) -> Self {
    let notifier = Arc::new(RecordingNotifier::default());
    let sink = Arc::new(RecordingSink::default());
    let hooks = ApiHooks::new(sink.clone(), notifier.clone());
    let api = ApiClient::new(base_url, SessionStore::new(store.clone()), hooks)
      .unwrap()
      .with_date_shift(DateShift::fixed(FixedOffset::east_opt(0).unwrap()));

    Self {
      api,
      store,
      notifier,
      sink,
    }
  }

  pub fn login_as(&self, token: &str) {
    self.api.session().set_token(token).unwrap();
  }
}

pub fn utc(s: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(s)
    .unwrap()
    .with_timezone(&Utc)
}
