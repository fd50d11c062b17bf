//! Session token persistence.

use color_eyre::Result;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::store::{SharedStore, TOKEN_KEY};

/// Reads and writes the bearer token in the durable store.
#[derive(Clone)]
pub struct SessionStore {
  store: SharedStore,
}

impl SessionStore {
  pub fn new(store: SharedStore) -> Self {
    Self { store }
  }

  /// Current token, if any. Storage failures read as "no token".
  pub fn token(&self) -> Option<String> {
    match self.store.get(TOKEN_KEY) {
      Ok(token) => token.filter(|t| !t.is_empty()),
      Err(e) => {
        warn!("Failed to read session token: {}", e);
        None
      }
    }
  }

  pub fn set_token(&self, token: &str) -> Result<()> {
    self.store.set(TOKEN_KEY, token)
  }

  pub fn clear(&self) -> Result<()> {
    self.store.remove(TOKEN_KEY)
  }

  /// Value for the `Authorization` header; empty when logged out.
  pub fn authorization(&self) -> String {
    match self.token() {
      Some(token) => {
        debug!(token = %fingerprint(&token), "Attaching session token");
        format!("Bearer {}", token)
      }
      None => String::new(),
    }
  }
}

/// Short, non-reversible tag for a token, safe to put in logs.
pub fn fingerprint(token: &str) -> String {
  let digest = Sha256::digest(token.as_bytes());
  hex::encode(&digest[..4])
}
