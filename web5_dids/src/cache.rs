// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use lru::LruCache;

use crate::error::DidError;
use crate::error::Result;

/// Default TTL for resolver cache entries (spec default: 15 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);
const DEFAULT_CAPACITY: usize = 1000;

struct Entry<V> {
  value: V,
  expires_at: Instant,
}

/// A TTL-bounded LRU cache. `close()` is a safe no-op for this in-memory
/// variant; persistent variants (not needed here) would release file
/// handles in `close`.
pub struct TtlCache<V> {
  inner: Mutex<LruCache<String, Entry<V>>>,
  ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
  pub fn new(ttl: Duration, capacity: usize) -> Self {
    let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY).unwrap());
    Self {
      inner: Mutex::new(LruCache::new(capacity)),
      ttl,
    }
  }

  /// Returns a fresh, unexpired value for `key`, if any. Expired entries
  /// are evicted on read.
  pub fn get(&self, key: &str) -> Result<Option<V>> {
    if key.is_empty() {
      return Err(DidError::InvalidKey);
    }
    let mut inner = self.inner.lock().expect("lock poisoned");
    match inner.get(key) {
      Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
      Some(_) => {
        inner.pop(key);
        Ok(None)
      }
      None => Ok(None),
    }
  }

  pub fn set(&self, key: String, value: V) -> Result<()> {
    if key.is_empty() {
      return Err(DidError::InvalidKey);
    }
    let expires_at = Instant::now() + self.ttl;
    self.inner.lock().expect("lock poisoned").put(key, Entry { value, expires_at });
    Ok(())
  }

  pub fn delete(&self, key: &str) -> Result<()> {
    self.inner.lock().expect("lock poisoned").pop(key);
    Ok(())
  }

  pub fn clear(&self) {
    self.inner.lock().expect("lock poisoned").clear();
  }

  /// Safe no-op for this in-memory cache.
  pub fn close(&self) {}
}

impl<V: Clone> Default for TtlCache<V> {
  fn default() -> Self {
    Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
  }
}
