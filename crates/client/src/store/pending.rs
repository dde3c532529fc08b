// In-flight request tracker keyed by canonical query.

use std::collections::HashMap;

/// Canonical keys of list requests currently in flight, each owned by the
/// request that marked it.
///
/// Owned by one sync instance; never shared process-wide.
#[derive(Debug, Default)]
pub struct PendingRequests {
    keys: HashMap<String, u64>,
    next_token: u64,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as in flight. Returns `None`, and changes nothing, when it
    /// already is; otherwise the token to hand back to [`end`](Self::end).
    pub fn begin(&mut self, key: &str) -> Option<u64> {
        if self.keys.contains_key(key) {
            return None;
        }
        self.next_token += 1;
        self.keys.insert(key.to_string(), self.next_token);
        Some(self.next_token)
    }

    /// Release `key` if `token` still owns it. A request whose marker was
    /// cleared and re-taken by a newer request leaves the newer marker alone.
    pub fn end(&mut self, key: &str, token: u64) {
        if self.keys.get(key) == Some(&token) {
            self.keys.remove(key);
        }
    }

    /// Forget every in-flight key so the next request always goes out.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
