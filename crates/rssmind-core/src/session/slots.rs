//! Single-flight slot registry (cancel-and-supersede)

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Identifies the UI slot a stream renders into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey(String);

impl SlotKey {
    /// Reply slot of a chat thread
    pub fn chat(thread: impl AsRef<str>) -> Self {
        Self(format!("chat:{}", thread.as_ref()))
    }

    /// Summary slot of an article
    pub fn summary(article: impl AsRef<str>) -> Self {
        Self(format!("summary:{}", article.as_ref()))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct SlotEntry {
    generation: u64,
    token: CancellationToken,
}

/// Ownership of a slot for one request
#[derive(Debug, Clone)]
pub struct SlotLease {
    key: SlotKey,
    generation: u64,
    token: CancellationToken,
}

impl SlotLease {
    pub fn key(&self) -> &SlotKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token cancelled when this lease is superseded
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Tracks the live request of every slot
pub struct SlotRegistry {
    slots: Mutex<HashMap<SlotKey, SlotEntry>>,
    next_generation: AtomicU64,
    /// Parent of every lease token; replaced by `cancel_all`
    root: Mutex<CancellationToken>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
            root: Mutex::new(CancellationToken::new()),
        }
    }

    /// Claim `key` for a new request, cancelling whoever held it
    pub fn claim(&self, key: SlotKey) -> SlotLease {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let mut slots = self.slots.lock();
        let token = self.root.lock().child_token();
        let previous = slots.insert(
            key.clone(),
            SlotEntry {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            info!(
                slot = %key,
                "Superseding request #{} with #{}",
                previous.generation,
                generation
            );
            previous.token.cancel();
        }

        SlotLease {
            key,
            generation,
            token,
        }
    }

    /// Whether `lease` still owns its slot
    pub fn is_current(&self, lease: &SlotLease) -> bool {
        self.slots
            .lock()
            .get(&lease.key)
            .is_some_and(|entry| entry.generation == lease.generation)
    }

    /// Give the slot back once the request is over.
    ///
    /// A superseded lease leaves its successor in place.
    pub fn release(&self, lease: &SlotLease) {
        let mut slots = self.slots.lock();
        if slots
            .get(&lease.key)
            .is_some_and(|entry| entry.generation == lease.generation)
        {
            slots.remove(&lease.key);
            debug!(slot = %lease.key, "Released request #{}", lease.generation);
        }
    }

    /// Number of slots with a live request
    pub fn active(&self) -> usize {
        self.slots.lock().len()
    }

    /// Cancel every live request. Later claims start from a fresh root.
    pub fn cancel_all(&self) {
        let mut slots = self.slots.lock();
        let previous = std::mem::replace(&mut *self.root.lock(), CancellationToken::new());
        previous.cancel();
        info!("Cancelled {} live request(s)", slots.len());
        slots.clear();
    }
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}
