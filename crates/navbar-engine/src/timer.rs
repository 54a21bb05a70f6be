//! One-shot cancellable timers keyed by slot.
//!
//! Starting a timer in an occupied slot replaces the previous one. Each timer
//! carries a generation number; a timer that wakes up after it was cancelled or
//! replaced finds its generation gone and does nothing.

use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::trace;

struct TimerEntry {
    token: CancellationToken,
    generation: u64,
}

/// Slot-keyed one-shot timers. Must be used from within a tokio runtime.
pub struct Timers<K> {
    entries: Arc<Mutex<HashMap<K, TimerEntry>>>,
    next_generation: AtomicU64,
}

impl<K> Default for Timers<K>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Timers<K>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(1),
        }
    }

    /// True if a timer is pending in `slot`.
    pub fn is_active(&self, slot: &K) -> bool {
        self.entries.lock().contains_key(slot)
    }

    /// Run `on_fire` after `delay` unless cancelled first.
    pub fn start<F>(&self, slot: K, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel(&slot);

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let cancel = token.clone();
        let entries = self.entries.clone();
        let key = slot.clone();

        self.entries
            .lock()
            .insert(slot, TimerEntry { token, generation });

        tokio::spawn(async move {
            trace!(slot = ?key, delay_ms = delay.as_millis(), "timer_start");
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    trace!(slot = ?key, "timer_cancelled");
                    return;
                }
            }

            // Only the current occupant of the slot may fire.
            let current = {
                let mut map = entries.lock();
                match map.get(&key) {
                    Some(e) if e.generation == generation => {
                        map.remove(&key);
                        true
                    }
                    _ => false,
                }
            };
            if current {
                trace!(slot = ?key, "timer_fire");
                on_fire();
            } else {
                trace!(slot = ?key, "timer_stale");
            }
        });
    }

    /// Cancel the timer in `slot`, returning whether one was pending.
    pub fn cancel(&self, slot: &K) -> bool {
        match self.entries.lock().remove(slot) {
            Some(entry) => {
                entry.token.cancel();
                trace!(slot = ?slot, "timer_stop");
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&self) {
        let drained: Vec<TimerEntry> = self.entries.lock().drain().map(|(_, e)| e).collect();
        for e in &drained {
            e.token.cancel();
        }
        if !drained.is_empty() {
            trace!(count = drained.len(), "timer_clear");
        }
    }
}
