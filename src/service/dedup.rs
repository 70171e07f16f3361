//! Remembers which messages already triggered a reaction reply.
//!
//! Serenity dispatches every gateway event on its own task, so two reactions
//! on the same message can race. [`DedupTracker::mark`] checks and inserts
//! under one lock, which keeps the "one reply per message" rule exact.

use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Process-lifetime set of triggered message ids.
///
/// This is trivially cloneable; clones share the same set.
#[derive(Clone, Default)]
pub struct DedupTracker {
    inner: Arc<Mutex<DedupInner>>,
}

#[derive(Default)]
struct DedupInner {
    seen: HashSet<u64>,
    /// Insertion order, only kept when bounded.
    order: VecDeque<u64>,
    /// `0` means unbounded.
    capacity: usize,
}

impl DedupTracker {
    /// A tracker that never forgets.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A tracker that forgets the oldest id once more than `capacity` are held.
    ///
    /// A `capacity` of `0` is the same as [`DedupTracker::unbounded`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DedupInner {
                capacity,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DedupInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the message has already triggered.
    pub fn contains(&self, message_id: u64) -> bool {
        self.lock().seen.contains(&message_id)
    }

    /// Mark the message as triggered.
    ///
    /// Returns `true` only for the first call with a given id.
    pub fn mark(&self, message_id: u64) -> bool {
        let mut inner = self.lock();

        if !inner.seen.insert(message_id) {
            return false;
        }

        if inner.capacity > 0 {
            inner.order.push_back(message_id);

            while inner.order.len() > inner.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.seen.remove(&oldest);
                }
            }
        }

        true
    }

    pub fn len(&self) -> usize {
        self.lock().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_true_only_once() {
        let dedup = DedupTracker::unbounded();

        assert!(!dedup.contains(7));
        assert!(dedup.mark(7));
        assert!(dedup.contains(7));
        assert!(!dedup.mark(7));
        assert!(!dedup.mark(7));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let dedup = DedupTracker::unbounded();
        let other = dedup.clone();

        assert!(dedup.mark(1));
        assert!(!other.mark(1));
        assert!(other.contains(1));
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let dedup = DedupTracker::with_capacity(0);

        for id in 0..10_000 {
            assert!(dedup.mark(id));
        }

        assert_eq!(dedup.len(), 10_000);
        assert!(dedup.contains(0));
    }

    #[test]
    fn test_bounded_forgets_oldest_first() {
        let dedup = DedupTracker::with_capacity(2);

        assert!(dedup.mark(1));
        assert!(dedup.mark(2));
        assert!(dedup.mark(3));

        assert_eq!(dedup.len(), 2);
        assert!(!dedup.contains(1));
        assert!(dedup.contains(2));
        assert!(dedup.contains(3));

        // A repeat does not refresh its slot.
        assert!(!dedup.mark(2));
        assert!(dedup.mark(4));
        assert!(!dedup.contains(2));
    }

    #[test]
    fn test_concurrent_marks_pick_one_winner() {
        let dedup = DedupTracker::unbounded();

        let winners: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| dedup.mark(42))).collect();
            handles.into_iter().map(|h| h.join().map(usize::from).unwrap_or(0)).sum()
        });

        assert_eq!(winners, 1);
    }
}
