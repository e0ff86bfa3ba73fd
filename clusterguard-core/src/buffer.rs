//! Bounded FIFO Window for Recent Readings
//!
//! ## Overview
//!
//! The ODA-MD detector keeps the most recent `capacity` readings and
//! recomputes its statistics over them on every admission. This module
//! provides that window: a bounded first-in-first-out queue that evicts its
//! oldest entry before admitting a new one past capacity.
//!
//! ## Design Rationale
//!
//! ### Why Not a Const-Generic Ring?
//!
//! The capacity comes from configuration at run time (default 20), so the
//! window sits on a `VecDeque` allocated once with exactly that capacity.
//! After construction no admission allocates.
//!
//! ### Eviction Is Capacity-Driven Only
//!
//! Whether a reading was forwarded or blocked has no effect on how long it
//! stays. Blocked outliers keep their raw values in the window until they
//! age out, and every snapshot computed meanwhile includes them.
//!
//! ```text
//! capacity = 3
//!
//! push a   [a]
//! push b   [a, b]
//! push c   [a, b, c]        ← full
//! push d   [b, c, d]        ← a evicted, returned to caller
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use clusterguard_core::buffer::SlidingWindow;
//!
//! let mut window = SlidingWindow::new(3);
//! assert_eq!(window.push(1), None);
//! window.push(2);
//! window.push(3);
//!
//! // Fourth push evicts the oldest
//! assert_eq!(window.push(4), Some(1));
//! assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
//! ```

#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;
#[cfg(feature = "std")]
use std::collections::VecDeque;

/// Bounded FIFO window
///
/// ## Internal Invariants
///
/// - `len() <= capacity()` after every operation
/// - iteration yields entries oldest first
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    /// Create an empty window holding at most `capacity` entries
    ///
    /// A zero capacity is bumped to one so the newest entry always fits.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Admit an entry, evicting and returning the oldest one when full
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the window holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the next push will evict
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently admitted entry
    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Mutable access to the most recent entry
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.entries.back_mut()
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Mutably iterate oldest first
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }

    /// Remove every entry, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.entries.drain(..)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
