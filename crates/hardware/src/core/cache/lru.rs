//! Least-recently-used replacement tracking.
//!
//! Maintains one usage stack per set: index 0 is the most recently used way,
//! the last index is the least recently used. A touched way moves to the
//! front; the victim is always the back of the stack. A freshly filled way
//! is touched by its engine, so "most recently filled is MRU" holds by
//! construction.

/// Per-set usage stacks.
#[derive(Debug)]
pub struct LruTracker {
    /// One usage stack per set; front is MRU, back is LRU.
    usage: Vec<Vec<usize>>,
}

impl LruTracker {
    /// Creates a tracker for `sets` sets of `ways` ways.
    ///
    /// Initial order is way 0 MRU through way N-1 LRU, so an empty set fills
    /// from the highest way first.
    pub fn new(sets: usize, ways: usize) -> Self {
        let mut usage = Vec::with_capacity(sets);
        for _ in 0..sets {
            usage.push((0..ways).collect());
        }
        Self { usage }
    }

    /// Moves `way` to the MRU position of `set`.
    pub fn update(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, way);
    }

    /// Returns the LRU way of `set`.
    pub fn victim(&self, set: usize) -> usize {
        self.usage[set].last().copied().unwrap_or(0)
    }
}
