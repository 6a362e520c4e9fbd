//! Indexed binary min-heap with decrease-key support.
//!
//! [`PriorityQueue`] keeps, next to the heap array, a map from each value to
//! its slot in that array. This makes [`contains`](PriorityQueue::contains)
//! O(1) and lets [`update_priority`](PriorityQueue::update_priority) move an
//! element in place in O(log n). Every slot exchange goes through
//! `swap_nodes`, which updates the array and the map together.
//!
//! Ties between equal priorities are resolved by heap mechanics, so the
//! queue is not FIFO-stable.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// A value together with its priority, as stored in the heap.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapNode<T, P> {
    pub value: T,
    pub priority: P,
}

/// Plain function comparator, the default ordering type of a queue.
pub type Comparator<P> = fn(&P, &P) -> Ordering;

/// Ascending order; incomparable priorities (NaN) compare equal.
fn ascending<P: PartialOrd>(a: &P, b: &P) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// A min-heap of unique values ordered by priority.
///
/// The element that compares [`Ordering::Less`] than every other under the
/// comparator sits at the root. With the default comparator this is the
/// smallest priority.
pub struct PriorityQueue<T, P = f64, C = Comparator<P>> {
    heap: Vec<HeapNode<T, P>>,
    slots: HashMap<T, usize>,
    cmp: C,
}

impl<T: Eq + Hash + Clone, P: PartialOrd> PriorityQueue<T, P> {
    /// Create an empty queue ordered by ascending priority.
    pub fn new() -> Self {
        Self::with_comparator(ascending::<P>)
    }
}

impl<T: Eq + Hash + Clone, P: PartialOrd> Default for PriorityQueue<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, C> PriorityQueue<T, P, C>
where
    T: Eq + Hash + Clone,
    C: Fn(&P, &P) -> Ordering,
{
    /// Create an empty queue using a custom ordering.
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            heap: Vec::new(),
            slots: HashMap::new(),
            cmp,
        }
    }

    /// Number of queued values.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The root element, without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&HeapNode<T, P>> {
        self.heap.first()
    }

    /// Whether `value` is queued.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.slots.contains_key(value)
    }

    /// Current priority of `value`, if queued.
    pub fn priority_of(&self, value: &T) -> Option<&P> {
        self.slots.get(value).map(|&i| &self.heap[i].priority)
    }

    /// Insert `value` with `priority`.
    ///
    /// Values are unique within a queue: if `value` is already present the
    /// queue is left untouched and `false` is returned. Use
    /// [`update_priority`](Self::update_priority) to change its priority.
    pub fn enqueue(&mut self, value: T, priority: P) -> bool {
        if self.slots.contains_key(&value) {
            return false;
        }
        let i = self.heap.len();
        self.slots.insert(value.clone(), i);
        self.heap.push(HeapNode { value, priority });
        self.sift_up(i);
        true
    }

    /// Remove and return the root element.
    pub fn dequeue(&mut self) -> Option<HeapNode<T, P>> {
        if self.heap.is_empty() {
            return None;
        }
        self.take(0)
    }

    /// Change the priority of a queued value, moving it up or down as
    /// needed. Returns `false` if `value` is not queued.
    pub fn update_priority(&mut self, value: &T, priority: P) -> bool {
        let Some(&i) = self.slots.get(value) else {
            return false;
        };
        let old = std::mem::replace(&mut self.heap[i].priority, priority);
        match (self.cmp)(&self.heap[i].priority, &old) {
            Ordering::Less => {
                self.sift_up(i);
            }
            Ordering::Greater => {
                self.sift_down(i);
            }
            Ordering::Equal => {}
        }
        true
    }

    /// Remove a specific value from the queue.
    pub fn remove(&mut self, value: &T) -> Option<HeapNode<T, P>> {
        let i = *self.slots.get(value)?;
        self.take(i)
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
    }

    /// Iterate over the queued elements in heap (not priority) order.
    pub fn iter(&self) -> impl Iterator<Item = &HeapNode<T, P>> {
        self.heap.iter()
    }

    // -----------------------------------------------------------------------
    // Heap mechanics
    // -----------------------------------------------------------------------

    /// Detach the node at slot `i`, refilling the hole from the tail.
    fn take(&mut self, i: usize) -> Option<HeapNode<T, P>> {
        let last = self.heap.len() - 1;
        self.swap_nodes(i, last);
        let node = self.heap.pop()?;
        self.slots.remove(&node.value);
        if i < self.heap.len() {
            let j = self.sift_down(i);
            if j == i {
                self.sift_up(i);
            }
        }
        Some(node)
    }

    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        (self.cmp)(&self.heap[a].priority, &self.heap[b].priority) == Ordering::Less
    }

    /// Exchange two slots, keeping the value → slot map in step.
    fn swap_nodes(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        if let Some(slot) = self.slots.get_mut(&self.heap[a].value) {
            *slot = a;
        }
        if let Some(slot) = self.slots.get_mut(&self.heap[b].value) {
            *slot = b;
        }
    }

    fn sift_up(&mut self, mut i: usize) -> usize {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent) {
                break;
            }
            self.swap_nodes(i, parent);
            i = parent;
        }
        i
    }

    fn sift_down(&mut self, mut i: usize) -> usize {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut best = i;
            if left < n && self.less(left, best) {
                best = left;
            }
            if right < n && self.less(right, best) {
                best = right;
            }
            if best == i {
                return i;
            }
            self.swap_nodes(i, best);
            i = best;
        }
    }
}

impl<T, P, C> Extend<(T, P)> for PriorityQueue<T, P, C>
where
    T: Eq + Hash + Clone,
    C: Fn(&P, &P) -> Ordering,
{
    fn extend<I: IntoIterator<Item = (T, P)>>(&mut self, iter: I) {
        for (value, priority) in iter {
            self.enqueue(value, priority);
        }
    }
}

impl<T: Eq + Hash + Clone, P: PartialOrd> FromIterator<(T, P)> for PriorityQueue<T, P> {
    fn from_iter<I: IntoIterator<Item = (T, P)>>(iter: I) -> Self {
        let mut q = Self::new();
        q.extend(iter);
        q
    }
}

impl<T: std::fmt::Debug, P: std::fmt::Debug, C> std::fmt::Debug for PriorityQueue<T, P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("heap", &self.heap)
            .finish_non_exhaustive()
    }
}
