//! Containers of discovered but unexpanded nodes.
//!
//! The discipline used to pick the next node defines the search:
//! - [`FifoFrontier`]: oldest first, breadth-first search.
//! - [`LifoFrontier`]: newest first, depth-first search.
//! - [`PriorityFrontier`]: lowest key first, best-first searches.

use std::collections::VecDeque;

use crate::heap_primitives::sift_down;
use crate::heap_primitives::sift_up;

/// Binary heaps keep the comparisons per pop low for small entries.
const HEAP_ARITY: usize = 2usize;

pub trait Frontier<T> {
    /// Adds an item.
    fn add(&mut self, item: T);
    /// Removes the next item according to the discipline.
    fn pop(&mut self) -> Option<T>;
    /// Peeks at the item `pop` would return.
    fn top(&self) -> Option<&T>;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The largest size the frontier had.
    fn high_water(&self) -> usize;
}

/// First-in-first-out.
#[derive(Debug, Clone)]
pub struct FifoFrontier<T> {
    queue: VecDeque<T>,
    high_water: usize,
}

impl<T> FifoFrontier<T> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            high_water: 0,
        }
    }
}

impl<T> Default for FifoFrontier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Frontier<T> for FifoFrontier<T> {
    #[inline(always)]
    fn add(&mut self, item: T) {
        self.queue.push_back(item);
        self.high_water = self.high_water.max(self.queue.len());
    }
    #[inline(always)]
    fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }
    fn top(&self) -> Option<&T> {
        self.queue.front()
    }
    fn len(&self) -> usize {
        self.queue.len()
    }
    fn high_water(&self) -> usize {
        self.high_water
    }
}

/// Last-in-first-out.
#[derive(Debug, Clone)]
pub struct LifoFrontier<T> {
    stack: Vec<T>,
    high_water: usize,
}

impl<T> LifoFrontier<T> {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            high_water: 0,
        }
    }
}

impl<T> Default for LifoFrontier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Frontier<T> for LifoFrontier<T> {
    #[inline(always)]
    fn add(&mut self, item: T) {
        self.stack.push(item);
        self.high_water = self.high_water.max(self.stack.len());
    }
    #[inline(always)]
    fn pop(&mut self) -> Option<T> {
        self.stack.pop()
    }
    fn top(&self) -> Option<&T> {
        self.stack.last()
    }
    fn len(&self) -> usize {
        self.stack.len()
    }
    fn high_water(&self) -> usize {
        self.high_water
    }
}

/// A heap entry.
///
/// Ranked by `(key, order)`, so equal keys come out in insertion order. The
/// item itself is never compared.
#[derive(Debug, Clone)]
struct PriorityEntry<K, T> {
    key: K,
    order: u64,
    item: T,
}

impl<K: Ord, T> PartialEq for PriorityEntry<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.order == other.order
    }
}
impl<K: Ord, T> Eq for PriorityEntry<K, T> {}

impl<K: Ord, T> PartialOrd for PriorityEntry<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<K: Ord, T> Ord for PriorityEntry<K, T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key
            .cmp(&other.key)
            .then(self.order.cmp(&other.order))
    }
}

/// Lowest key first.
///
/// The key of an item is computed once, when it's added.
pub struct PriorityFrontier<T, K, F>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    heap: Vec<PriorityEntry<K, T>>,
    key: F,
    next_order: u64,
    high_water: usize,
}

impl<T, K, F> PriorityFrontier<T, K, F>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    pub fn new(key: F) -> Self {
        Self {
            heap: Vec::new(),
            key,
            next_order: 0,
            high_water: 0,
        }
    }

    pub fn with_items<I: IntoIterator<Item = T>>(items: I, key: F) -> Self {
        let mut frontier = Self::new(key);
        for item in items {
            frontier.add(item);
        }
        frontier
    }

    /// The key of the item `pop` would return.
    pub fn top_key(&self) -> Option<&K> {
        self.heap.first().map(|e| &e.key)
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    fn verify_heap(&self) {}
    #[inline(always)]
    #[cfg(feature = "verify")]
    fn verify_heap(&self) {
        assert!(crate::heap_primitives::is_heap::<HEAP_ARITY, _>(&self.heap));
    }
}

impl<T, K, F> Frontier<T> for PriorityFrontier<T, K, F>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    fn add(&mut self, item: T) {
        let entry = PriorityEntry {
            key: (self.key)(&item),
            order: self.next_order,
            item,
        };
        self.next_order += 1;

        self.heap.push(entry);
        let last = self.heap.len() - 1;
        sift_up::<HEAP_ARITY, _>(&mut self.heap, last);
        self.high_water = self.high_water.max(self.heap.len());
        self.verify_heap();
    }

    fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let entry = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            sift_down::<HEAP_ARITY, _>(&mut self.heap, 0);
        }
        self.verify_heap();
        Some(entry.item)
    }

    fn top(&self) -> Option<&T> {
        self.heap.first().map(|e| &e.item)
    }
    fn len(&self) -> usize {
        self.heap.len()
    }
    fn high_water(&self) -> usize {
        self.high_water
    }
}

impl<T, K, F> std::fmt::Debug for PriorityFrontier<T, K, F>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "PriorityFrontier{{({} items)}}", self.heap.len())
    }
}
