// Heap operations over plain slices.
//
// A heap is a tree-like structure where every subtree's root has a better score
// than all the other nodes in the subtree. Stored in an array, a binary heap
// numbers its nodes level by level:
//
// ```text
//                           0
//              1                         2
//       3            4            5             6
//   7      8      9     10    11     12     13     14
// 15 16  17 18  19 20  21 22 23 24  25
// ```
//
// The last level will often be incomplete
//
// For an `A`-ary heap,
//   - Up:          `(i-1)/A`
//   - First child: `(A*i) + 1`
//   - Last child:  `A*(i+1)`

/// The parent node
///
/// ```
/// use statespace::heap_primitives::index_parent;
/// assert_eq!(index_parent::<2>(1), 0);
/// assert_eq!(index_parent::<2>(2), 0);
/// assert_eq!(index_parent::<2>(3), 1);
/// assert_eq!(index_parent::<2>(4), 1);
/// assert_eq!(index_parent::<2>(25), 12);
/// assert_eq!(index_parent::<4>(8), 1);
/// ```
#[inline(always)]
#[must_use]
pub fn index_parent<const A: usize>(i: usize) -> usize {
    debug_assert!(i > 0, "The root has no parent");
    (i - 1) / A
}

/// The first (left-most) child
///
/// ```
/// use statespace::heap_primitives::index_first_children;
/// assert_eq!(index_first_children::<2>(0), 1);
/// assert_eq!(index_first_children::<2>(1), 3);
/// assert_eq!(index_first_children::<2>(11), 23);
/// assert_eq!(index_first_children::<4>(1), 5);
/// ```
#[inline(always)]
#[must_use]
pub fn index_first_children<const A: usize>(i: usize) -> usize {
    (A * i) + 1
}

/// The last (right-most) child
///
/// ```
/// use statespace::heap_primitives::index_last_children;
/// assert_eq!(index_last_children::<2>(0), 2);
/// assert_eq!(index_last_children::<2>(1), 4);
/// assert_eq!(index_last_children::<2>(6), 14);
/// assert_eq!(index_last_children::<4>(1), 8);
/// ```
#[inline(always)]
#[must_use]
pub fn index_last_children<const A: usize>(i: usize) -> usize {
    A * (i + 1)
}

/// Raises `heap[i]` until its parent is not worse than it.
///
/// Returns its new index.
pub fn sift_up<const A: usize, T: Ord>(heap: &mut [T], mut i: usize) -> usize {
    debug_assert!(i < heap.len());
    while i > 0 {
        let parent = index_parent::<A>(i);
        if heap[parent] <= heap[i] {
            break;
        }
        heap.swap(parent, i);
        i = parent;
    }
    i
}

/// Lowers `heap[i]` until none of its children is better than it.
///
/// Returns its new index.
pub fn sift_down<const A: usize, T: Ord>(heap: &mut [T], mut i: usize) -> usize {
    let len = heap.len();
    loop {
        let first = index_first_children::<A>(i);
        if first >= len {
            return i;
        }
        let last = std::cmp::min(index_last_children::<A>(i), len - 1);

        let mut best = first;
        for child in (first + 1)..=last {
            if heap[child] < heap[best] {
                best = child;
            }
        }
        if heap[i] <= heap[best] {
            return i;
        }
        heap.swap(i, best);
        i = best;
    }
}

/// Checks the heap property on every node.
pub fn is_heap<const A: usize, T: Ord>(heap: &[T]) -> bool {
    (1..heap.len()).all(|i| heap[index_parent::<A>(i)] <= heap[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sift_up_restores_heap() {
        let mut heap = vec![1, 3, 2, 7, 8, 9];
        heap.push(0);
        let last = heap.len() - 1;
        assert_eq!(sift_up::<2, _>(&mut heap, last), 0);
        assert!(is_heap::<2, _>(&heap));
    }

    #[test]
    fn sift_down_restores_heap() {
        let mut heap = vec![10, 3, 2, 7, 8, 9, 4];
        sift_down::<2, _>(&mut heap, 0);
        assert!(is_heap::<2, _>(&heap));
        assert_eq!(heap[0], 2);
    }

    #[test]
    fn wider_heaps() {
        let mut heap: Vec<u32> = vec![];
        for v in [9, 4, 7, 1, 8, 2, 6, 3, 5, 0] {
            heap.push(v);
            let last = heap.len() - 1;
            sift_up::<4, _>(&mut heap, last);
            assert!(is_heap::<4, _>(&heap));
        }
        assert_eq!(heap[0], 0);
    }
}
