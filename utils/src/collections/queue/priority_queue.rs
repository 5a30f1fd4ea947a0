use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::collections::queue::{ClosableQueue, QueueBuffer};

/// Smallest-first ordering over `E: Ord`.<br/>
/// `E: Ord` に対して最小値を優先する順序。
///
/// Elements that compare equal come out in no particular order. Callers who
/// need first-come-first-served among equal priorities should embed a
/// sequence number in the key, e.g. `(priority, seq, item)`.
#[derive(Debug, Clone)]
pub struct PriorityBuffer<E: Ord> {
  heap: BinaryHeap<Reverse<E>>,
}

impl<E: Ord> Default for PriorityBuffer<E> {
  fn default() -> Self {
    Self { heap: BinaryHeap::new() }
  }
}

impl<E: Ord + Send> QueueBuffer<E> for PriorityBuffer<E> {
  fn push(&mut self, element: E) {
    self.heap.push(Reverse(element));
  }

  fn pop(&mut self) -> Option<E> {
    self.heap.pop().map(|Reverse(e)| e)
  }

  fn len(&self) -> usize {
    self.heap.len()
  }

  fn drain_all(&mut self) -> Vec<E> {
    let mut drained = Vec::with_capacity(self.heap.len());
    while let Some(Reverse(element)) = self.heap.pop() {
      drained.push(element);
    }
    drained
  }
}

pub type PriorityQueue<E> = ClosableQueue<E, PriorityBuffer<E>>;
