use std::collections::VecDeque;

use crate::collections::queue::{ClosableQueue, QueueBuffer};

/// First-in, first-out ordering.<br/>
/// 先入れ先出しの順序。
#[derive(Debug, Clone)]
pub struct FifoBuffer<E> {
  items: VecDeque<E>,
}

impl<E> Default for FifoBuffer<E> {
  fn default() -> Self {
    Self { items: VecDeque::new() }
  }
}

impl<E: Send> QueueBuffer<E> for FifoBuffer<E> {
  fn push(&mut self, element: E) {
    self.items.push_back(element);
  }

  fn pop(&mut self) -> Option<E> {
    self.items.pop_front()
  }

  fn len(&self) -> usize {
    self.items.len()
  }

  fn drain_all(&mut self) -> Vec<E> {
    self.items.drain(..).collect()
  }
}

pub type FifoQueue<E> = ClosableQueue<E, FifoBuffer<E>>;
