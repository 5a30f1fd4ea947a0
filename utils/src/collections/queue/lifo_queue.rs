use crate::collections::queue::{ClosableQueue, QueueBuffer};
use crate::collections::Stack;

impl<E: Send> QueueBuffer<E> for Stack<E> {
  fn push(&mut self, element: E) {
    Stack::push(self, element);
  }

  fn pop(&mut self) -> Option<E> {
    Stack::pop(self)
  }

  fn len(&self) -> usize {
    self.size()
  }

  fn drain_all(&mut self) -> Vec<E> {
    let mut drained = Vec::with_capacity(self.size());
    while let Some(element) = Stack::pop(self) {
      drained.push(element);
    }
    drained
  }
}

/// Last-in, first-out queue.<br/>
/// 後入れ先出しのキュー。
pub type LifoQueue<E> = ClosableQueue<E, Stack<E>>;
