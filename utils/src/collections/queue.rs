use std::time::{Duration, Instant};

use thiserror::Error;

mod closable_queue;
mod fifo_queue;
mod lifo_queue;
mod priority_queue;

pub use self::{closable_queue::*, fifo_queue::*, lifo_queue::*, priority_queue::*};

/// An error that occurs when a queue operation fails.<br/>
/// キューの操作に失敗した場合に発生するエラー。
///
/// Offer-side variants hand the rejected element back to the caller.
#[derive(Error, Debug, PartialEq)]
pub enum QueueError<E> {
  #[error("Failed to offer an element: queue is full")]
  Full(E),
  #[error("Failed to offer an element: queue is closed")]
  OfferClosed(E),
  #[error("Failed to poll an element: queue is empty")]
  Empty,
  #[error("Failed to poll an element: queue is closed")]
  Closed,
}

impl<E> QueueError<E> {
  /// Returns whether the operation failed because the queue has been closed.<br/>
  /// キューがクローズされていたために操作が失敗したかどうかを返します。
  pub fn is_closed(&self) -> bool {
    matches!(self, QueueError::OfferClosed(_) | QueueError::Closed)
  }

  /// Returns the rejected element of a failed offer, if any.<br/>
  /// 挿入に失敗した要素があれば返します。
  pub fn into_element(self) -> Option<E> {
    match self {
      QueueError::Full(e) | QueueError::OfferClosed(e) => Some(e),
      QueueError::Empty | QueueError::Closed => None,
    }
  }
}

/// The size of the queue.<br/>
/// キューのサイズ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueSize {
  /// The queue has no capacity limit.<br/>
  /// キューに容量制限がない。
  #[default]
  Limitless,
  /// The queue has a capacity limit.<br/>
  /// キューに容量制限がある。
  Limited(usize),
}

impl QueueSize {
  /// Converts a raw capacity where `0` means unbounded.<br/>
  /// `0` を無制限とみなして容量を変換します。
  pub fn from_capacity(capacity: usize) -> Self {
    if capacity == 0 {
      QueueSize::Limitless
    } else {
      QueueSize::Limited(capacity)
    }
  }

  /// Converts to an option type.<br/>
  /// オプション型に変換します。
  ///
  /// # Return Value / 戻り値
  /// - `None` - If the queue has no capacity limit. / キューに容量制限がない場合。
  /// - `Some(num)` - If the queue has a capacity limit. / キューに容量制限がある場合。
  pub fn to_option(&self) -> Option<usize> {
    match self {
      QueueSize::Limitless => None,
      QueueSize::Limited(c) => Some(*c),
    }
  }

  pub(crate) fn is_reached_by(&self, len: usize) -> bool {
    match self {
      QueueSize::Limitless => false,
      QueueSize::Limited(c) => len >= *c,
    }
  }
}

/// How long a queue operation may wait for room or for an element.<br/>
/// キュー操作が空きや要素を待つ時間。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
  /// Fail immediately. / 即座に失敗する。
  NoWait,
  /// Wait until the operation can proceed or the queue is closed. / 操作可能になるかクローズされるまで待つ。
  Forever,
  /// Wait at most the given duration. / 指定時間まで待つ。
  Timeout(Duration),
}

impl WaitMode {
  /// Builds a mode from the classic `(block, timeout)` pair.<br/>
  /// 従来の `(block, timeout)` の組からモードを生成します。
  pub fn from_parts(block: bool, timeout: Option<Duration>) -> Self {
    match (block, timeout) {
      (false, _) => WaitMode::NoWait,
      (true, None) => WaitMode::Forever,
      (true, Some(d)) => WaitMode::Timeout(d),
    }
  }

  pub(crate) fn deadline(&self) -> Option<Instant> {
    match self {
      WaitMode::Timeout(d) => Some(Instant::now() + *d),
      WaitMode::NoWait | WaitMode::Forever => None,
    }
  }
}

/// The ordering policy of a [`ClosableQueue`].<br/>
/// [`ClosableQueue`] の順序付けポリシー。
///
/// Implementations are only ever touched under the queue's lock.
pub trait QueueBuffer<E>: Send {
  fn push(&mut self, element: E);

  fn pop(&mut self) -> Option<E>;

  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Removes every element, in pop order.
  fn drain_all(&mut self) -> Vec<E>;
}
