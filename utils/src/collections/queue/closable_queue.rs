use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::collections::queue::{FifoBuffer, QueueBuffer, QueueError, QueueSize, WaitMode};


/// A thread-safe queue that can be closed.<br/>
/// クローズ可能なスレッドセーフなキュー。
///
/// Once closed, a queue never reopens: every blocked and future `put` fails,
/// while `take` keeps draining what is left (unless the close was a hard
/// one) and then fails with [`QueueError::Closed`]. Clones share the same
/// queue.
pub struct ClosableQueue<E, B = FifoBuffer<E>> {
  inner: Arc<Inner<E, B>>,
}

struct Inner<E, B> {
  state: Mutex<State<B>>,
  not_empty: Condvar,
  not_full: Condvar,
  capacity: QueueSize,
  phantom_data: PhantomData<fn() -> E>,
}

struct State<B> {
  buffer: B,
  closed: bool,
}

impl<E, B> Clone for ClosableQueue<E, B> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<E, B: QueueBuffer<E>> Debug for ClosableQueue<E, B> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = self.inner.state.lock();
    f.debug_struct("ClosableQueue")
      .field("len", &state.buffer.len())
      .field("capacity", &self.inner.capacity)
      .field("closed", &state.closed)
      .finish()
  }
}

impl<E, B: QueueBuffer<E> + Default> ClosableQueue<E, B> {
  /// Creates an empty queue with the given capacity.<br/>
  /// 指定された容量で空のキューを生成します。
  pub fn new(capacity: QueueSize) -> Self {
    Self::with_buffer(B::default(), capacity)
  }

  /// Creates an empty queue with no capacity limit.<br/>
  /// 容量制限のない空のキューを生成します。
  pub fn unbounded() -> Self {
    Self::new(QueueSize::Limitless)
  }
}

impl<E, B: QueueBuffer<E>> ClosableQueue<E, B> {
  /// Creates a queue on top of an existing buffer.<br/>
  /// 既存のバッファを用いてキューを生成します。
  pub fn with_buffer(buffer: B, capacity: QueueSize) -> Self {
    Self {
      inner: Arc::new(Inner {
        state: Mutex::new(State { buffer, closed: false }),
        not_empty: Condvar::new(),
        not_full: Condvar::new(),
        capacity,
        phantom_data: PhantomData,
      }),
    }
  }

  /// Inserts an element, waiting for room as `mode` allows.<br/>
  /// `mode` の許す範囲で空きを待ち、要素を挿入します。
  ///
  /// # Return Value / 戻り値
  /// - `Ok(())` - If the element is inserted. / 要素が挿入された場合。
  /// - `Err(QueueError::Full(element))` - If there was no room in time. / 時間内に空きがなかった場合。
  /// - `Err(QueueError::OfferClosed(element))` - If the queue is closed, even while waiting. / 待機中を含めキューがクローズされた場合。
  pub fn put_with(&self, element: E, mode: WaitMode) -> Result<(), QueueError<E>> {
    let deadline = mode.deadline();
    let mut state = self.inner.state.lock();
    loop {
      if state.closed {
        return Err(QueueError::OfferClosed(element));
      }
      if !self.inner.capacity.is_reached_by(state.buffer.len()) {
        break;
      }
      match (mode, deadline) {
        (WaitMode::Forever, _) => self.inner.not_full.wait(&mut state),
        (WaitMode::Timeout(_), Some(deadline)) if std::time::Instant::now() < deadline => {
          self.inner.not_full.wait_until(&mut state, deadline);
        }
        _ => return Err(QueueError::Full(element)),
      }
    }
    state.buffer.push(element);
    drop(state);
    self.inner.not_empty.notify_one();
    Ok(())
  }

  /// Inserts an element without waiting.<br/>
  /// 待機せずに要素を挿入します。
  pub fn offer(&self, element: E) -> Result<(), QueueError<E>> {
    self.put_with(element, WaitMode::NoWait)
  }

  /// Inserts an element, waiting as long as it takes for room.<br/>
  /// 空きが生じるまで待機して要素を挿入します。
  pub fn put(&self, element: E) -> Result<(), QueueError<E>> {
    self.put_with(element, WaitMode::Forever)
  }

  pub fn put_timeout(&self, element: E, timeout: Duration) -> Result<(), QueueError<E>> {
    self.put_with(element, WaitMode::Timeout(timeout))
  }

  /// Removes the next element per the buffer's ordering, waiting as `mode` allows.<br/>
  /// `mode` の許す範囲で待機し、バッファの順序に従って次の要素を取り出します。
  ///
  /// # Return Value / 戻り値
  /// - `Ok(element)` - If an element is retrieved. / 要素を取得した場合。
  /// - `Err(QueueError::Empty)` - If nothing arrived in time. / 時間内に要素が届かなかった場合。
  /// - `Err(QueueError::Closed)` - If the queue is closed and drained. / キューがクローズされ空になった場合。
  pub fn take_with(&self, mode: WaitMode) -> Result<E, QueueError<E>> {
    let deadline = mode.deadline();
    let mut state = self.inner.state.lock();
    loop {
      if let Some(element) = state.buffer.pop() {
        drop(state);
        self.inner.not_full.notify_one();
        return Ok(element);
      }
      if state.closed {
        return Err(QueueError::Closed);
      }
      match (mode, deadline) {
        (WaitMode::Forever, _) => self.inner.not_empty.wait(&mut state),
        (WaitMode::Timeout(_), Some(deadline)) if std::time::Instant::now() < deadline => {
          self.inner.not_empty.wait_until(&mut state, deadline);
        }
        _ => return Err(QueueError::Empty),
      }
    }
  }

  /// Removes the next element without waiting.<br/>
  /// 待機せずに次の要素を取り出します。
  pub fn poll(&self) -> Result<E, QueueError<E>> {
    self.take_with(WaitMode::NoWait)
  }

  /// Removes the next element, waiting until one is available or the queue is closed.<br/>
  /// 要素が利用可能になるかキューがクローズされるまで待機して、次の要素を取り出します。
  pub fn take(&self) -> Result<E, QueueError<E>> {
    self.take_with(WaitMode::Forever)
  }

  pub fn take_timeout(&self, timeout: Duration) -> Result<E, QueueError<E>> {
    self.take_with(WaitMode::Timeout(timeout))
  }

  /// Closes this queue and wakes every waiter.<br/>
  /// キューをクローズし、待機中のすべてのスレッドを起こします。
  ///
  /// A graceful close leaves queued elements for `take` to drain and returns
  /// nothing; a hard close removes and returns them. Closing an already
  /// closed queue is a no-op that returns nothing.
  pub fn close(&self, graceful: bool) -> Vec<E> {
    let mut state = self.inner.state.lock();
    if state.closed {
      return Vec::new();
    }
    state.closed = true;
    let drained = if graceful { Vec::new() } else { state.buffer.drain_all() };
    drop(state);
    self.inner.not_empty.notify_all();
    self.inner.not_full.notify_all();
    drained
  }

  pub fn is_closed(&self) -> bool {
    self.lock_state().closed
  }

  pub fn is_full(&self) -> bool {
    self.inner.capacity.is_reached_by(self.lock_state().buffer.len())
  }

  pub fn is_empty(&self) -> bool {
    self.lock_state().buffer.is_empty()
  }

  pub fn len(&self) -> usize {
    self.lock_state().buffer.len()
  }

  pub fn capacity(&self) -> QueueSize {
    self.inner.capacity
  }

  fn lock_state(&self) -> MutexGuard<'_, State<B>> {
    self.inner.state.lock()
  }
}
