use std::sync::Arc;

use parking_lot::Mutex;
use spindle_actor_utils_rs::collections::{FifoQueue, QueueError, WaitMode};

use crate::actor::future::ActorFuture;

struct State<T> {
  uncompleted: Vec<ActorFuture<T>>,
  closed: bool,
}

/// Closable queue that yields futures in the order they complete.
///
/// `get` only ever returns done futures, so it may block even while the
/// queue still holds uncompleted ones. After a graceful close, `get` keeps
/// returning futures until every one put before the close is done, then
/// fails with [`QueueError::Closed`].
pub struct CompletionQueue<T> {
  state: Arc<Mutex<State<T>>>,
  completed: FifoQueue<ActorFuture<T>>,
}

impl<T> Clone for CompletionQueue<T> {
  fn clone(&self) -> Self {
    Self {
      state: Arc::clone(&self.state),
      completed: self.completed.clone(),
    }
  }
}

impl<T> Default for CompletionQueue<T>
where
  T: Send + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T> CompletionQueue<T>
where
  T: Send + 'static,
{
  pub fn new() -> Self {
    Self {
      state: Arc::new(Mutex::new(State {
        uncompleted: Vec::new(),
        closed: false,
      })),
      completed: FifoQueue::unbounded(),
    }
  }

  pub fn put(&self, future: ActorFuture<T>) -> Result<(), QueueError<ActorFuture<T>>> {
    {
      let mut state = self.state.lock();
      if state.closed {
        return Err(QueueError::OfferClosed(future));
      }
      state.uncompleted.push(future.clone());
    }
    let state = Arc::clone(&self.state);
    let completed = self.completed.clone();
    future.add_done_callback(move |done| Self::on_completion(&state, &completed, done));
    Ok(())
  }

  /// Returns the next done future, waiting as `mode` allows.
  pub fn get(&self, mode: WaitMode) -> Result<ActorFuture<T>, QueueError<ActorFuture<T>>> {
    self.completed.take_with(mode)
  }

  /// Closes the queue.
  ///
  /// A hard close returns every future not yet handed out, done or not, and
  /// stops tracking them.
  pub fn close(&self, graceful: bool) -> Vec<ActorFuture<T>> {
    let mut state = self.state.lock();
    state.closed = true;
    if graceful {
      if state.uncompleted.is_empty() {
        self.completed.close(true);
      }
      Vec::new()
    } else {
      let mut items = self.completed.close(false);
      while let Ok(future) = self.completed.poll() {
        items.push(future);
      }
      items.append(&mut state.uncompleted);
      items
    }
  }

  pub fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  pub fn len(&self) -> usize {
    let state = self.state.lock();
    state.uncompleted.len() + self.completed.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn on_completion(state: &Mutex<State<T>>, completed: &FifoQueue<ActorFuture<T>>, done: &ActorFuture<T>) {
    let mut state = state.lock();
    let Some(index) = state.uncompleted.iter().position(|f| f == done) else {
      return;
    };
    state.uncompleted.swap_remove(index);
    if let Err(error) = completed.offer(done.clone()) {
      tracing::debug!("completion queue: {}", error);
    }
    if state.closed && state.uncompleted.is_empty() {
      completed.close(true);
    }
  }
}
