use std::fmt::{Debug, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::actor::actor_error::ActorError;
use crate::actor::error_reason::ErrorReason;

mod completion;
mod completion_queue;

use completion::Completion;
pub use completion_queue::*;

enum FutureState<T> {
  Pending,
  Running,
  Cancelled,
  Finished(Result<T, ErrorReason>),
}

impl<T> FutureState<T> {
  fn is_terminal(&self) -> bool {
    matches!(self, FutureState::Cancelled | FutureState::Finished(_))
  }

  fn name(&self) -> &'static str {
    match self {
      FutureState::Pending => "pending",
      FutureState::Running => "running",
      FutureState::Cancelled => "cancelled",
      FutureState::Finished(Ok(_)) => "finished",
      FutureState::Finished(Err(_)) => "failed",
    }
  }
}

struct Slot<T> {
  state: FutureState<T>,
  completions: Vec<Completion<T>>,
}

struct Inner<T> {
  slot: Mutex<Slot<T>>,
  condvar: Condvar,
}

/// The reading side of a write-once result slot.
///
/// Every clone is another observer of the same slot. The slot lives only as
/// long as some observer does: the writing [`Promise`] holds a weak
/// reference, so a result nobody waits for is silently discarded.
pub struct ActorFuture<T> {
  inner: Arc<Inner<T>>,
}

static_assertions::assert_impl_all!(ActorFuture<String>: Send, Sync);

impl<T> Clone for ActorFuture<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T> PartialEq for ActorFuture<T> {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl<T> Eq for ActorFuture<T> {}

impl<T> Debug for ActorFuture<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let slot = self.inner.slot.lock();
    f.debug_struct("ActorFuture").field("state", &slot.state.name()).finish()
  }
}

impl<T> Default for ActorFuture<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> ActorFuture<T> {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Inner {
        slot: Mutex::new(Slot {
          state: FutureState::Pending,
          completions: Vec::new(),
        }),
        condvar: Condvar::new(),
      }),
    }
  }

  /// Returns a writer that does not keep this future alive.
  pub fn promise(&self) -> Promise<T> {
    Promise {
      inner: Arc::downgrade(&self.inner),
    }
  }

  /// Cancels the future unless it has already started running.
  ///
  /// Returns `true` if the future is cancelled after this call.
  pub fn cancel(&self) -> bool {
    let completions = {
      let mut slot = self.inner.slot.lock();
      match slot.state {
        FutureState::Pending => {}
        FutureState::Cancelled => return true,
        FutureState::Running | FutureState::Finished(_) => return false,
      }
      slot.state = FutureState::Cancelled;
      std::mem::take(&mut slot.completions)
    };
    self.inner.condvar.notify_all();
    self.run_completions(completions);
    true
  }

  pub fn cancelled(&self) -> bool {
    matches!(self.inner.slot.lock().state, FutureState::Cancelled)
  }

  pub fn running(&self) -> bool {
    matches!(self.inner.slot.lock().state, FutureState::Running)
  }

  pub fn done(&self) -> bool {
    self.inner.slot.lock().state.is_terminal()
  }

  /// Blocks until the future is done; returns whether it is.
  pub fn wait(&self, timeout: Option<Duration>) -> bool {
    self.wait_terminal(timeout).is_ok()
  }

  pub fn result(&self, timeout: Option<Duration>) -> Result<T, ActorError>
  where
    T: Clone, {
    let slot = self.wait_terminal(timeout)?;
    match &slot.state {
      FutureState::Finished(Ok(value)) => Ok(value.clone()),
      FutureState::Finished(Err(reason)) => Err(ActorError::Failed(reason.clone())),
      FutureState::Cancelled => Err(ActorError::Cancelled),
      FutureState::Pending | FutureState::Running => Err(ActorError::InvalidState("future is not done")),
    }
  }

  /// Returns the failure of a finished future, `None` if it succeeded.
  pub fn exception(&self, timeout: Option<Duration>) -> Result<Option<ErrorReason>, ActorError> {
    let slot = self.wait_terminal(timeout)?;
    match &slot.state {
      FutureState::Finished(Ok(_)) => Ok(None),
      FutureState::Finished(Err(reason)) => Ok(Some(reason.clone())),
      FutureState::Cancelled => Err(ActorError::Cancelled),
      FutureState::Pending | FutureState::Running => Err(ActorError::InvalidState("future is not done")),
    }
  }

  /// Registers `f` to run once the future is done.
  ///
  /// If the future is already done, `f` runs right away on the calling
  /// thread; otherwise it runs on whichever thread completes the future.
  /// A panicking callback is logged and does not affect other callbacks.
  pub fn add_done_callback<F>(&self, f: F)
  where
    F: FnOnce(&ActorFuture<T>) + Send + 'static, {
    let mut slot = self.inner.slot.lock();
    if !slot.state.is_terminal() {
      slot.completions.push(Completion::new(f));
      return;
    }
    drop(slot);
    self.run_completions(vec![Completion::new(f)]);
  }

  /// Returns a unit future that mirrors how this one ends.
  pub fn watch(&self) -> ActorFuture<()>
  where
    T: Send + 'static, {
    let watch = ActorFuture::new();
    let promise = watch.promise();
    self.add_done_callback(move |done| {
      let resolved = match done.exception(Some(Duration::ZERO)) {
        Ok(None) => promise.set_result(()),
        Ok(Some(reason)) => promise.set_exception(reason),
        Err(_) => {
          promise.cancel();
          Ok(())
        }
      };
      if let Err(error) = resolved {
        tracing::warn!("watch: {}", error);
      }
    });
    watch
  }

  /// Bridges this future into async code.
  pub fn to_async(&self) -> impl std::future::Future<Output = Result<T, ActorError>> + Send + 'static
  where
    T: Clone + Send + 'static, {
    let (sender, receiver) = futures::channel::oneshot::channel();
    self.add_done_callback(move |done| {
      let _ = sender.send(done.result(Some(Duration::ZERO)));
    });
    let keep_alive = self.clone();
    async move {
      let result = receiver.await.unwrap_or(Err(ActorError::Cancelled));
      drop(keep_alive);
      result
    }
  }

  fn wait_terminal(&self, timeout: Option<Duration>) -> Result<MutexGuard<'_, Slot<T>>, ActorError> {
    let deadline = timeout.map(|d| Instant::now() + d);
    let mut slot = self.inner.slot.lock();
    while !slot.state.is_terminal() {
      match (timeout, deadline) {
        (Some(timeout), Some(deadline)) => {
          if Instant::now() >= deadline {
            return Err(ActorError::Timeout(timeout));
          }
          self.inner.condvar.wait_until(&mut slot, deadline);
        }
        _ => self.inner.condvar.wait(&mut slot),
      }
    }
    Ok(slot)
  }

  fn run_completions(&self, completions: Vec<Completion<T>>) {
    for completion in completions {
      if let Err(payload) = catch_unwind(AssertUnwindSafe(|| completion.run(self))) {
        tracing::error!("done callback: {}", ErrorReason::from_panic(payload));
      }
    }
  }
}

/// The writing side of an [`ActorFuture`].
///
/// Holds only a weak reference: once every reader is dropped, all writes are
/// silent no-ops and `set_running_or_notify_cancel` always succeeds.
pub struct Promise<T> {
  inner: Weak<Inner<T>>,
}

impl<T> Clone for Promise<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Weak::clone(&self.inner),
    }
  }
}

impl<T> Debug for Promise<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Promise").field("observed", &self.is_observed()).finish()
  }
}

impl<T> Promise<T> {
  /// A promise with no reader at all.
  pub fn detached() -> Self {
    Self { inner: Weak::new() }
  }

  pub fn is_observed(&self) -> bool {
    self.inner.strong_count() > 0
  }

  /// Moves the future to running, or reports that its reader cancelled it.
  ///
  /// A `false` return means the caller must skip the work entirely.
  pub fn set_running_or_notify_cancel(&self) -> bool {
    let Some(inner) = self.inner.upgrade() else {
      return true;
    };
    let mut slot = inner.slot.lock();
    match slot.state {
      FutureState::Pending => {}
      FutureState::Cancelled => return false,
      FutureState::Running | FutureState::Finished(_) => {
        tracing::error!("future is already {}", slot.state.name());
        return false;
      }
    }
    slot.state = FutureState::Running;
    true
  }

  pub fn set_result(&self, value: T) -> Result<(), ActorError> {
    self.complete(Ok(value))
  }

  pub fn set_exception(&self, reason: ErrorReason) -> Result<(), ActorError> {
    self.complete(Err(reason))
  }

  pub fn cancel(&self) -> bool {
    match self.inner.upgrade() {
      Some(inner) => ActorFuture { inner }.cancel(),
      None => true,
    }
  }

  fn complete(&self, outcome: Result<T, ErrorReason>) -> Result<(), ActorError> {
    let Some(inner) = self.inner.upgrade() else {
      return Ok(());
    };
    let future = ActorFuture { inner };
    let completions = {
      let mut slot = future.inner.slot.lock();
      if slot.state.is_terminal() {
        return Err(ActorError::InvalidState("future has already completed"));
      }
      slot.state = FutureState::Finished(outcome);
      std::mem::take(&mut slot.completions)
    };
    future.inner.condvar.notify_all();
    future.run_completions(completions);
    Ok(())
  }
}
