use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use spindle_actor_utils_rs::collections::WaitMode;

use crate::actor::actor_error::ActorError;
use crate::actor::actor_handle::ActorHandle;
use crate::actor::future::ActorFuture;
use crate::actor::message::HandlerResult;
use crate::actor::stub::Stub;

/// A set of same-type stubs that can be addressed like one.
///
/// Calls go round-robin to the members regardless of how busy they are.
/// Members found dead are dropped from the rotation. The pool's lifetime
/// resolves once every member has exited, whatever the outcome.
pub struct StubPool<A> {
  inner: Arc<PoolInner<A>>,
}

struct PoolInner<A> {
  name: String,
  stubs: Mutex<VecDeque<Stub<A>>>,
  lifetime: ActorFuture<()>,
}

impl<A> Clone for StubPool<A> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<A> Debug for StubPool<A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StubPool")
      .field("name", &self.inner.name)
      .field("members", &self.inner.stubs.lock().len())
      .finish()
  }
}

impl<A: 'static> StubPool<A> {
  /// Fails with [`ActorError::Exited`] if any member is already dead.
  pub fn new(stubs: impl IntoIterator<Item = Stub<A>>) -> Result<Self, ActorError> {
    let stubs = stubs.into_iter().collect::<VecDeque<_>>();
    let name = format!(
      "StubPool({})",
      stubs.iter().map(|stub| stub.name()).collect::<Vec<_>>().join(", ")
    );

    let lifetime = ActorFuture::new();
    if stubs.is_empty() {
      let _ = lifetime.promise().set_result(());
    }
    let remaining = Arc::new(AtomicUsize::new(stubs.len()));
    for stub in &stubs {
      let remaining = Arc::clone(&remaining);
      let promise = lifetime.promise();
      stub.lifetime().add_done_callback(move |_| {
        if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
          if let Err(error) = promise.set_result(()) {
            tracing::error!("StubPool: {}", error);
          }
        }
      });
    }
    // Members may die while the callbacks are being registered.
    if let Some(dead) = stubs.iter().find(|stub| !stub.is_alive()) {
      return Err(ActorError::Exited(dead.name().to_string()));
    }

    Ok(Self {
      inner: Arc::new(PoolInner {
        name,
        stubs: Mutex::new(stubs),
        lifetime,
      }),
    })
  }

  pub fn call<R, F>(&self, f: F) -> Result<ActorFuture<R>, ActorError>
  where
    R: Send + 'static,
    F: FnOnce(&mut A) -> HandlerResult<R, A> + Send + 'static, {
    self.next_stub()?.call(f)
  }

  pub fn send_message<R, F>(&self, f: F, mode: WaitMode) -> Result<ActorFuture<R>, ActorError>
  where
    R: Send + 'static,
    F: FnOnce(&mut A) -> HandlerResult<R, A> + Send + 'static, {
    self.next_stub()?.send_message(f, mode)
  }
}

impl<A> StubPool<A> {
  pub fn name(&self) -> &str {
    &self.inner.name
  }

  pub fn kill(&self, graceful: bool) {
    for stub in self.inner.stubs.lock().iter() {
      stub.kill(graceful);
    }
  }

  pub fn lifetime(&self) -> ActorFuture<()> {
    self.inner.lifetime.clone()
  }

  /// Members still in the rotation.
  pub fn len(&self) -> usize {
    self.inner.stubs.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn next_stub(&self) -> Result<Stub<A>, ActorError> {
    let mut stubs = self.inner.stubs.lock();
    while let Some(stub) = stubs.pop_front() {
      if stub.is_alive() {
        stubs.push_back(stub.clone());
        return Ok(stub);
      }
      match stub.lifetime().exception(None) {
        Ok(Some(reason)) => tracing::error!("StubPool: stub errs: {}: {}", stub.name(), reason),
        _ => tracing::error!("StubPool: stub exits: {}", stub.name()),
      }
    }
    Err(ActorError::NoStubAvailable)
  }
}

impl<A: 'static> ActorHandle for StubPool<A> {
  fn name(&self) -> &str {
    StubPool::name(self)
  }

  fn kill(&self, graceful: bool) {
    StubPool::kill(self, graceful)
  }

  fn exit_watch(&self) -> ActorFuture<()> {
    self.lifetime()
  }
}
