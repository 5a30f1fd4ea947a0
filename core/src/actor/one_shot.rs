use std::fmt::{Debug, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use crate::actor::actor_error::ActorError;
use crate::actor::actor_handle::ActorHandle;
use crate::actor::error_reason::ErrorReason;
use crate::actor::future::ActorFuture;
use crate::actor::props::Props;

/// Runs `f` once on a thread of its own.
///
/// There is no mailbox: the returned stub's lifetime future carries the
/// value `f` returns, or its error.
pub fn spawn_one_shot<T, F>(props: Props, f: F) -> Result<OneShotStub<T>, ActorError>
where
  T: Send + 'static,
  F: FnOnce() -> Result<T, ErrorReason> + Send + 'static, {
  let name = props.resolve_name("one-shot");
  let lifetime = ActorFuture::new();
  let promise = lifetime.promise();
  let span_name = name.clone();
  thread::Builder::new()
    .name(name.clone())
    .spawn(move || {
      let span = tracing::debug_span!("actor", name = %span_name);
      let _enter = span.enter();
      if !promise.set_running_or_notify_cancel() {
        tracing::debug!("cancelled before start");
        return;
      }
      tracing::debug!("start");
      let resolved = match catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(ErrorReason::from_panic(payload))) {
        Ok(value) => promise.set_result(value),
        Err(reason) => promise.set_exception(reason),
      };
      if let Err(error) = resolved {
        tracing::error!("failed to resolve the lifetime: {}", error);
      }
      tracing::debug!("exit");
    })
    .map_err(|error| ActorError::Generic(error.to_string()))?;
  Ok(OneShotStub { name, lifetime })
}

pub struct OneShotStub<T> {
  name: String,
  lifetime: ActorFuture<T>,
}

impl<T> Debug for OneShotStub<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OneShotStub")
      .field("name", &self.name)
      .field("lifetime", &self.lifetime)
      .finish()
  }
}

impl<T> OneShotStub<T> {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn lifetime(&self) -> ActorFuture<T> {
    self.lifetime.clone()
  }

  /// Cancels the function if it has not started yet; a running one is left alone.
  pub fn kill(&self, _graceful: bool) {
    self.lifetime.cancel();
  }

  /// A one-shot actor takes no messages.
  pub fn send_message<M>(&self, _message: M) -> Result<ActorFuture<()>, ActorError> {
    Err(ActorError::Exited(self.name.clone()))
  }

  pub fn is_alive(&self) -> bool {
    !self.lifetime.done()
  }
}

impl<T: Send + 'static> ActorHandle for OneShotStub<T> {
  fn name(&self) -> &str {
    &self.name
  }

  fn kill(&self, graceful: bool) {
    OneShotStub::kill(self, graceful)
  }

  fn exit_watch(&self) -> ActorFuture<()> {
    self.lifetime.watch()
  }
}
