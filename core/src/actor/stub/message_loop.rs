use std::panic::{catch_unwind, AssertUnwindSafe};

use spindle_actor_utils_rs::collections::FifoQueue;

use crate::actor::error_reason::ErrorReason;
use crate::actor::future::Promise;
use crate::actor::message::{Letter, Step};
use crate::actor::stub::close_mailbox;

pub(crate) struct MessageLoop<A> {
  name: String,
  mailbox: FifoQueue<Letter<A>>,
  lifetime: Promise<()>,
}

impl<A> MessageLoop<A> {
  pub(crate) fn new(name: String, mailbox: FifoQueue<Letter<A>>, lifetime: Promise<()>) -> Self {
    Self {
      name,
      mailbox,
      lifetime,
    }
  }

  pub(crate) fn run(self) {
    let span = tracing::debug_span!("actor", name = %self.name);
    let _enter = span.enter();
    tracing::debug!("start");

    if !self.lifetime.set_running_or_notify_cancel() {
      tracing::debug!("lifetime was cancelled before start");
      self.abort();
      return;
    }

    let outcome = self.build().and_then(|mut actor| {
      tracing::debug!("start message loop");
      self.serve(&mut actor)
    });
    let resolved = match outcome {
      Ok(()) => self.lifetime.set_result(()),
      Err(reason) => {
        tracing::debug!("actor failed: {}", reason);
        self.lifetime.set_exception(reason)
      }
    };
    if let Err(error) = resolved {
      tracing::error!("failed to resolve the lifetime: {}", error);
    }
    tracing::debug!("exit");
  }

  fn build(&self) -> Result<A, ErrorReason> {
    let (ctor, promise) = match self.mailbox.take() {
      Ok(Letter::Build(ctor, promise)) => (ctor, promise),
      Ok(letter) => {
        letter.cancel();
        self.abort();
        return Err(ErrorReason::from_message("actor received a message before it was built"));
      }
      Err(_) => return Err(ErrorReason::from_message("mailbox was closed before the actor was built")),
    };
    if !promise.set_running_or_notify_cancel() {
      self.abort();
      return Err(ErrorReason::from_message("actor construction was cancelled"));
    }
    match catch_unwind(AssertUnwindSafe(ctor)).unwrap_or_else(|payload| Err(ErrorReason::from_panic(payload))) {
      Ok(actor) => {
        if let Err(error) = promise.set_result(()) {
          tracing::error!("failed to report construction: {}", error);
        }
        Ok(actor)
      }
      Err(reason) => {
        if let Err(error) = promise.set_exception(reason.clone()) {
          tracing::error!("failed to report construction: {}", error);
        }
        self.abort();
        Err(reason)
      }
    }
  }

  fn serve(&self, actor: &mut A) -> Result<(), ErrorReason> {
    loop {
      let envelope = match self.mailbox.take() {
        Ok(Letter::Call(envelope)) => envelope,
        Ok(letter @ Letter::Build(..)) => {
          tracing::warn!("ignore a second construction request");
          letter.cancel();
          continue;
        }
        Err(_) => return Ok(()),
      };
      if !envelope.set_running_or_notify_cancel() {
        continue;
      }
      match envelope.invoke(actor) {
        Step::Continue => {}
        Step::Stop => {
          tracing::debug!("actor stopped itself");
          self.abort();
          return Ok(());
        }
        Step::Requeue(next) => {
          if let Err(error) = self.mailbox.offer(Letter::Call(next)) {
            tracing::error!("failed to requeue a continuation: {}", error);
            if let Some(letter) = error.into_element() {
              letter.cancel();
            }
          }
        }
        Step::Failed(reason) => {
          self.abort();
          return Err(reason);
        }
      }
    }
  }

  /// Hard-closes the mailbox and cancels everything still in it.
  fn abort(&self) {
    close_mailbox(&self.mailbox, false);
  }
}
