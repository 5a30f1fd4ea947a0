use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::thread;

use spindle_actor_utils_rs::collections::{FifoQueue, QueueError, WaitMode};

use crate::actor::actor_error::ActorError;
use crate::actor::error_reason::ErrorReason;
use crate::actor::future::ActorFuture;
use crate::actor::message::{Envelope, HandlerResult, Letter, MethodCall};
use crate::actor::props::Props;

mod message_loop;
#[cfg(test)]
mod tests;

use message_loop::MessageLoop;

/// The caller-side handle of an actor.
///
/// An actor is a thread that owns a value of type `A` and applies the
/// messages of its mailbox to it one at a time. Clones of a stub address the
/// same actor. Once the last clone is dropped the mailbox is closed
/// gracefully, so the actor finishes its backlog and exits.
///
/// Typed interfaces are usually written as extension traits on `Stub<A>`:
///
/// ```
/// use spindle_actor_core_rs::{ActorError, ActorFuture, Props, Reply, Stub};
///
/// struct Counter(u64);
///
/// trait CounterStub {
///   fn increment(&self) -> Result<ActorFuture<u64>, ActorError>;
/// }
///
/// impl CounterStub for Stub<Counter> {
///   fn increment(&self) -> Result<ActorFuture<u64>, ActorError> {
///     self.call(|counter| {
///       counter.0 += 1;
///       Ok(Reply::Continue(counter.0))
///     })
///   }
/// }
///
/// let counter = Stub::spawn(Props::default(), || Ok(Counter(0))).unwrap();
/// counter.increment().unwrap();
/// assert_eq!(counter.increment().unwrap().result(None).unwrap(), 2);
/// ```
pub struct Stub<A> {
  inner: Arc<StubInner<A>>,
}

struct StubInner<A> {
  name: String,
  mailbox: FifoQueue<Letter<A>>,
  lifetime: ActorFuture<()>,
  send_mode: WaitMode,
}

impl<A> Drop for StubInner<A> {
  fn drop(&mut self) {
    self.mailbox.close(true);
  }
}

impl<A> Clone for Stub<A> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<A> Debug for Stub<A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Stub")
      .field("name", &self.inner.name)
      .field("lifetime", &self.inner.lifetime)
      .finish()
  }
}

impl<A: 'static> Stub<A> {
  /// Starts an actor whose state is built by `ctor` on the actor's thread.
  ///
  /// Blocks until `ctor` has returned, so a construction failure is reported
  /// here rather than through the lifetime future.
  pub fn spawn<F>(props: Props, ctor: F) -> Result<Self, ActorError>
  where
    F: FnOnce() -> Result<A, ErrorReason> + Send + 'static, {
    let name = props.resolve_name(short_type_name::<A>());
    let mailbox = FifoQueue::new(props.mailbox_size());
    let lifetime = ActorFuture::new();
    let built = ActorFuture::<()>::new();
    mailbox
      .offer(Letter::Build(Box::new(ctor), built.promise()))
      .map_err(|error| ActorError::Generic(error.to_string()))?;

    let stub = Stub {
      inner: Arc::new(StubInner {
        name: name.clone(),
        mailbox: mailbox.clone(),
        lifetime: lifetime.clone(),
        send_mode: props.send_mode(),
      }),
    };
    let message_loop = MessageLoop::new(name.clone(), mailbox, lifetime.promise());
    thread::Builder::new()
      .name(name)
      .spawn(move || message_loop.run())
      .map_err(|error| ActorError::Generic(error.to_string()))?;

    built.result(None)?;
    Ok(stub)
  }

  /// Sends `f` to the actor using the mailbox wait mode of its props.
  pub fn call<R, F>(&self, f: F) -> Result<ActorFuture<R>, ActorError>
  where
    R: Send + 'static,
    F: FnOnce(&mut A) -> HandlerResult<R, A> + Send + 'static, {
    self.send_message(f, self.inner.send_mode)
  }

  /// Sends `f` to the actor and returns the future of its reply.
  ///
  /// Fails with [`ActorError::Exited`] once the actor is dead or its mailbox
  /// is closed, and with [`ActorError::MailboxFull`] when `mode` gives up on
  /// a full mailbox.
  pub fn send_message<R, F>(&self, f: F, mode: WaitMode) -> Result<ActorFuture<R>, ActorError>
  where
    R: Send + 'static,
    F: FnOnce(&mut A) -> HandlerResult<R, A> + Send + 'static, {
    if self.inner.lifetime.done() {
      return Err(ActorError::Exited(self.inner.name.clone()));
    }
    let future = ActorFuture::new();
    let envelope: Envelope<A> = Box::new(MethodCall::new(future.promise(), f));
    match self.inner.mailbox.put_with(Letter::Call(envelope), mode) {
      Ok(()) => Ok(future),
      Err(QueueError::Full(_)) => Err(ActorError::MailboxFull(self.inner.name.clone())),
      Err(_) => Err(ActorError::Exited(self.inner.name.clone())),
    }
  }
}

impl<A> Stub<A> {
  /// Closes the mailbox without waiting for the actor.
  ///
  /// A graceful kill lets the actor work through what is already queued.
  /// Otherwise the queued messages are cancelled; the message being handled
  /// right now still runs to completion.
  pub fn kill(&self, graceful: bool) {
    close_mailbox(&self.inner.mailbox, graceful);
  }

  /// Resolves once the actor's thread has exited.
  pub fn lifetime(&self) -> ActorFuture<()> {
    self.inner.lifetime.clone()
  }

  pub fn name(&self) -> &str {
    &self.inner.name
  }

  pub fn is_alive(&self) -> bool {
    !self.inner.lifetime.done()
  }

  /// Whether new messages can still be queued; false once the actor is dead
  /// or has been killed, even while it drains its backlog.
  pub fn accepts_messages(&self) -> bool {
    self.is_alive() && !self.inner.mailbox.is_closed()
  }

  pub fn pending_messages(&self) -> usize {
    self.inner.mailbox.len()
  }
}

/// Closes `mailbox`; a hard close also cancels every letter left in it,
/// including those kept by an earlier graceful close.
pub(crate) fn close_mailbox<A>(mailbox: &FifoQueue<Letter<A>>, graceful: bool) {
  let mut drained = mailbox.close(graceful);
  if !graceful {
    while let Ok(letter) = mailbox.poll() {
      drained.push(letter);
    }
  }
  for letter in drained {
    letter.cancel();
  }
}

fn short_type_name<A>() -> &'static str {
  let full = std::any::type_name::<A>();
  let path = full.split('<').next().unwrap_or(full);
  path.rsplit("::").next().unwrap_or(path)
}
