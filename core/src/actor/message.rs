use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::actor::error_reason::ErrorReason;
use crate::actor::future::Promise;

/// What a message handler hands back to the message loop.
///
/// The value always resolves the caller's future. The variant tells the
/// loop what to do next.
pub enum Reply<T, A> {
  /// Keep serving messages.
  Continue(T),
  /// Terminate the actor normally once the value is delivered.
  ///
  /// Every message still queued is cancelled and the actor's lifetime
  /// future resolves without an error.
  Stop(T),
  /// Deliver the value, then run `Continuation` as the actor's next message.
  ///
  /// The continuation goes to the back of the actor's own mailbox, so the
  /// actor can carry on in a new state without blocking the caller or
  /// growing the stack.
  Requeue(T, Continuation<A>),
}

impl<T, A: 'static> Reply<T, A> {
  pub fn requeue<R, F>(value: T, f: F) -> Self
  where
    R: Send + 'static,
    F: FnOnce(&mut A) -> HandlerResult<R, A> + Send + 'static, {
    Reply::Requeue(value, Continuation::new(f))
  }
}

impl<T: Debug, A> Debug for Reply<T, A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Reply::Continue(value) => f.debug_tuple("Continue").field(value).finish(),
      Reply::Stop(value) => f.debug_tuple("Stop").field(value).finish(),
      Reply::Requeue(value, _) => f.debug_tuple("Requeue").field(value).finish(),
    }
  }
}

pub type HandlerResult<T, A> = Result<Reply<T, A>, ErrorReason>;

/// A follow-up message an actor sends to itself.
///
/// Nobody observes its result, so it is written to a detached promise.
pub struct Continuation<A>(pub(crate) Envelope<A>);

impl<A: 'static> Continuation<A> {
  pub fn new<R, F>(f: F) -> Self
  where
    R: Send + 'static,
    F: FnOnce(&mut A) -> HandlerResult<R, A> + Send + 'static, {
    Continuation(Box::new(MethodCall::new(Promise::detached(), f)))
  }
}

pub(crate) type Envelope<A> = Box<dyn Invocation<A>>;

/// How the message loop proceeds after running one message.
pub(crate) enum Step<A> {
  Continue,
  Stop,
  Requeue(Envelope<A>),
  Failed(ErrorReason),
}

pub(crate) trait Invocation<A>: Send {
  fn set_running_or_notify_cancel(&self) -> bool;

  fn cancel(&self);

  fn invoke(self: Box<Self>, actor: &mut A) -> Step<A>;
}

pub(crate) struct MethodCall<A, R, F> {
  promise: Promise<R>,
  func: F,
  phantom_data: PhantomData<fn(&mut A)>,
}

impl<A, R, F> MethodCall<A, R, F> {
  pub(crate) fn new(promise: Promise<R>, func: F) -> Self {
    Self {
      promise,
      func,
      phantom_data: PhantomData,
    }
  }
}

impl<A, R, F> Invocation<A> for MethodCall<A, R, F>
where
  R: Send + 'static,
  F: FnOnce(&mut A) -> HandlerResult<R, A> + Send + 'static,
{
  fn set_running_or_notify_cancel(&self) -> bool {
    self.promise.set_running_or_notify_cancel()
  }

  fn cancel(&self) {
    self.promise.cancel();
  }

  fn invoke(self: Box<Self>, actor: &mut A) -> Step<A> {
    let MethodCall { promise, func, .. } = *self;
    let outcome = catch_unwind(AssertUnwindSafe(|| func(actor))).unwrap_or_else(|payload| Err(ErrorReason::from_panic(payload)));
    let (resolved, step) = match outcome {
      Ok(Reply::Continue(value)) => (promise.set_result(value), Step::Continue),
      Ok(Reply::Stop(value)) => (promise.set_result(value), Step::Stop),
      Ok(Reply::Requeue(value, next)) => (promise.set_result(value), Step::Requeue(next.0)),
      Err(reason) => (promise.set_exception(reason.clone()), Step::Failed(reason)),
    };
    if let Err(error) = resolved {
      tracing::error!("failed to deliver the reply: {}", error);
    }
    step
  }
}

/// An entry in an actor's mailbox.
pub(crate) enum Letter<A> {
  /// Constructs the actor state; always the first letter.
  Build(Constructor<A>, Promise<()>),
  Call(Envelope<A>),
}

pub(crate) type Constructor<A> = Box<dyn FnOnce() -> Result<A, ErrorReason> + Send>;

impl<A> Letter<A> {
  pub(crate) fn cancel(self) {
    match self {
      Letter::Build(_, promise) => {
        promise.cancel();
      }
      Letter::Call(envelope) => envelope.cancel(),
    }
  }
}
