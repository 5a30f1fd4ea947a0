use crate::actor::future::ActorFuture;
use crate::actor::stub::Stub;

/// Type-erased control over something that behaves like an actor.
///
/// Implemented by [`Stub`], [`OneShotStub`](crate::actor::OneShotStub) and
/// [`StubPool`](crate::actor::StubPool), so a supervisor can watch and kill
/// children without knowing their state types.
pub trait ActorHandle: Send + Sync {
  fn name(&self) -> &str;

  fn kill(&self, graceful: bool);

  /// A future that resolves the way the actor ended, minus its value.
  fn exit_watch(&self) -> ActorFuture<()>;
}

impl<A: 'static> ActorHandle for Stub<A> {
  fn name(&self) -> &str {
    Stub::name(self)
  }

  fn kill(&self, graceful: bool) {
    Stub::kill(self, graceful)
  }

  fn exit_watch(&self) -> ActorFuture<()> {
    self.lifetime()
  }
}
