use std::fmt::Debug;

use crate::actor::future::ActorFuture;

type CompletionFunc<T> = Box<dyn FnOnce(&ActorFuture<T>) + Send + 'static>;

pub(crate) struct Completion<T>(CompletionFunc<T>);

impl<T> Completion<T> {
  pub(crate) fn new<F>(f: F) -> Self
  where
    F: FnOnce(&ActorFuture<T>) + Send + 'static, {
    Self(Box::new(f))
  }

  pub(crate) fn run(self, future: &ActorFuture<T>) {
    (self.0)(future)
  }
}

impl<T> Debug for Completion<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Completion")
  }
}
