use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Hands out `"{prefix}-{nn}"` names from a shared counter.
///
/// Clones share the counter. Pass one into [`Props`](crate::actor::Props)
/// or a [`WorkerPool`](crate::actor::WorkerPool) instead of relying on
/// process-wide state, so tests can predict the names they will see.
#[derive(Debug, Clone)]
pub struct NameGenerator {
  prefix: Arc<str>,
  counter: Arc<AtomicUsize>,
}

impl NameGenerator {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self::starting_at(prefix, 1)
  }

  pub fn starting_at(prefix: impl Into<String>, first: usize) -> Self {
    Self {
      prefix: Arc::from(prefix.into()),
      counter: Arc::new(AtomicUsize::new(first)),
    }
  }

  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  pub fn next_name(&self) -> String {
    let n = self.counter.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:02}", self.prefix, n)
  }
}
