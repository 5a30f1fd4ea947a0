use std::time::Duration;

use thiserror::Error;

use crate::actor::error_reason::ErrorReason;

#[derive(Debug, Clone, Error)]
pub enum ActorError {
  #[error("actor has been killed: {0}")]
  Exited(String),
  #[error("actor mailbox is full: {0}")]
  MailboxFull(String),
  #[error("actor error: {0}")]
  Generic(String),
  #[error("future has been cancelled")]
  Cancelled,
  #[error("future did not complete within {0:?}")]
  Timeout(Duration),
  #[error("{0}")]
  Failed(ErrorReason),
  #[error("invalid future state: {0}")]
  InvalidState(&'static str),
  #[error("no stub available")]
  NoStubAvailable,
  #[error("executor has been shut down")]
  ExecutorShutdown,
}

impl ActorError {
  pub fn reason(&self) -> Option<&ErrorReason> {
    match self {
      ActorError::Failed(e) => Some(e),
      _ => None,
    }
  }

  pub fn is_exited(&self) -> bool {
    matches!(self, ActorError::Exited(_))
  }
}

static_assertions::assert_impl_all!(ActorError: Send, Sync);
