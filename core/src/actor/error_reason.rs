use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

/// An application failure raised inside an actor.
///
/// Cheap to clone, so one failure can be delivered to the message's future,
/// the actor's lifetime future and any number of observers.
#[derive(Debug, Clone)]
pub struct ErrorReason {
  message: String,
  cause: Option<Arc<dyn Error + Send + Sync>>,
  backtrace: Arc<Backtrace>,
}

impl ErrorReason {
  pub fn new<E: Error + Send + Sync + 'static>(error: E) -> Self {
    Self {
      message: error.to_string(),
      cause: Some(Arc::new(error)),
      backtrace: Arc::new(Backtrace::capture()),
    }
  }

  pub fn from_message(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      cause: None,
      backtrace: Arc::new(Backtrace::capture()),
    }
  }

  pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
      (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
      s.clone()
    } else {
      "non-string panic payload".to_string()
    };
    Self::from_message(format!("panicked: {}", detail))
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn cause(&self) -> Option<&(dyn Error + Send + Sync)> {
    self.cause.as_deref()
  }

  /// Returns the cause as `E` when it is one.
  pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
    self.cause.as_deref().and_then(|cause| cause.downcast_ref::<E>())
  }

  pub fn backtrace(&self) -> &Backtrace {
    &self.backtrace
  }
}

impl Display for ErrorReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.message)
  }
}

impl Error for ErrorReason {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
  }
}

impl From<&str> for ErrorReason {
  fn from(message: &str) -> Self {
    Self::from_message(message)
  }
}

impl From<String> for ErrorReason {
  fn from(message: String) -> Self {
    Self::from_message(message)
  }
}

static_assertions::assert_impl_all!(ErrorReason: Send, Sync);
