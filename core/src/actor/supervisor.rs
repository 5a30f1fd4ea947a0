use std::fmt::{Debug, Formatter};

use spindle_actor_utils_rs::collections::WaitMode;
use thiserror::Error;

use crate::actor::actor_error::ActorError;
use crate::actor::actor_handle::ActorHandle;
use crate::actor::error_reason::ErrorReason;
use crate::actor::future::{ActorFuture, CompletionQueue};
use crate::actor::message::Reply;
use crate::actor::props::Props;
use crate::actor::stub::Stub;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupervisorError {
  #[error("{crashed} actors crashed, reaching the threshold of {threshold}")]
  CrashThresholdReached { crashed: usize, threshold: usize },
}

/// Builds one child actor each time it is called.
pub type ActorFactory = Box<dyn FnMut() -> Result<Box<dyn ActorHandle>, ErrorReason> + Send>;

/// State of a supervisor actor.
///
/// Keeps `target_count` children alive until that many have exited
/// normally, replacing every child that crashes. Once `crash_threshold`
/// children have crashed, the survivors are killed and the supervisor fails
/// with [`SupervisorError::CrashThresholdReached`].
pub struct Supervisor {
  target_count: usize,
  crash_threshold: usize,
  crashed: usize,
  live: Vec<(ActorFuture<()>, Box<dyn ActorHandle>)>,
  factory: ActorFactory,
}

impl Debug for Supervisor {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Supervisor")
      .field("target_count", &self.target_count)
      .field("crash_threshold", &self.crash_threshold)
      .field("crashed", &self.crashed)
      .field("live", &self.live.len())
      .finish()
  }
}

impl Supervisor {
  fn new(target_count: usize, crash_threshold: usize, factory: ActorFactory) -> Self {
    Self {
      target_count,
      crash_threshold,
      crashed: 0,
      live: Vec::new(),
      factory,
    }
  }

  /// Runs the supervision loop; on any failure the live children are
  /// hard-killed so none of them outlives the supervisor.
  fn supervise(&mut self) -> Result<(), ErrorReason> {
    let result = self.run_children();
    if result.is_err() {
      self.kill_live_children();
    }
    result
  }

  fn kill_live_children(&mut self) {
    for (_, child) in self.live.drain(..) {
      tracing::debug!("Supervisor::supervise: kill {}", child.name());
      child.kill(false);
    }
  }

  fn run_children(&mut self) -> Result<(), ErrorReason> {
    let finished = CompletionQueue::<()>::new();
    let mut remaining = self.target_count;
    while self.crashed < self.crash_threshold && remaining > 0 {
      while self.live.len() < remaining {
        let child = (self.factory)()?;
        tracing::debug!("Supervisor::supervise: start {}", child.name());
        let watch = child.exit_watch();
        finished
          .put(watch.clone())
          .map_err(|error| ErrorReason::from_message(error.to_string()))?;
        self.live.push((watch, child));
      }

      let done = finished
        .get(WaitMode::Forever)
        .map_err(|error| ErrorReason::from_message(error.to_string()))?;
      let Some(index) = self.live.iter().position(|(watch, _)| *watch == done) else {
        continue;
      };
      let (_, child) = self.live.swap_remove(index);
      match done.exception(None) {
        Ok(None) => {
          tracing::debug!("Supervisor::supervise: {} exits", child.name());
          remaining -= 1;
        }
        Ok(Some(reason)) => {
          tracing::error!("Supervisor::supervise: {} crashed: {}", child.name(), reason);
          self.crashed += 1;
        }
        Err(error) => {
          tracing::error!("Supervisor::supervise: {} crashed: {}", child.name(), error);
          self.crashed += 1;
        }
      }
    }

    if self.crashed >= self.crash_threshold {
      return Err(ErrorReason::new(SupervisorError::CrashThresholdReached {
        crashed: self.crashed,
        threshold: self.crash_threshold,
      }));
    }
    Ok(())
  }
}

/// Starts a supervisor actor; see [`Supervisor`].
///
/// The returned stub accepts no messages. Its lifetime future reports how
/// the supervision ended.
pub fn start_supervisor<F>(target_count: usize, crash_threshold: usize, factory: F) -> Result<Stub<Supervisor>, ActorError>
where
  F: FnMut() -> Result<Box<dyn ActorHandle>, ErrorReason> + Send + 'static, {
  start_supervisor_with_props(Props::default(), target_count, crash_threshold, factory)
}

pub fn start_supervisor_with_props<F>(
  props: Props,
  target_count: usize,
  crash_threshold: usize,
  factory: F,
) -> Result<Stub<Supervisor>, ActorError>
where
  F: FnMut() -> Result<Box<dyn ActorHandle>, ErrorReason> + Send + 'static, {
  let stub = Stub::spawn(props, move || {
    Ok(Supervisor::new(target_count, crash_threshold, Box::new(factory)))
  })?;
  stub.call(|supervisor: &mut Supervisor| supervisor.supervise().map(Reply::Continue))?;
  stub.kill(true);
  Ok(stub)
}
