use std::fmt::{Debug, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::Mutex;
use spindle_actor_utils_rs::collections::FifoQueue;

use crate::actor::actor_error::ActorError;
use crate::actor::error_reason::ErrorReason;
use crate::actor::future::{ActorFuture, Promise};
use crate::actor::stub::Stub;
use crate::actor::worker_pool::{assign, PoolWorker, WorkerPool};


/// A unit of work queued on an executor.
pub(crate) struct Task(Box<dyn FnOnce() + Send>);

impl Task {
  fn new<T, F>(promise: Promise<T>, f: F) -> Self
  where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ErrorReason> + Send + 'static, {
    Task(Box::new(move || {
      if !promise.set_running_or_notify_cancel() {
        return;
      }
      let resolved = match catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(ErrorReason::from_panic(payload))) {
        Ok(value) => promise.set_result(value),
        Err(reason) => promise.set_exception(reason),
      };
      if let Err(error) = resolved {
        tracing::error!("Task::run: {}", error);
      }
    }))
  }

  pub(crate) fn run(self) {
    (self.0)()
  }
}

struct HiredWorker {
  stub: Stub<PoolWorker>,
  assignment: ActorFuture<usize>,
}

struct ExecutorState {
  hired: Vec<HiredWorker>,
  shutdown: bool,
}

/// Runs submitted functions on workers hired from a [`WorkerPool`].
///
/// Up to `max_workers` workers are hired, lazily, one per submission. They
/// all pull from one shared task queue. A failing task only fails its own
/// future.
pub struct Executor {
  pool: WorkerPool,
  max_workers: usize,
  tasks: FifoQueue<Task>,
  state: Mutex<ExecutorState>,
}

impl Debug for Executor {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = self.state.lock();
    f.debug_struct("Executor")
      .field("max_workers", &self.max_workers)
      .field("hired", &state.hired.len())
      .field("queued", &self.tasks.len())
      .field("shutdown", &state.shutdown)
      .finish()
  }
}

impl Executor {
  /// `max_workers == 0` falls back to the pool's configured maximum.
  pub fn new(pool: WorkerPool, max_workers: usize) -> Self {
    let max_workers = if max_workers == 0 {
      pool.config().max_workers
    } else {
      max_workers
    };
    Self {
      pool,
      max_workers,
      tasks: FifoQueue::unbounded(),
      state: Mutex::new(ExecutorState {
        hired: Vec::new(),
        shutdown: false,
      }),
    }
  }

  pub fn max_workers(&self) -> usize {
    self.max_workers
  }

  pub fn submit<T, F>(&self, f: F) -> Result<ActorFuture<T>, ActorError>
  where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ErrorReason> + Send + 'static, {
    let mut state = self.state.lock();
    if state.shutdown {
      return Err(ActorError::ExecutorShutdown);
    }
    if state.hired.len() < self.max_workers {
      state.hired.push(self.hire_worker()?);
    }
    let future = ActorFuture::new();
    self
      .tasks
      .offer(Task::new(future.promise(), f))
      .map_err(|_| ActorError::ExecutorShutdown)?;
    Ok(future)
  }

  /// Hires a worker and assigns it the task queue, retrying once when the
  /// hired worker is killed before the assignment lands.
  fn hire_worker(&self) -> Result<HiredWorker, ActorError> {
    let mut retried = false;
    loop {
      let stub = self.pool.hire()?;
      match assign(&stub, self.tasks.clone()) {
        Ok(assignment) => {
          tracing::debug!("Executor::submit: hired {}", stub.name());
          return Ok(HiredWorker { stub, assignment });
        }
        Err(ActorError::Exited(name)) if !retried => {
          tracing::warn!("Executor::submit: {} exited before assignment", name);
          retried = true;
        }
        Err(error) => return Err(error),
      }
    }
  }

  /// Stops accepting tasks; queued ones still run.
  ///
  /// With `wait`, blocks until the workers have drained the queue and hands
  /// them back to the pool. Otherwise the workers are killed, since one may
  /// still be in the middle of a task.
  pub fn shutdown(&self, wait: bool) {
    let hired = {
      let mut state = self.state.lock();
      if state.shutdown {
        return;
      }
      state.shutdown = true;
      std::mem::take(&mut state.hired)
    };
    self.tasks.close(true);

    if !wait {
      for worker in hired {
        worker.stub.kill(false);
      }
      return;
    }

    let mut workers = Vec::with_capacity(hired.len());
    for HiredWorker { stub, assignment } in hired {
      match assignment.result(None) {
        Ok(count) => tracing::debug!("Executor::shutdown: {} ran {} tasks", stub.name(), count),
        Err(error) => {
          tracing::warn!("Executor::shutdown: {}: {}", stub.name(), error);
          stub.lifetime().wait(None);
        }
      }
      workers.push(stub);
    }
    self.pool.return_to_pool(workers);
  }

  pub fn is_shutdown(&self) -> bool {
    self.state.lock().shutdown
  }
}

impl Drop for Executor {
  fn drop(&mut self) {
    self.shutdown(false);
  }
}
