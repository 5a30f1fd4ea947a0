use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;
use spindle_actor_utils_rs::collections::FifoQueue;

use crate::actor::actor_error::ActorError;
use crate::actor::config::Config;
use crate::actor::executor::Task;
use crate::actor::future::ActorFuture;
use crate::actor::message::Reply;
use crate::actor::name_generator::NameGenerator;
use crate::actor::props::Props;
use crate::actor::stub::Stub;

/// State of a generic worker actor.
///
/// Its only message drains a shared task queue until that queue is closed.
#[derive(Debug, Default)]
pub struct PoolWorker {
  tasks_run: usize,
}

impl PoolWorker {
  /// Total number of tasks this worker has run across all its assignments.
  pub fn tasks_run(&self) -> usize {
    self.tasks_run
  }

  fn run_tasks(&mut self, tasks: &FifoQueue<Task>) -> usize {
    let mut count = 0;
    while let Ok(task) = tasks.take() {
      task.run();
      count += 1;
    }
    self.tasks_run += count;
    count
  }
}

/// Assigns `tasks` to `worker`; the future yields how many tasks it ran.
pub(crate) fn assign(worker: &Stub<PoolWorker>, tasks: FifoQueue<Task>) -> Result<ActorFuture<usize>, ActorError> {
  worker.call(move |state: &mut PoolWorker| Ok(Reply::Continue(state.run_tasks(&tasks))))
}

/// A pool of idle generic workers shared by executors.
///
/// Clones share the same idle list.
#[derive(Clone)]
pub struct WorkerPool {
  inner: Arc<WorkerPoolInner>,
}

struct WorkerPoolInner {
  idle: Mutex<Vec<Stub<PoolWorker>>>,
  names: NameGenerator,
  config: Config,
}

impl Debug for WorkerPool {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WorkerPool")
      .field("idle", &self.len())
      .field("config", &self.inner.config)
      .finish()
  }
}

impl Default for WorkerPool {
  fn default() -> Self {
    Self::new(&Config::default())
  }
}

impl WorkerPool {
  pub fn new(config: &Config) -> Self {
    Self {
      inner: Arc::new(WorkerPoolInner {
        idle: Mutex::new(Vec::new()),
        names: NameGenerator::new(config.worker_name_prefix.clone()),
        config: config.clone(),
      }),
    }
  }

  pub fn config(&self) -> &Config {
    &self.inner.config
  }

  /// Takes an idle worker, or starts a new one when none is left.
  pub fn hire(&self) -> Result<Stub<PoolWorker>, ActorError> {
    {
      let mut idle = self.inner.idle.lock();
      while let Some(worker) = idle.pop() {
        if worker.accepts_messages() {
          return Ok(worker);
        }
        tracing::warn!("WorkerPool::hire: drop killed worker: {}", worker.name());
      }
    }
    let props = Props::from_options([Props::with_name(self.inner.names.next_name())]);
    Stub::spawn(props, || Ok(PoolWorker::default()))
  }

  /// Puts workers back into the idle list, dropping those that died.
  pub fn return_to_pool(&self, workers: impl IntoIterator<Item = Stub<PoolWorker>>) {
    let mut idle = self.inner.idle.lock();
    for worker in workers {
      if worker.accepts_messages() {
        idle.push(worker);
        continue;
      }
      if worker.is_alive() {
        tracing::warn!("WorkerPool::return_to_pool: worker is being killed: {}", worker.name());
        continue;
      }
      match worker.lifetime().exception(None) {
        Ok(Some(reason)) => tracing::error!("WorkerPool::return_to_pool: worker errs: {}: {}", worker.name(), reason),
        _ => tracing::error!("WorkerPool::return_to_pool: worker exits: {}", worker.name()),
      }
    }
  }

  /// Number of idle workers.
  pub fn len(&self) -> usize {
    self.inner.idle.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn for_each<F>(&self, mut f: F)
  where
    F: FnMut(&Stub<PoolWorker>), {
    for worker in self.inner.idle.lock().iter() {
      f(worker);
    }
  }
}
