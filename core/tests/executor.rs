use std::time::Duration;

use spindle_actor_core_rs::{Config, ConfigOption, Executor, WorkerPool};

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

#[test]
fn test_sum_jobs_and_reuse_the_worker() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .try_init();
  let pool = WorkerPool::new(&Config::from([ConfigOption::with_worker_name_prefix("sum-worker")]));

  let executor = Executor::new(pool.clone(), 1);
  let first = executor.submit(|| Ok([1, 2, 3].iter().sum::<i32>())).unwrap();
  let second = executor.submit(|| Ok([4, 5, 6].iter().sum::<i32>())).unwrap();
  assert_eq!(first.result(TIMEOUT).unwrap(), 6);
  assert_eq!(second.result(TIMEOUT).unwrap(), 15);

  executor.shutdown(true);
  assert_eq!(pool.len(), 1);
  let mut names = Vec::new();
  pool.for_each(|worker| names.push(worker.name().to_string()));
  assert_eq!(names, vec!["sum-worker-01"]);

  let executor = Executor::new(pool.clone(), 1);
  let third = executor.submit(|| Ok([7, 8, 9].iter().sum::<i32>())).unwrap();
  assert!(pool.is_empty());
  assert_eq!(third.result(TIMEOUT).unwrap(), 24);
  executor.shutdown(true);

  let mut names = Vec::new();
  pool.for_each(|worker| names.push(worker.name().to_string()));
  assert_eq!(names, vec!["sum-worker-01"]);
}
