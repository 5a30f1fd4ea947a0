use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use spindle_actor_core_rs::{
  spawn_one_shot, start_supervisor, ActorHandle, ErrorReason, Props, Stub, SupervisorError,
};

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .try_init();
}

/// A factory whose `n`-th child (from 1) crashes when `crashes(n)` holds.
fn children(
  crashes: impl Fn(usize) -> bool + Send + 'static,
  spawned: Arc<AtomicUsize>,
) -> impl FnMut() -> Result<Box<dyn ActorHandle>, ErrorReason> + Send + 'static {
  move || {
    let n = spawned.fetch_add(1, Ordering::SeqCst) + 1;
    let crash = crashes(n);
    let props = Props::from_options([Props::with_name(format!("child-{:02}", n))]);
    let child = spawn_one_shot(props, move || {
      if crash {
        Err(ErrorReason::from(format!("child {} crashed", n)))
      } else {
        Ok(n)
      }
    })
    .map_err(ErrorReason::new)?;
    Ok(Box::new(child) as Box<dyn ActorHandle>)
  }
}

#[test]
fn test_supervisor_fails_once_the_threshold_is_reached() {
  init_tracing();
  let spawned = Arc::new(AtomicUsize::new(0));
  let supervisor = start_supervisor(4, 2, children(|n| n <= 2, spawned.clone())).unwrap();

  let reason = supervisor.lifetime().exception(TIMEOUT).unwrap().unwrap();
  assert_eq!(
    reason.downcast_ref::<SupervisorError>(),
    Some(&SupervisorError::CrashThresholdReached {
      crashed: 2,
      threshold: 2
    })
  );
  assert!(spawned.load(Ordering::SeqCst) >= 4);
}

#[test]
fn test_supervisor_replaces_a_crashed_child() {
  init_tracing();
  let spawned = Arc::new(AtomicUsize::new(0));
  let supervisor = start_supervisor(4, 2, children(|n| n == 1, spawned.clone())).unwrap();

  assert!(supervisor.lifetime().exception(TIMEOUT).unwrap().is_none());
  assert_eq!(spawned.load(Ordering::SeqCst), 5);
}

#[test]
fn test_supervisor_accepts_no_messages() {
  init_tracing();
  let supervisor = start_supervisor(1, 1, children(|_| false, Arc::new(AtomicUsize::new(0)))).unwrap();
  assert!(supervisor.lifetime().wait(TIMEOUT));
  assert!(supervisor.call(|_| Ok(spindle_actor_core_rs::Reply::Continue(()))).is_err());
}

struct Idle;

#[test]
fn test_survivors_are_killed_on_failure() {
  init_tracing();
  let survivors = Arc::new(Mutex::new(Vec::<Stub<Idle>>::new()));
  let spawned = AtomicUsize::new(0);
  let kept = survivors.clone();
  let supervisor = start_supervisor(2, 1, move || {
    if spawned.fetch_add(1, Ordering::SeqCst) == 0 {
      let stub = Stub::spawn(Props::default(), || Ok(Idle)).map_err(ErrorReason::new)?;
      kept.lock().push(stub.clone());
      return Ok(Box::new(stub) as Box<dyn ActorHandle>);
    }
    let crashing = spawn_one_shot::<(), _>(Props::default(), || Err(ErrorReason::from("crash"))).map_err(ErrorReason::new)?;
    Ok(Box::new(crashing) as Box<dyn ActorHandle>)
  })
  .unwrap();

  assert!(supervisor.lifetime().exception(TIMEOUT).unwrap().is_some());
  let survivors = survivors.lock();
  assert_eq!(survivors.len(), 1);
  assert!(survivors[0].lifetime().wait(TIMEOUT));
}

#[test]
fn test_factory_error_fails_the_supervisor() {
  init_tracing();
  let started = Arc::new(Mutex::new(Vec::<Stub<Idle>>::new()));
  let spawned = AtomicUsize::new(0);
  let kept = started.clone();
  let supervisor = start_supervisor(2, 2, move || {
    if spawned.fetch_add(1, Ordering::SeqCst) > 0 {
      return Err(ErrorReason::from("cannot build"));
    }
    let stub = Stub::spawn(Props::default(), || Ok(Idle)).map_err(ErrorReason::new)?;
    kept.lock().push(stub.clone());
    Ok(Box::new(stub) as Box<dyn ActorHandle>)
  })
  .unwrap();

  let reason = supervisor.lifetime().exception(TIMEOUT).unwrap().unwrap();
  assert_eq!(reason.message(), "cannot build");
  let started = started.lock();
  assert_eq!(started.len(), 1);
  assert!(started[0].lifetime().wait(TIMEOUT));
}
