use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use spindle_actor_utils_rs::collections::WaitMode;
use tracing_subscriber::EnvFilter;

use crate::actor::{ActorError, ActorFuture, ErrorReason, NameGenerator, Props, Reply, Stub};

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .try_init();
}

#[derive(Default)]
struct Recorder {
  seen: Vec<u32>,
}

fn record(stub: &Stub<Recorder>, n: u32) -> ActorFuture<usize> {
  stub
    .call(move |recorder: &mut Recorder| {
      recorder.seen.push(n);
      Ok(Reply::Continue(recorder.seen.len()))
    })
    .unwrap()
}

/// Occupies the actor until `release` is signalled.
fn block(stub: &Stub<Recorder>) -> (mpsc::Sender<()>, ActorFuture<()>) {
  let (started_tx, started_rx) = mpsc::channel();
  let (release_tx, release_rx) = mpsc::channel::<()>();
  let future = stub
    .call(move |_: &mut Recorder| {
      started_tx.send(()).unwrap();
      release_rx.recv().unwrap();
      Ok(Reply::Continue(()))
    })
    .unwrap();
  started_rx.recv().unwrap();
  (release_tx, future)
}

#[test]
fn test_messages_run_in_order() {
  init_tracing();
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let futures = (1..=10).map(|n| record(&stub, n)).collect::<Vec<_>>();
  for (i, future) in futures.iter().enumerate() {
    assert_eq!(future.result(TIMEOUT).unwrap(), i + 1);
  }
  let seen = stub
    .call(|recorder: &mut Recorder| Ok(Reply::Continue(recorder.seen.clone())))
    .unwrap()
    .result(TIMEOUT)
    .unwrap();
  assert_eq!(seen, (1..=10).collect::<Vec<_>>());
  assert!(stub.is_alive());
}

#[test]
fn test_construction_failure_is_reported_to_spawn() {
  init_tracing();
  let result = Stub::<Recorder>::spawn(Props::default(), || Err(ErrorReason::from("no config")));
  match result {
    Err(ActorError::Failed(reason)) => assert_eq!(reason.message(), "no config"),
    other => panic!("unexpected: {:?}", other),
  }

  let result = Stub::<Recorder>::spawn(Props::default(), || panic!("exploded"));
  match result {
    Err(ActorError::Failed(reason)) => assert!(reason.message().contains("exploded")),
    other => panic!("unexpected: {:?}", other),
  }
}

#[test]
fn test_handler_error_kills_only_this_actor() {
  init_tracing();
  let broken = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let healthy = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();

  let (release, _) = block(&broken);
  let failing = broken
    .call(|_: &mut Recorder| -> crate::actor::HandlerResult<(), Recorder> { Err(ErrorReason::from("bad input")) })
    .unwrap();
  let queued = record(&broken, 1);
  release.send(()).unwrap();

  assert_eq!(failing.exception(TIMEOUT).unwrap().unwrap().message(), "bad input");
  assert_eq!(broken.lifetime().exception(TIMEOUT).unwrap().unwrap().message(), "bad input");
  assert!(matches!(queued.result(TIMEOUT), Err(ActorError::Cancelled)));
  assert!(matches!(
    broken.call(|_: &mut Recorder| Ok(Reply::Continue(()))),
    Err(ActorError::Exited(_))
  ));

  assert_eq!(record(&healthy, 1).result(TIMEOUT).unwrap(), 1);
}

#[test]
fn test_handler_panic_is_an_error() {
  init_tracing();
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let future = stub
    .call(|_: &mut Recorder| -> crate::actor::HandlerResult<(), Recorder> { panic!("handler panicked") })
    .unwrap();
  assert!(future.exception(TIMEOUT).unwrap().unwrap().message().contains("handler panicked"));
  assert!(stub.lifetime().exception(TIMEOUT).unwrap().is_some());
}

#[test]
fn test_stop_is_a_normal_exit() {
  init_tracing();
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let (release, _) = block(&stub);
  let stop = stub.call(|_: &mut Recorder| Ok(Reply::Stop("bye"))).unwrap();
  let queued = record(&stub, 1);
  release.send(()).unwrap();

  assert_eq!(stop.result(TIMEOUT).unwrap(), "bye");
  assert!(stub.lifetime().exception(TIMEOUT).unwrap().is_none());
  assert!(matches!(queued.result(TIMEOUT), Err(ActorError::Cancelled)));
  assert!(!stub.is_alive());
}

#[test]
fn test_requeue_runs_the_continuation_after_replying() {
  init_tracing();
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let first = stub
    .call(|recorder: &mut Recorder| {
      recorder.seen.push(1);
      Ok(Reply::requeue("queued", |recorder: &mut Recorder| {
        recorder.seen.push(2);
        Ok(Reply::Continue(()))
      }))
    })
    .unwrap();
  assert_eq!(first.result(TIMEOUT).unwrap(), "queued");

  let seen = stub
    .call(|recorder: &mut Recorder| Ok(Reply::Continue(recorder.seen.clone())))
    .unwrap()
    .result(TIMEOUT)
    .unwrap();
  assert_eq!(seen, vec![1, 2]);
}

#[test]
fn test_graceful_kill_drains_the_backlog() {
  init_tracing();
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let (release, running) = block(&stub);
  let queued = (1..=3).map(|n| record(&stub, n)).collect::<Vec<_>>();

  stub.kill(true);
  assert!(matches!(
    stub.call(|_: &mut Recorder| Ok(Reply::Continue(()))),
    Err(ActorError::Exited(_))
  ));
  release.send(()).unwrap();

  running.result(TIMEOUT).unwrap();
  for (i, future) in queued.iter().enumerate() {
    assert_eq!(future.result(TIMEOUT).unwrap(), i + 1);
  }
  assert!(stub.lifetime().exception(TIMEOUT).unwrap().is_none());
}

#[test]
fn test_hard_kill_cancels_the_backlog() {
  init_tracing();
  let executed = Arc::new(Mutex::new(0));
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let (release, running) = block(&stub);
  let queued = (0..3)
    .map(|_| {
      let executed = executed.clone();
      stub
        .call(move |_: &mut Recorder| {
          *executed.lock() += 1;
          Ok(Reply::Continue(()))
        })
        .unwrap()
    })
    .collect::<Vec<_>>();

  stub.kill(false);
  assert!(queued.iter().all(|future| future.cancelled()));
  assert_eq!(stub.pending_messages(), 0);
  release.send(()).unwrap();

  running.result(TIMEOUT).unwrap();
  assert!(stub.lifetime().exception(TIMEOUT).unwrap().is_none());
  assert_eq!(*executed.lock(), 0);
}

#[test]
fn test_cancelled_message_is_skipped() {
  init_tracing();
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let (release, _) = block(&stub);
  let skipped = record(&stub, 1);
  assert!(skipped.cancel());
  let counted = record(&stub, 2);
  release.send(()).unwrap();

  assert_eq!(counted.result(TIMEOUT).unwrap(), 1);
}

#[test]
fn test_full_mailbox_rejects_without_blocking() {
  init_tracing();
  let props = Props::from_options([Props::with_mailbox_capacity(1)]);
  let stub = Stub::spawn(props, || Ok(Recorder::default())).unwrap();
  let (release, _) = block(&stub);
  let queued = record(&stub, 1);

  assert!(matches!(
    stub.call(|_: &mut Recorder| Ok(Reply::Continue(()))),
    Err(ActorError::MailboxFull(_))
  ));
  assert!(matches!(
    stub.send_message(
      |_: &mut Recorder| Ok(Reply::Continue(())),
      WaitMode::Timeout(Duration::from_millis(20))
    ),
    Err(ActorError::MailboxFull(_))
  ));
  release.send(()).unwrap();
  assert_eq!(queued.result(TIMEOUT).unwrap(), 1);
}

#[test]
fn test_dropping_the_last_stub_lets_the_actor_exit() {
  init_tracing();
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let lifetime = stub.lifetime();
  let pending = record(&stub, 1);
  let clone = stub.clone();
  drop(stub);
  drop(clone);

  assert_eq!(pending.result(TIMEOUT).unwrap(), 1);
  assert!(lifetime.wait(TIMEOUT));
  assert!(lifetime.exception(None).unwrap().is_none());
}

#[test]
fn test_actor_names() {
  init_tracing();
  let named = Stub::spawn(Props::from_options([Props::with_name("recorder")]), || {
    Ok(Recorder::default())
  })
  .unwrap();
  assert_eq!(named.name(), "recorder");

  let names = NameGenerator::new("rec");
  let props = Props::from_options([Props::with_name_generator(names.clone())]);
  let first = Stub::spawn(props.clone(), || Ok(Recorder::default())).unwrap();
  let second = Stub::spawn(props, || Ok(Recorder::default())).unwrap();
  assert_eq!(first.name(), "rec-01");
  assert_eq!(second.name(), "rec-02");

  let anonymous = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  assert_eq!(anonymous.name(), "Recorder");
  let thread_name = anonymous
    .call(|_: &mut Recorder| Ok(Reply::Continue(std::thread::current().name().map(str::to_string))))
    .unwrap()
    .result(TIMEOUT)
    .unwrap();
  assert_eq!(thread_name.as_deref(), Some("Recorder"));
}

#[test]
fn test_stop_after_graceful_kill_cancels_the_rest() {
  init_tracing();
  let stub = Stub::spawn(Props::default(), || Ok(Recorder::default())).unwrap();
  let (release, _) = block(&stub);
  let stop = stub.call(|_: &mut Recorder| Ok(Reply::Stop(()))).unwrap();
  let queued = record(&stub, 1);
  stub.kill(true);
  release.send(()).unwrap();

  stop.result(TIMEOUT).unwrap();
  assert!(matches!(queued.result(TIMEOUT), Err(ActorError::Cancelled)));
  assert!(stub.lifetime().exception(TIMEOUT).unwrap().is_none());
}
