//! Core functionality for the actor runtime.
//!
//! An actor is a daemon thread that processes messages one at a time from a
//! closable queue, against a state object only that thread ever touches.
//! Callers talk to it through a [`Stub`](actor::Stub): every call enqueues a
//! message and hands back an [`ActorFuture`](actor::ActorFuture) for its
//! result, and the stub's lifetime future resolves once the actor is dead.

pub mod actor;

pub use actor::*;
