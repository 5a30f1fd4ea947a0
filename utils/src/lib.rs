//! Utility library for Spindle Actor.
//!
//! The only public surface is [`collections`]: the closable, blocking queue
//! every actor mailbox and executor backlog is built on.

pub mod collections;
