mod actor_error;
mod actor_handle;
mod config;
mod config_option;
mod error_reason;
mod executor;
mod future;
mod message;
mod name_generator;
mod one_shot;
mod props;
mod stub;
mod stub_pool;
mod supervisor;
mod worker_pool;

pub use {
  self::actor_error::*, self::actor_handle::*, self::config::*, self::config_option::*, self::error_reason::*,
  self::executor::*, self::future::*, self::message::*, self::name_generator::*, self::one_shot::*, self::props::*,
  self::stub::*, self::stub_pool::*, self::supervisor::*, self::worker_pool::*,
};

pub use spindle_actor_utils_rs::collections::{QueueError, QueueSize, WaitMode};
