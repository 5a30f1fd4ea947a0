use std::thread;

use crate::actor::ConfigOption;

#[derive(Debug, Clone)]
pub struct Config {
  pub worker_name_prefix: String,
  pub max_workers: usize,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      worker_name_prefix: "pool-worker".to_string(),
      max_workers: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    }
  }
}

impl Config {
  pub fn from(options: impl IntoIterator<Item = ConfigOption>) -> Config {
    let mut config = Config::default();
    for option in options {
      option.apply(&mut config);
    }
    config
  }
}
