use crate::actor::Config;

#[derive(Debug, Clone)]
pub enum ConfigOption {
  SetWorkerNamePrefix(String),
  SetMaxWorkers(usize),
}

impl ConfigOption {
  pub fn apply(&self, config: &mut Config) {
    match self {
      ConfigOption::SetWorkerNamePrefix(prefix) => {
        config.worker_name_prefix = prefix.clone();
      }
      ConfigOption::SetMaxWorkers(max_workers) => {
        config.max_workers = (*max_workers).max(1);
      }
    }
  }

  pub fn with_worker_name_prefix(prefix: impl Into<String>) -> ConfigOption {
    ConfigOption::SetWorkerNamePrefix(prefix.into())
  }

  pub fn with_max_workers(max_workers: usize) -> ConfigOption {
    ConfigOption::SetMaxWorkers(max_workers)
  }
}
