use spindle_actor_utils_rs::collections::{QueueSize, WaitMode};

use crate::actor::NameGenerator;

/// Per-actor spawn settings.
#[derive(Debug, Clone)]
pub struct Props {
  pub(crate) name: Option<String>,
  pub(crate) name_generator: Option<NameGenerator>,
  pub(crate) mailbox_size: QueueSize,
  pub(crate) send_mode: WaitMode,
}

impl Default for Props {
  fn default() -> Self {
    Props {
      name: None,
      name_generator: None,
      mailbox_size: QueueSize::Limitless,
      send_mode: WaitMode::NoWait,
    }
  }
}

#[derive(Debug, Clone)]
pub enum PropsOption {
  SetName(String),
  SetNameGenerator(NameGenerator),
  SetMailboxCapacity(usize),
  SetSendMode(WaitMode),
}

impl PropsOption {
  pub fn apply(&self, props: &mut Props) {
    match self {
      PropsOption::SetName(name) => {
        props.name = Some(name.clone());
      }
      PropsOption::SetNameGenerator(generator) => {
        props.name_generator = Some(generator.clone());
      }
      PropsOption::SetMailboxCapacity(capacity) => {
        props.mailbox_size = QueueSize::from_capacity(*capacity);
      }
      PropsOption::SetSendMode(mode) => {
        props.send_mode = *mode;
      }
    }
  }
}

impl Props {
  pub fn from_options(options: impl IntoIterator<Item = PropsOption>) -> Props {
    let mut props = Props::default();
    for option in options {
      option.apply(&mut props);
    }
    props
  }

  pub fn with_name(name: impl Into<String>) -> PropsOption {
    PropsOption::SetName(name.into())
  }

  pub fn with_name_generator(generator: NameGenerator) -> PropsOption {
    PropsOption::SetNameGenerator(generator)
  }

  /// `0` means unbounded.
  pub fn with_mailbox_capacity(capacity: usize) -> PropsOption {
    PropsOption::SetMailboxCapacity(capacity)
  }

  /// How stub calls wait on a full mailbox; defaults to not waiting.
  pub fn with_send_mode(mode: WaitMode) -> PropsOption {
    PropsOption::SetSendMode(mode)
  }

  pub fn mailbox_size(&self) -> QueueSize {
    self.mailbox_size
  }

  pub fn send_mode(&self) -> WaitMode {
    self.send_mode
  }

  pub(crate) fn resolve_name(&self, fallback: &str) -> String {
    if let Some(name) = &self.name {
      name.clone()
    } else if let Some(generator) = &self.name_generator {
      generator.next_name()
    } else {
      fallback.to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use rstest::rstest;

  use super::*;

  #[rstest]
  #[case(vec![], "fallback")]
  #[case(vec![Props::with_name("explicit")], "explicit")]
  #[case(vec![Props::with_name_generator(NameGenerator::new("gen"))], "gen-01")]
  #[case(vec![Props::with_name_generator(NameGenerator::new("gen")), Props::with_name("explicit")], "explicit")]
  fn test_resolve_name(#[case] options: Vec<PropsOption>, #[case] expected: &str) {
    assert_eq!(Props::from_options(options).resolve_name("fallback"), expected);
  }

  #[rstest]
  #[case(0, QueueSize::Limitless)]
  #[case(8, QueueSize::Limited(8))]
  fn test_mailbox_capacity(#[case] capacity: usize, #[case] expected: QueueSize) {
    let props = Props::from_options([Props::with_mailbox_capacity(capacity)]);
    assert_eq!(props.mailbox_size(), expected);
  }

  #[test]
  fn test_send_mode_defaults_to_no_wait() {
    assert_eq!(Props::default().send_mode(), WaitMode::NoWait);
    let props = Props::from_options([Props::with_send_mode(WaitMode::Timeout(Duration::from_millis(5)))]);
    assert_eq!(props.send_mode(), WaitMode::Timeout(Duration::from_millis(5)));
  }
}
