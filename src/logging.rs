/*!

Global control over verbose messaging.

Messages are sent on a `Channel` at a verbosity level. A message is emitted only if the global verbosity is at least
the message's level. Level 0 is off--not recommended. Level 1 is "normal" enabled. Level 4 gives evaluation progress.
Level 5 gives matching progress. Level n includes all messages in levels m < n.

*/

use std::{
  fmt::{Display, Formatter},
  io::{stderr, Stderr, Write},
  sync::{
    atomic::{AtomicI32, Ordering},
    Mutex
  }
};

use lazy_static::lazy_static;
use yansi::Paint;

static VERBOSITY: AtomicI32 = AtomicI32::new(1);

lazy_static! {
  static ref VERBOSE_STREAM: Mutex<Stderr> = Mutex::new(stderr());
}


#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
  Error,
  Warning,
  Notice,
  Info,
  Debug,
}

impl Display for Channel {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Channel::Error   => write!(f, "{}", Paint::red("Error:").bold()),
      Channel::Warning => write!(f, "{}", Paint::yellow("Warning:")),
      Channel::Notice  => write!(f, "{}", Paint::cyan("Notice:")),
      Channel::Info    => write!(f, "{}", Paint::blue("Info:")),
      Channel::Debug   => write!(f, "{}", Paint::magenta("Debug:")),
    }
  }
}


pub fn get_verbosity() -> i32 {
  VERBOSITY.load(Ordering::Relaxed)
}

pub fn set_verbosity(new_value: i32) {
  VERBOSITY.store(new_value, Ordering::Relaxed);
}

/// Turns ANSI colors off, e.g. when the output is not a terminal.
pub fn disable_colors() {
  Paint::disable();
}

fn verbosity_is_at_least(level: i32) -> bool {
  get_verbosity() >= level
}

fn verbose_emit(channel: Channel, msg: &str) {
  let mut stream = match VERBOSE_STREAM.lock() {
    Ok(stream) => stream,
    Err(poisoned) => poisoned.into_inner()
  };
  let _ = writeln!(stream, "{} {}", channel, msg);
}

/// Only emits a message if the verbosity level is at least `level`.
pub fn log(channel: Channel, level: i32, msg: &str) {
  if verbosity_is_at_least(level) {
    verbose_emit(channel, msg);
  }
}

/// Like `log`, but only builds the message if it will be emitted.
pub fn log_with<F>(channel: Channel, level: i32, make_msg: F)
  where F: FnOnce() -> String
{
  if verbosity_is_at_least(level) {
    verbose_emit(channel, make_msg().as_str());
  }
}
