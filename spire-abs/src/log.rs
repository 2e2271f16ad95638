/*!

Logging facade. The backing implementation is the `tracing` ecosystem, but the
(crate) public interface consists only of `set_global_logging_threshold()` /
`get_global_logging_threshold()` and the macros `critical!`, `error!`, `warning!`,
`info!`, `debug!`, and `trace!`. Callers never name `tracing` directly, so the
backend can be swapped without touching call sites.

*/

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;

/// Severity threshold, ordered from most to least severe.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default)]
#[repr(u8)]
pub enum LogLevel {
  Critical = 0,
  Error,
  #[default]
  Warning,
  Info,
  Debug,
  Trace,
}

impl LogLevel {
  fn as_filter(self) -> LevelFilter {
    match self {
      LogLevel::Critical | LogLevel::Error => LevelFilter::ERROR,
      LogLevel::Warning => LevelFilter::WARN,
      LogLevel::Info    => LevelFilter::INFO,
      LogLevel::Debug   => LevelFilter::DEBUG,
      LogLevel::Trace   => LevelFilter::TRACE,
    }
  }
}

static GLOBAL_THRESHOLD: AtomicU8 = AtomicU8::new(LogLevel::Warning as u8);

/// Installs the global subscriber with the given threshold. Subsequent calls adjust the
/// recorded threshold but the subscriber installed first wins; this only matters in
/// tests, which share one process.
pub fn set_global_logging_threshold(level: LogLevel) {
  GLOBAL_THRESHOLD.store(level as u8, Ordering::Relaxed);
  let _ = fmt()
      .with_max_level(level.as_filter())
      .with_target(false)
      .without_time()
      .try_init();
}

pub fn get_global_logging_threshold() -> LogLevel {
  match GLOBAL_THRESHOLD.load(Ordering::Relaxed) {
    0 => LogLevel::Critical,
    1 => LogLevel::Error,
    2 => LogLevel::Warning,
    3 => LogLevel::Info,
    4 => LogLevel::Debug,
    _ => LogLevel::Trace,
  }
}

#[macro_export]
macro_rules! critical {
  ($($arg:tt)*) => { $crate::tracing::error!($($arg)*) };
}

#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => { $crate::tracing::error!($($arg)*) };
}

#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => { $crate::tracing::warn!($($arg)*) };
}

#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => { $crate::tracing::info!($($arg)*) };
}

#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => { $crate::tracing::debug!($($arg)*) };
}

#[macro_export]
macro_rules! trace {
  ($($arg:tt)*) => { $crate::tracing::trace!($($arg)*) };
}

// `#[macro_export]` places the macros at the crate root; make them reachable through
// `log::` as well, which is how call sites usually import them.
pub use crate::{critical, debug, error, info, trace, warning};
