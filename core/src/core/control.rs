// baton/src/core/control.rs

//! Outcome of a successful chain execution.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainResult {
  /// The chain was advanced all the way and the terminal handler was invoked.
  Completed,
  /// The handler at index `at` finished without the terminal handler being reached.
  /// Later handlers and the terminal handler did not run.
  Halted { at: usize },
  /// Every handler that finished had advanced, but the terminal handler has not
  /// been invoked yet: some advance is still running detached (e.g. spawned).
  /// `reached` is the highest index advanced to when the run returned.
  Detached { reached: usize },
}

impl ChainResult {
  pub fn is_completed(&self) -> bool {
    matches!(self, ChainResult::Completed)
  }
}
