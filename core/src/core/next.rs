// baton/src/core/next.rs

//! The advance capability handed to each handler.

use crate::core::handler::HandlerFuture;
use std::fmt;
use std::sync::Arc;

/// Type-erased view of a running execution, so `Next` need not carry the
/// argument types of the chain.
pub(crate) trait Advance<E>: Send + Sync {
  /// Advances past the handler at `from`.
  fn advance_from(self: Arc<Self>, from: usize) -> HandlerFuture<E>;
}

/// Advance capability bound to one handler's position.
///
/// Calling [`Next::advance`] runs the next handler, or the terminal handler when
/// the bound handler is the last one. Each position may be advanced past once
/// per execution; a second call (through this value, a clone of it, or the
/// `Next` of any earlier handler) yields
/// [`BatonError::DuplicateAdvance`](crate::BatonError::DuplicateAdvance).
///
/// The check, and the call that creates the next handler's future, happen when
/// `advance` is called, not when the returned future is first polled. The
/// downstream handler's body only runs once the future is awaited (or spawned).
pub struct Next<E> {
  index: usize,
  execution: Arc<dyn Advance<E>>,
}

impl<E> Next<E> {
  pub(crate) fn new(index: usize, execution: Arc<dyn Advance<E>>) -> Self {
    Self { index, execution }
  }

  /// Position of the handler this capability belongs to.
  pub fn index(&self) -> usize {
    self.index
  }

  pub fn advance(&self) -> HandlerFuture<E> {
    Arc::clone(&self.execution).advance_from(self.index)
  }
}

impl<E> Clone for Next<E> {
  fn clone(&self) -> Self {
    Self {
      index: self.index,
      execution: Arc::clone(&self.execution),
    }
  }
}

impl<E> fmt::Debug for Next<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Next").field("index", &self.index).finish()
  }
}
