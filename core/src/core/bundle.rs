// baton/src/core/bundle.rs

//! The argument bundle passed to every handler.

use crate::core::handler::HandlerFuture;
use crate::core::metadata::Metadata;
use crate::core::next::Next;
use std::fmt;
use std::sync::Arc;

/// Everything a handler receives.
///
/// `args`, `client` and `logger` are passed through untouched and shared by
/// every handler of an execution. `context` is the only mutable part. `next`
/// is fresh for each handler and bound to its position.
pub struct Bundle<A, M, C, L, E> {
  pub args: Arc<A>,
  pub context: Metadata<M>,
  pub client: Arc<C>,
  pub logger: Arc<L>,
  pub next: Next<E>,
}

impl<A, M, C, L, E> Bundle<A, M, C, L, E> {
  /// Shorthand for `self.next.advance()`.
  pub fn advance(&self) -> HandlerFuture<E> {
    self.next.advance()
  }

  /// Position of the handler receiving this bundle.
  pub fn index(&self) -> usize {
    self.next.index()
  }
}

impl<A, M, C, L, E> Clone for Bundle<A, M, C, L, E> {
  fn clone(&self) -> Self {
    Self {
      args: Arc::clone(&self.args),
      context: self.context.clone(),
      client: Arc::clone(&self.client),
      logger: Arc::clone(&self.logger),
      next: self.next.clone(),
    }
  }
}

impl<A, M, C, L, E> fmt::Debug for Bundle<A, M, C, L, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Bundle")
      .field("args_type", &std::any::type_name::<A>())
      .field("context_type", &std::any::type_name::<M>())
      .field("index", &self.next.index())
      .finish()
  }
}
