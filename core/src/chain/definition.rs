// baton/src/chain/definition.rs

//! Contains the `Chain` struct and the methods that build and reshape it.

use crate::core::bundle::Bundle;
use crate::core::handler::{handler_fn, Handler};
use crate::error::{BatonError, BatonResult};
use std::fmt;
use std::future::Future;

/// One position in a chain: a handler and an optional name used in tracing spans.
pub(crate) struct Link<A, M, C, L, E> {
  pub(crate) name: Option<String>,
  pub(crate) handler: Handler<A, M, C, L, E>,
}

impl<A, M, C, L, E> Clone for Link<A, M, C, L, E> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      handler: self.handler.clone(),
    }
  }
}

/// An ordered list of handlers, generic over
/// - `A`: the caller's initial arguments,
/// - `M`: the shared, mutable metadata,
/// - `C`: the client handle,
/// - `L`: the logger handle,
/// - `E`: the error type handlers fail with.
///
/// `E` must be `From<BatonError>` so contract violations (a handler advancing
/// twice) can be reported through the same error channel as handler failures.
///
/// A `Chain` can be run any number of times, also concurrently; each run gets
/// its own advance bookkeeping.
///
/// Depth: handler futures nest, so polling the run goes one level deeper per
/// link (a handful of stack frames each). A few hundred links are fine; chains
/// of several thousand can overflow a default 2 MiB thread stack, especially in
/// debug builds. Run very long chains on a thread with a larger stack.
pub struct Chain<A, M = (), C = (), L = (), E = BatonError>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  pub(crate) links: Vec<Link<A, M, C, L, E>>,
}

impl<A, M, C, L, E> Chain<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self { links: Vec::new() }
  }

  /// Appends an async closure as the last handler.
  pub fn push<F, Fut, UserErr>(&mut self, f: F) -> &mut Self
  where
    F: Fn(Bundle<A, M, C, L, E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    self.push_handler(handler_fn(f))
  }

  pub fn push_named<S, F, Fut, UserErr>(&mut self, name: S, f: F) -> &mut Self
  where
    S: Into<String>,
    F: Fn(Bundle<A, M, C, L, E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    self.push_named_handler(name, handler_fn(f))
  }

  /// Appends an already boxed handler. The same `Handler` may be pushed more than once.
  pub fn push_handler(&mut self, handler: Handler<A, M, C, L, E>) -> &mut Self {
    self.links.push(Link { name: None, handler });
    self
  }

  pub fn push_named_handler<S: Into<String>>(&mut self, name: S, handler: Handler<A, M, C, L, E>) -> &mut Self {
    self.links.push(Link {
      name: Some(name.into()),
      handler,
    });
    self
  }

  /// By-value form of [`Chain::push`], for building a chain in one expression.
  pub fn with<F, Fut, UserErr>(mut self, f: F) -> Self
  where
    F: Fn(Bundle<A, M, C, L, E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    self.push(f);
    self
  }

  fn position(&self, name: &str) -> BatonResult<usize> {
    self
      .links
      .iter()
      .position(|link| link.name.as_deref() == Some(name))
      .ok_or_else(|| BatonError::LinkNotFound { name: name.to_string() })
  }

  /// Inserts a named handler right before the first link called `existing`.
  pub fn insert_before<S, F, Fut, UserErr>(&mut self, existing: &str, name: S, f: F) -> BatonResult<()>
  where
    S: Into<String>,
    F: Fn(Bundle<A, M, C, L, E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    let idx = self.position(existing)?;
    self.links.insert(
      idx,
      Link {
        name: Some(name.into()),
        handler: handler_fn(f),
      },
    );
    Ok(())
  }

  /// Inserts a named handler right after the first link called `existing`.
  pub fn insert_after<S, F, Fut, UserErr>(&mut self, existing: &str, name: S, f: F) -> BatonResult<()>
  where
    S: Into<String>,
    F: Fn(Bundle<A, M, C, L, E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    let idx = self.position(existing)?;
    self.links.insert(
      idx + 1,
      Link {
        name: Some(name.into()),
        handler: handler_fn(f),
      },
    );
    Ok(())
  }

  /// Removes every link called `name` and returns how many were removed.
  pub fn remove(&mut self, name: &str) -> usize {
    let before = self.links.len();
    self.links.retain(|link| link.name.as_deref() != Some(name));
    before - self.links.len()
  }

  pub fn len(&self) -> usize {
    self.links.len()
  }

  pub fn is_empty(&self) -> bool {
    self.links.is_empty()
  }

  /// Link names in order; `None` for unnamed links.
  pub fn names(&self) -> Vec<Option<&str>> {
    self.links.iter().map(|link| link.name.as_deref()).collect()
  }
}

impl<A, M, C, L, E> Default for Chain<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<A, M, C, L, E> Clone for Chain<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  fn clone(&self) -> Self {
    Self {
      links: self.links.clone(),
    }
  }
}

impl<A, M, C, L, E> FromIterator<Handler<A, M, C, L, E>> for Chain<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  fn from_iter<I: IntoIterator<Item = Handler<A, M, C, L, E>>>(iter: I) -> Self {
    Self {
      links: iter.into_iter().map(|handler| Link { name: None, handler }).collect(),
    }
  }
}

impl<A, M, C, L, E> fmt::Debug for Chain<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Chain").field("links", &self.names()).finish()
  }
}
