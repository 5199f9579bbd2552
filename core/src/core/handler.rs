// baton/src/core/handler.rs

//! Handler and terminal-handler types, plus helpers that box plain async closures into them.

use crate::core::bundle::Bundle;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Deferred completion signal of a handler, a terminal handler or an advance call.
pub type HandlerFuture<E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send>>;

/// Type alias for one link of a chain.
///
/// A handler receives an owned [`Bundle`] and returns a [`HandlerFuture`]. Inside the
/// future it may call `bundle.advance()` to run the rest of the chain; whatever it
/// does after awaiting that call runs once everything downstream (including the
/// terminal handler) has finished.
///
/// Handlers are `Arc`ed so the same handler can appear in a chain more than once.
pub type Handler<A, M, C, L, E> = Arc<dyn Fn(Bundle<A, M, C, L, E>) -> HandlerFuture<E> + Send + Sync>;

/// Final action of an execution. Runs at most once, hence `FnOnce`.
pub type Terminal<E> = Box<dyn FnOnce() -> HandlerFuture<E> + Send>;

/// Boxes an async closure into a [`Handler`].
///
/// The closure may fail with any error convertible into the chain's error type `E`.
pub fn handler_fn<A, M, C, L, E, F, Fut, UserErr>(f: F) -> Handler<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: Send + 'static,
  F: Fn(Bundle<A, M, C, L, E>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<(), UserErr>> + Send + 'static,
  UserErr: Into<E> + Send + 'static,
{
  Arc::new(move |bundle: Bundle<A, M, C, L, E>| -> HandlerFuture<E> {
    let user_fut = f(bundle);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}

/// Boxes a zero-argument async closure into a [`Terminal`].
pub fn terminal_fn<E, F, Fut, UserErr>(f: F) -> Terminal<E>
where
  E: Send + 'static,
  F: FnOnce() -> Fut + Send + 'static,
  Fut: Future<Output = Result<(), UserErr>> + Send + 'static,
  UserErr: Into<E> + Send + 'static,
{
  Box::new(move || -> HandlerFuture<E> {
    let user_fut = f();
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}

/// The terminal used when the caller supplies none: completes successfully, does nothing.
pub fn noop_terminal<E: Send + 'static>() -> Terminal<E> {
  Box::new(|| -> HandlerFuture<E> { Box::pin(std::future::ready(Ok(()))) })
}
