// baton/src/chain/execution.rs

//! Contains `Chain::run()` and friends: the recursive, continuation-based dispatcher.
//!
//! Every handler gets a `Next` bound to its own index. Advancing from index `i`
//! runs `i + 1` (or the terminal handler past the end) and returns that step's
//! completion, so handler futures nest: code after `bundle.advance().await`
//! runs once everything downstream has finished.

use crate::chain::definition::{Chain, Link};
use crate::core::bundle::Bundle;
use crate::core::control::ChainResult;
use crate::core::handler::{noop_terminal, HandlerFuture, Terminal};
use crate::core::metadata::Metadata;
use crate::core::next::{Advance, Next};
use crate::error::BatonError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level};

/// Advance bookkeeping for one execution. Created per run, never shared between runs.
#[derive(Debug, Default)]
struct ExecutionState {
  /// Highest index advanced to so far; `None` until the first handler is invoked.
  highest: Option<usize>,
  terminal_invoked: bool,
  /// First handler that completed successfully while still the highest index, i.e. without advancing.
  halted_at: Option<usize>,
  rejected_advances: usize,
}

/// A single run of a chain. `Next` values point back here.
struct Execution<A, M, C, L, E> {
  links: Vec<Link<A, M, C, L, E>>,
  args: Arc<A>,
  context: Metadata<M>,
  client: Arc<C>,
  logger: Arc<L>,
  terminal: Mutex<Option<Terminal<E>>>,
  state: Mutex<ExecutionState>,
}

impl<A, M, C, L, E> Execution<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  /// Runs the handler at `index`, or the terminal handler when `index` is past the end.
  ///
  /// The index check and the state update happen before anything else, so an
  /// advance attempted while the handler function is being called is already
  /// measured against the new state.
  fn invoke(self: &Arc<Self>, index: usize) -> HandlerFuture<E> {
    {
      let mut state = self.state.lock();
      if let Some(highest) = state.highest {
        if index <= highest {
          state.rejected_advances += 1;
          let advanced_from = index.saturating_sub(1);
          event!(
            Level::WARN,
            handler_index = advanced_from,
            highest,
            code = BatonError::DUPLICATE_ADVANCE,
            "Handler advanced more than once; rejecting."
          );
          return Box::pin(std::future::ready(Err(E::from(BatonError::DuplicateAdvance {
            index: advanced_from,
            highest,
          }))));
        }
      }
      state.highest = Some(index);
      if index >= self.links.len() {
        state.terminal_invoked = true;
      }
    }

    match self.links.get(index) {
      Some(link) => self.invoke_link(index, link),
      None => self.invoke_terminal(),
    }
  }

  fn invoke_link(self: &Arc<Self>, index: usize, link: &Link<A, M, C, L, E>) -> HandlerFuture<E> {
    let link_span = span!(
      Level::DEBUG,
      "chain_link",
      link_index = index,
      link_name = link.name.as_deref().unwrap_or("<unnamed>")
    );
    let execution: Arc<dyn Advance<E>> = Arc::clone(self) as Arc<dyn Advance<E>>;
    let bundle = Bundle {
      args: Arc::clone(&self.args),
      context: self.context.clone(),
      client: Arc::clone(&self.client),
      logger: Arc::clone(&self.logger),
      next: Next::new(index, execution),
    };
    let handler_fut = link_span.in_scope(|| (link.handler)(bundle));
    let execution = Arc::clone(self);
    Box::pin(
      async move {
        let result = handler_fut.await;
        if result.is_ok() {
          execution.record_finished(index);
        }
        result
      }
      .instrument(link_span),
    )
  }

  /// Marks `index` as the halting handler if nothing advanced past it.
  fn record_finished(&self, index: usize) {
    let mut state = self.state.lock();
    if state.highest == Some(index) && state.halted_at.is_none() {
      state.halted_at = Some(index);
      event!(Level::DEBUG, "Handler finished without advancing.");
    }
  }

  fn invoke_terminal(&self) -> HandlerFuture<E> {
    event!(Level::TRACE, "Chain exhausted; invoking terminal handler.");
    // The state update in `invoke` admits the terminal index only once.
    let terminal = self.terminal.lock().take();
    match terminal {
      Some(terminal) => terminal(),
      None => Box::pin(std::future::ready(Err(E::from(BatonError::Internal(
        "terminal handler already consumed".to_string(),
      ))))),
    }
  }
}

impl<A, M, C, L, E> Advance<E> for Execution<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  fn advance_from(self: Arc<Self>, from: usize) -> HandlerFuture<E> {
    event!(Level::TRACE, from, "Advance requested.");
    self.invoke(from + 1)
  }
}

impl<A, M, C, L, E> Chain<A, M, C, L, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  /// Runs the chain with a terminal handler that does nothing.
  ///
  /// See [`Chain::run_with_terminal`].
  pub async fn run(&self, args: A, context: Metadata<M>, client: Arc<C>, logger: Arc<L>) -> Result<ChainResult, E> {
    self.execute_inner(args, context, client, logger, None).await
  }

  /// Runs the chain, then `terminal` once the last handler advances.
  ///
  /// Returns the completion of the first handler, which (through nesting)
  /// only resolves after everything it advanced into has resolved:
  /// - `Ok(ChainResult::Completed)` if the terminal handler was invoked,
  /// - `Ok(ChainResult::Halted { at })` if handler `at` finished without advancing,
  /// - `Ok(ChainResult::Detached { reached })` if every finished handler advanced but
  ///   the terminal handler has not been reached yet (an advance was spawned),
  /// - `Err(e)` with the error of whichever step failed last, unchanged. A handler
  ///   that fails after its downstream chain succeeded still fails the run.
  ///
  /// An empty chain invokes `terminal` straight away.
  pub async fn run_with_terminal(
    &self,
    args: A,
    context: Metadata<M>,
    client: Arc<C>,
    logger: Arc<L>,
    terminal: Terminal<E>,
  ) -> Result<ChainResult, E> {
    self.execute_inner(args, context, client, logger, Some(terminal)).await
  }

  #[instrument(
        name = "Chain::run",
        skip_all,
        fields(
            args_type = %std::any::type_name::<A>(),
            chain_len = self.links.len(),
        ),
        err(Display)
    )]
  pub(crate) async fn execute_inner(
    &self,
    args: A,
    context: Metadata<M>,
    client: Arc<C>,
    logger: Arc<L>,
    terminal: Option<Terminal<E>>,
  ) -> Result<ChainResult, E> {
    let terminal = terminal.unwrap_or_else(noop_terminal);

    if self.links.is_empty() {
      event!(Level::DEBUG, "Empty chain; invoking terminal handler directly.");
      terminal().await?;
      return Ok(ChainResult::Completed);
    }

    event!(Level::DEBUG, "Chain execution starting.");
    // Snapshot the links: edits to `self` after this point never reach this run.
    let execution = Arc::new(Execution {
      links: self.links.clone(),
      args: Arc::new(args),
      context,
      client,
      logger,
      terminal: Mutex::new(Some(terminal)),
      state: Mutex::new(ExecutionState::default()),
    });

    let completion = execution.invoke(0).await;

    let (terminal_invoked, halted_at, highest, rejected_advances) = {
      let state = execution.state.lock();
      (state.terminal_invoked, state.halted_at, state.highest, state.rejected_advances)
    };
    if rejected_advances > 0 {
      event!(
        Level::WARN,
        rejected_advances,
        code = BatonError::DUPLICATE_ADVANCE,
        "Chain finished with rejected duplicate advances."
      );
    }

    match completion {
      Ok(()) if terminal_invoked => {
        event!(Level::DEBUG, "Chain execution completed.");
        Ok(ChainResult::Completed)
      }
      Ok(()) => match halted_at {
        Some(at) => {
          event!(Level::DEBUG, halted_at = at, "Chain halted before reaching the terminal handler.");
          Ok(ChainResult::Halted { at })
        }
        None => {
          let reached = highest.unwrap_or(0);
          event!(Level::DEBUG, reached, "Chain returned with an advance still running detached.");
          Ok(ChainResult::Detached { reached })
        }
      },
      Err(e) => {
        event!(Level::ERROR, error = %e, "Chain execution failed.");
        Err(e)
      }
    }
  }
}

/// Runs `chain` against one argument bundle; `terminal` defaults to a no-op success.
///
/// Same as [`Chain::run_with_terminal`], in free-function form.
pub async fn execute<A, M, C, L, E>(
  chain: &Chain<A, M, C, L, E>,
  args: A,
  context: Metadata<M>,
  client: Arc<C>,
  logger: Arc<L>,
  terminal: Option<Terminal<E>>,
) -> Result<ChainResult, E>
where
  A: Send + Sync + 'static,
  M: Send + Sync + 'static,
  C: Send + Sync + 'static,
  L: Send + Sync + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  chain.execute_inner(args, context, client, logger, terminal).await
}
