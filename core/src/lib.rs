// src/lib.rs

//! Baton: a sequential, continuation-based middleware chain executor.
//!
//! A chain is an ordered list of async handlers. Each handler receives a
//! [`Bundle`] (caller arguments, shared metadata, a client handle, a logger
//! handle and a [`Next`] bound to its position) and decides whether to pass the
//! baton on by calling `bundle.advance()`:
//!  - handler `i + 1` only starts once handler `i` advances;
//!  - a handler that never advances ends the chain there (short-circuit);
//!  - code after `bundle.advance().await` runs after the rest of the chain,
//!    terminal handler included, so "after" sections unwind in reverse order;
//!  - advancing twice is a contract violation reported as
//!    [`BatonError::DuplicateAdvance`] (code [`BatonError::DUPLICATE_ADVANCE`]);
//!  - a terminal handler runs exactly once after the last handler advances,
//!    or immediately when the chain is empty.
//!
//! Deciding which chain applies to which event, retries and timeouts are left
//! to the surrounding application.

pub mod chain;
pub mod core;
pub mod error;

// --- Re-exports for the Public API ---

pub use crate::core::bundle::Bundle;
pub use crate::core::control::ChainResult;
pub use crate::core::handler::{handler_fn, noop_terminal, terminal_fn, Handler, HandlerFuture, Terminal};
pub use crate::core::metadata::Metadata;
pub use crate::core::next::Next;

pub use crate::chain::definition::Chain;
pub use crate::chain::execution::execute;

pub use crate::error::{BatonError, BatonResult};

/*
    Typical use:
    1. Pick the types flowing through the chain: initial arguments `A`, shared
       metadata `M`, client `C`, logger `L`, and an error `E: From<BatonError>`.
    2. Build a `Chain<A, M, C, L, E>` with `.push(...)` / `.push_named(...)`.
       Each handler awaits `bundle.advance()` to continue, or returns without it to stop.
    3. Wrap the metadata in `Metadata::new(...)` and keep a clone to inspect afterwards.
    4. `chain.run(args, metadata, client, logger).await`, or `run_with_terminal`
       with `terminal_fn(|| async { ... })`.
*/
