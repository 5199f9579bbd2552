pub mod bundle;
pub mod control;
pub mod handler;
pub mod metadata;
pub mod next;

pub use bundle::Bundle;
pub use control::ChainResult;
pub use handler::{handler_fn, noop_terminal, terminal_fn, Handler, HandlerFuture, Terminal};
pub use metadata::Metadata;
pub use next::Next;
