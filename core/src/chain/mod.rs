// baton/src/chain/mod.rs

//! Defines the `Chain` struct, its construction, and its execution logic.

pub mod definition;
pub mod execution;

pub use definition::Chain;
pub use execution::execute;
