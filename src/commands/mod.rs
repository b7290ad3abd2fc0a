//! Command handler layer.
//!
//! ## Files
//! - `runtime.rs` — `run` and `check`.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate run logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod runtime;

pub use runtime::handle_runtime_commands;
