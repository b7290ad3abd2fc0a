//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — config file schema, resolved run config, map pair,
//!   iteration/termination records and report structs.
//! - `constants.rs` — convergence threshold and run layout names.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem or process side effects.
//!
//! ## Compatibility note
//! `TerminationRecord` and `RunReport` are the `--json` output of `run` and the
//! content of `run.json`. Keep them in sync with `docs/contracts/*`.

pub mod constants;
pub mod models;
