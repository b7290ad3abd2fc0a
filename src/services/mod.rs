//! Service layer containing the run logic and its side-effect helpers.
//!
//! ## Service map
//! - `controller.rs` — convergence state machine and the collaborator traits it drives.
//! - `pipeline.rs` — one full run: workspace, initial maps, controller, report.
//! - `tools.rs` — external-command implementations of the collaborators.
//! - `workspace.rs` — run directory reset and overwrite confirmation.
//! - `layout.rs` — path builder for the run tree.
//! - `runlog.rs` — append-only run/iteration logs and `history.jsonl`.
//! - `config.rs` — TOML config loading and resolution.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod config;
pub mod controller;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod runlog;
pub mod tools;
pub mod workspace;
