//! Iterative refinement of activity/attenuation map pairs for simulated brain
//! PET acquisitions.
//!
//! The core is [`services::controller`]: after each simulation and
//! reconstruction round it accepts the result, rolls back to the previous
//! map, or asks the map updater for another iteration.

pub mod cli;
pub mod commands;
pub mod domain;
pub mod error;
pub mod services;
