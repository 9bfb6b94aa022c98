//! CareMatch: coordination core for the guardian/provider/staff matching and
//! approval platform.
//!
//! The library owns the decision logic (who may do what, when a request moves
//! state, what gets emitted afterwards); storage, localization backends, and
//! notification transports are ports implemented by the surrounding binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
