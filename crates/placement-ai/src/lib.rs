//! Matching and admission workflow engine for course and job placements.
//!
//! The crate is split into a pure scoring core (`workflows::matching`) and the
//! stateful application lifecycle built on top of it (`workflows::admission`).
//! Storage, notification, and e-mail collaborators are traits injected by the
//! hosting service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
