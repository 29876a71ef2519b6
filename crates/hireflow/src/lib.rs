//! Candidate pipeline workflow engine for recruiting teams.
//!
//! The [`workflows::candidates`] module owns the status machine, the REST router and the
//! service that ties persistence and notification collaborators together.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
