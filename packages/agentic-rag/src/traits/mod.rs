//! Collaborator abstractions.
//!
//! The pipeline talks to the outside world only through these traits:
//! a generation backend and a search backend. Applications pick the
//! implementations; the pipeline owns the policy.

pub mod generator;
pub mod search;
