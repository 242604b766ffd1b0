//! Content model for load-more behaviors.
//!
//! # Responsibility
//! - Define the value objects appended to documents.
//! - Hold the literal identifiers the default behavior is wired to.
//!
//! # Invariants
//! - Value objects carry no identity and are freely cloned.

pub mod fragment;
