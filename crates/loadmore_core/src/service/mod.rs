//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate document operations into load-more behaviors.
//! - Keep hosts (CLI, crawler, tests) decoupled from document internals.

pub mod appender;
pub mod render;
