//! Content extraction from fetched pages.
//!
//! # Responsibility
//! - Turn raw HTML into the headline list crawl reports are made of.

pub mod headlines;
