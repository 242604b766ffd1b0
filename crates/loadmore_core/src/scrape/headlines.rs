//! Tease-card headline extraction.
//!
//! # Invariants
//! - Headlines are returned in document order.
//! - Cards without an `h2` contribute nothing.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TEASE_CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.tease-card").expect("valid tease card selector"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").expect("valid heading selector"));

/// Extracts the first `h2` text of every `article.tease-card`.
///
/// Each text run is trimmed and runs are concatenated, so markup inside the
/// heading does not leak layout whitespace into the result.
pub fn extract_headlines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&TEASE_CARD)
        .filter_map(|card| card.select(&HEADING).next())
        .map(|heading| {
            heading
                .text()
                .map(str::trim)
                .collect::<Vec<_>>()
                .concat()
        })
        .collect()
}
