//! Offline replay of load-more activations on an HTML page.
//!
//! # Responsibility
//! - Parse a page into a `MemoryDocument`, attach the appender, click the
//!   trigger a fixed number of times and serialize the result.
//!
//! # Invariants
//! - Activations are dispatched one at a time, each to completion.
//! - The input page is never mutated; a new serialization is returned.

use crate::dom::{MemoryDocument, Selector};
use crate::service::appender::{AppendError, AppenderConfig, ButtonClickAppender};
use log::debug;

/// Page produced by `render_with_activations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Serialized document after all activations.
    pub html: String,
    /// Activations delivered to the trigger.
    pub activations: u32,
    /// Fragment elements added by those activations.
    pub appended: usize,
}

/// Replays `activations` clicks on the page's trigger element.
///
/// # Errors
/// - `ElementNotFound` when the page has no trigger element.
/// - `Dom` when the fragment tag/class cannot form a selector or the
///   document rejects a mutation.
pub fn render_with_activations(
    html: &str,
    config: &AppenderConfig,
    activations: u32,
) -> Result<RenderedPage, AppendError> {
    let mut document = MemoryDocument::parse(html);
    let fragments = Selector::parse(&format!(
        "{}.{}",
        config.fragment.tag, config.fragment.class
    ))?;
    let before = document.query_selector_all(&fragments).len();

    let appender = ButtonClickAppender::attach(&mut document, config.clone())?;
    for _ in 0..activations {
        document.click(appender.trigger())?;
    }

    let appended = document
        .query_selector_all(&fragments)
        .len()
        .saturating_sub(before);
    debug!(
        "event=render module=render status=ok activations={} appended={}",
        activations, appended
    );

    Ok(RenderedPage {
        html: document.to_html(),
        activations,
        appended,
    })
}
