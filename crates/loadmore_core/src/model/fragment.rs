//! Article fragment value object.
//!
//! # Responsibility
//! - Describe the fixed `article.tease-card` unit appended on each activation.
//! - Render its inner markup for `DocumentHost::set_inner_html`.
//!
//! # Invariants
//! - A fragment carries no identity; two fragments with equal fields are
//!   indistinguishable once appended.
//! - Rendered markup escapes heading and paragraph text.

use serde::{Deserialize, Serialize};

/// Identifier of the load-more trigger element.
pub const TRIGGER_ID: &str = "loadMore";
/// Selector of the region that accumulates fragments.
pub const CONTAINER_SELECTOR: &str = ".news-container";
/// Tag of every appended fragment.
pub const FRAGMENT_TAG: &str = "article";
/// Class marker of every appended fragment.
pub const FRAGMENT_CLASS: &str = "tease-card";
/// Literal heading text of the appended fragment.
pub const FRAGMENT_HEADING: &str = "Headline 4: New Discoveries!";
/// Literal paragraph text of the appended fragment.
pub const FRAGMENT_PARAGRAPH: &str = "Scientists are making new discoveries every day.";

/// Fixed-content unit appended to the container on each activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFragment {
    pub tag: String,
    pub class: String,
    pub heading: String,
    pub paragraph: String,
}

impl Default for ArticleFragment {
    fn default() -> Self {
        Self::tease_card(FRAGMENT_HEADING, FRAGMENT_PARAGRAPH)
    }
}

impl ArticleFragment {
    /// Creates an `article.tease-card` fragment with custom text.
    pub fn tease_card(heading: impl Into<String>, paragraph: impl Into<String>) -> Self {
        Self {
            tag: FRAGMENT_TAG.to_string(),
            class: FRAGMENT_CLASS.to_string(),
            heading: heading.into(),
            paragraph: paragraph.into(),
        }
    }

    /// Inner markup: one `h2` heading followed by one `p` paragraph.
    pub fn inner_html(&self) -> String {
        format!(
            "<h2>{}</h2><p>{}</p>",
            escape(&self.heading),
            escape(&self.paragraph)
        )
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::{ArticleFragment, FRAGMENT_CLASS, FRAGMENT_HEADING, FRAGMENT_PARAGRAPH, FRAGMENT_TAG};

    #[test]
    fn default_fragment_uses_literal_content() {
        let fragment = ArticleFragment::default();
        assert_eq!(fragment.tag, FRAGMENT_TAG);
        assert_eq!(fragment.class, FRAGMENT_CLASS);
        assert_eq!(fragment.heading, FRAGMENT_HEADING);
        assert_eq!(fragment.paragraph, FRAGMENT_PARAGRAPH);
    }

    #[test]
    fn inner_html_renders_heading_then_paragraph() {
        assert_eq!(
            ArticleFragment::default().inner_html(),
            "<h2>Headline 4: New Discoveries!</h2>\
             <p>Scientists are making new discoveries every day.</p>"
        );
    }

    #[test]
    fn inner_html_escapes_markup_in_text() {
        let fragment = ArticleFragment::tease_card("<b>Rates</b> & more", "a < b");
        assert_eq!(
            fragment.inner_html(),
            "<h2>&lt;b&gt;Rates&lt;/b&gt; &amp; more</h2><p>a &lt; b</p>"
        );
    }

    #[test]
    fn serializes_with_plain_field_names() {
        let json = serde_json::to_value(ArticleFragment::default()).expect("serialize");
        assert_eq!(json["tag"], "article");
        assert_eq!(json["class"], "tease-card");
        assert_eq!(json["heading"], FRAGMENT_HEADING);
    }
}
