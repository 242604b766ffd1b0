//! Core logic for loadmore.
//! Document model, load-more appender, headline extraction and crawling.

pub mod crawl;
pub mod dom;
pub mod logging;
pub mod model;
pub mod scrape;
pub mod service;

pub use crawl::{
    crawl_and_save, CrawlError, CrawlReport, Crawler, CrawlerConfig, FetchMode,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_REPORT_FILE, DEFAULT_TIMEOUT,
};
pub use dom::{
    DocumentHost, DomError, DomResult, Event, EventKind, Listener, ListenerId, MemoryDocument,
    NodeId, Selector,
};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::fragment::{
    ArticleFragment, CONTAINER_SELECTOR, FRAGMENT_CLASS, FRAGMENT_HEADING, FRAGMENT_PARAGRAPH,
    FRAGMENT_TAG, TRIGGER_ID,
};
pub use scrape::headlines::extract_headlines;
pub use service::appender::{
    append_fragment, ActivationOutcome, AppendError, AppenderConfig, ButtonClickAppender,
};
pub use service::render::{render_with_activations, RenderedPage};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
