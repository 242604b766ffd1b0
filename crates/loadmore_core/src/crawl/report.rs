//! Crawl report: URL → headlines, in crawl order.

use crate::crawl::CrawlError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::path::Path;

const REPORT_INDENT: &[u8] = b"    ";

/// Ordered headline map keyed by crawled URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlReport {
    entries: IndexMap<String, Vec<String>>,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records headlines for `url`. A repeated URL keeps its first position
    /// and takes the latest headlines.
    pub fn insert(&mut self, url: impl Into<String>, headlines: Vec<String>) {
        self.entries.insert(url.into(), headlines);
    }

    pub fn get(&self, url: &str) -> Option<&[String]> {
        self.entries.get(url).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of headlines across all URLs.
    pub fn headline_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(url, headlines)| (url.as_str(), headlines.as_slice()))
    }

    /// JSON object with 4-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, CrawlError> {
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut buffer,
            PrettyFormatter::with_indent(REPORT_INDENT),
        );
        self.serialize(&mut serializer)?;
        String::from_utf8(buffer)
            .map_err(|err| CrawlError::Report(serde::ser::Error::custom(err)))
    }

    /// Writes the report to `path`, replacing any existing file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), CrawlError> {
        let json = self.to_json_pretty()?;
        tokio::fs::write(path.as_ref(), json).await?;
        Ok(())
    }

    /// Reads a report previously written by `save`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
