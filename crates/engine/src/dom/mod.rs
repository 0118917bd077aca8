// ABOUTME: DOM access layer over the scraper HTML tree.
// ABOUTME: Exposes ParsedDocument and the shared compiled-selector cache.

pub mod compiled;
pub mod document;

pub use document::ParsedDocument;
