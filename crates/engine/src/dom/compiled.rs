// ABOUTME: Pre-compiled CSS selector cache shared by every strategy.
// ABOUTME: Rules reuse the same selectors on every run, so each string is parsed once.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::Selector;

/// Compiled selectors keyed by their source text. Invalid selectors are cached as `None`.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` if the selector does not parse.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    cache
        .entry(css.to_string())
        .or_insert(compiled)
        .clone()
}

/// Warms the cache with every selector a rule set uses.
pub fn precompile_selectors<I, S>(selectors: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    for css in selectors {
        let css = css.as_ref();
        if !cache.contains_key(css) {
            cache.insert(css.to_string(), Selector::parse(css).ok());
        }
    }
}
