// ABOUTME: Loads the ordered list of source rules from the JSON rules file.
// ABOUTME: A missing or malformed file is a ConfigError and aborts the run before any fetch.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::dom::compiled::precompile_selectors;
use crate::error::ConfigError;
use crate::rule::SourceRule;

/// Default location of the rules file, relative to the working directory.
pub const DEFAULT_RULES_PATH: &str = "data/urls_config.json";

/// Parses rules from a JSON array.
pub fn parse_rules(json: &str) -> Result<Vec<SourceRule>, ConfigError> {
    let rules: Vec<SourceRule> = serde_json::from_str(json)?;
    precompile_selectors(rule_selectors(&rules));
    Ok(rules)
}

/// Reads and parses the rules file at `path`.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<SourceRule>, ConfigError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_rules(&json)?;
    info!(path = %path.display(), rules = rules.len(), "loaded rules");
    Ok(rules)
}

fn rule_selectors(rules: &[SourceRule]) -> Vec<&str> {
    let mut selectors = Vec::new();
    for rule in rules {
        if let Some(areas) = &rule.search_areas {
            selectors.extend(areas.iter().map(|(_, css)| css));
        }
        let s = &rule.selectors;
        selectors.extend(
            [&s.container, &s.item, &s.label]
                .into_iter()
                .filter_map(|css| css.as_deref()),
        );
    }
    selectors
}
