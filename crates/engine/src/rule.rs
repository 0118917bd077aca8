// ABOUTME: Declarative source rule definitions loaded from the rules file.
// ABOUTME: Defines SourceRule, the extraction type tag, ordered search areas and type-specific selectors.

//! Source rule data model.
//!
//! A `SourceRule` describes one page and what to pull out of it. Rules are
//! deserialized once at startup and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// The three supported extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionType {
    DateWindow,
    KeywordPresence,
    KeywordFrequency,
}

impl ExtractionType {
    pub const ALL: [ExtractionType; 3] = [
        ExtractionType::DateWindow,
        ExtractionType::KeywordPresence,
        ExtractionType::KeywordFrequency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionType::DateWindow => "date_window",
            ExtractionType::KeywordPresence => "keyword_presence",
            ExtractionType::KeywordFrequency => "keyword_frequency",
        }
    }

    /// Whether the strategy needs at least one keyword to run.
    pub fn requires_keywords(&self) -> bool {
        matches!(
            self,
            ExtractionType::KeywordPresence | ExtractionType::KeywordFrequency
        )
    }
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtractionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// The `type` field of a rule as written in configuration.
///
/// Unrecognized strings are kept so that the dispatcher can report them per
/// rule instead of failing the whole configuration load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Known(ExtractionType),
    Unrecognized(String),
}

impl Default for RuleKind {
    fn default() -> Self {
        RuleKind::Known(ExtractionType::KeywordFrequency)
    }
}

impl From<String> for RuleKind {
    fn from(s: String) -> Self {
        match s.parse::<ExtractionType>() {
            Ok(t) => RuleKind::Known(t),
            Err(raw) => RuleKind::Unrecognized(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RuleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(RuleKind::from)
    }
}

/// Named page regions, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchAreas(Vec<(String, String)>);

impl SearchAreas {
    pub fn new<I, L, S>(areas: I) -> Self
    where
        I: IntoIterator<Item = (L, S)>,
        L: Into<String>,
        S: Into<String>,
    {
        SearchAreas(
            areas
                .into_iter()
                .map(|(label, css)| (label.into(), css.into()))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, s)| (l.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SearchAreas {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AreasVisitor;

        impl<'de> Visitor<'de> for AreasVisitor {
            type Value = SearchAreas;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of area label to CSS selector")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut areas = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((label, css)) = map.next_entry::<String, String>()? {
                    areas.push((label, css));
                }
                Ok(SearchAreas(areas))
            }
        }

        deserializer.deserialize_map(AreasVisitor)
    }
}

/// Selectors consumed by the presence and window checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TypeSelectors {
    /// Container element for the presence check
    #[serde(default)]
    pub container: Option<String>,
    /// Repeating item (or item link) selector
    #[serde(default)]
    pub item: Option<String>,
    /// Label element inside a window-check item
    #[serde(default)]
    pub label: Option<String>,
    /// Literal text the label must contain, matched case-insensitively
    #[serde(default)]
    pub label_text: Option<String>,
}

/// What the window check does with an item whose date text cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedItemPolicy {
    /// The whole check reports ERROR.
    #[default]
    Abort,
    /// The item is ignored and scanning continues.
    Skip,
}

/// One configured extraction target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRule {
    pub name: String,
    pub url: String,
    pub kind: RuleKind,
    pub keywords: Vec<String>,
    pub search_areas: Option<SearchAreas>,
    pub selectors: TypeSelectors,
    pub on_malformed: MalformedItemPolicy,
}

#[derive(Deserialize)]
struct RawRule {
    #[serde(default)]
    name: Option<String>,
    url: String,
    #[serde(default, rename = "type")]
    kind: RuleKind,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    search_areas: Option<SearchAreas>,
    #[serde(default)]
    selectors: TypeSelectors,
    #[serde(default)]
    on_malformed: MalformedItemPolicy,
}

impl<'de> Deserialize<'de> for SourceRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawRule::deserialize(deserializer)?;
        Ok(SourceRule {
            name: raw.name.unwrap_or_else(|| raw.url.clone()),
            url: raw.url,
            kind: raw.kind,
            keywords: raw.keywords,
            search_areas: raw.search_areas,
            selectors: raw.selectors,
            on_malformed: raw.on_malformed,
        })
    }
}

impl SourceRule {
    /// Builds a keyword frequency rule over the whole page.
    pub fn frequency<K, S>(name: impl Into<String>, url: impl Into<String>, keywords: K) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceRule {
            name: name.into(),
            url: url.into(),
            kind: RuleKind::Known(ExtractionType::KeywordFrequency),
            keywords: keywords.into_iter().map(Into::into).collect(),
            search_areas: None,
            selectors: TypeSelectors::default(),
            on_malformed: MalformedItemPolicy::default(),
        }
    }

    pub fn with_kind(mut self, kind: RuleKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_search_areas(mut self, areas: SearchAreas) -> Self {
        self.search_areas = Some(areas);
        self
    }

    pub fn with_selectors(mut self, selectors: TypeSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedItemPolicy) -> Self {
        self.on_malformed = policy;
        self
    }
}
