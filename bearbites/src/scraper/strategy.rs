//! Field extraction as an ordered cascade of named strategies.
//!
//! Vendor templates drift, so most fields have two or three known
//! spellings. Each spelling is one [`ExtractionStrategy`]; a
//! [`StrategyCascade`] tries them in order and reports which one hit.

use regex::Regex;

use crate::error::Result;

pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Capture groups of the first match, `None` when the field is absent.
    /// Index 0 is the first capture group, missing optional groups are `None`.
    fn extract(&self, haystack: &str) -> Option<Vec<Option<String>>>;
}

/// A strategy backed by a single regular expression.
pub struct RegexStrategy {
    name: &'static str,
    regex: Regex,
}

impl RegexStrategy {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self> {
        Ok(Self {
            name,
            regex: Regex::new(pattern)?,
        })
    }
}

impl ExtractionStrategy for RegexStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn extract(&self, haystack: &str) -> Option<Vec<Option<String>>> {
        let caps = self.regex.captures(haystack)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// The outcome of a cascade: which strategy matched and what it captured.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub strategy: String,
    pub groups: Vec<Option<String>>,
}

impl Extraction {
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }
}

pub struct StrategyCascade {
    field: &'static str,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl StrategyCascade {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    /// Compile `(name, pattern)` pairs into regex strategies, in order.
    pub fn from_patterns(field: &'static str, patterns: &[(&'static str, &str)]) -> Result<Self> {
        let mut cascade = Self::new(field);
        for (name, pattern) in patterns {
            cascade = cascade.with(RegexStrategy::new(name, pattern)?);
        }
        Ok(cascade)
    }

    pub fn with(mut self, strategy: impl ExtractionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn field(&self) -> &str {
        self.field
    }

    pub fn first_match(&self, haystack: &str) -> Option<Extraction> {
        for strategy in &self.strategies {
            if let Some(groups) = strategy.extract(haystack) {
                tracing::trace!(field = self.field, strategy = strategy.name(), "Field extracted");
                return Some(Extraction {
                    strategy: strategy.name().to_string(),
                    groups,
                });
            }
        }
        tracing::trace!(field = self.field, "No extraction strategy matched");
        None
    }

    /// First capture group of the first matching strategy, trimmed.
    pub fn first_text(&self, haystack: &str) -> Option<String> {
        self.first_match(haystack)
            .and_then(|m| m.group(0).map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_strategy_wins() {
        let cascade = StrategyCascade::from_patterns(
            "name",
            &[
                ("recipe_div", r#"(?i)<div class="labelrecipe">([^<]+)</div>"#),
                ("title", r"(?i)<title>([^<]+)</title>"),
            ],
        )
        .unwrap();

        let html = r#"<title>Page</title><div class="labelrecipe">Tacos</div>"#;
        let hit = cascade.first_match(html).unwrap();
        assert_eq!(hit.strategy, "recipe_div");
        assert_eq!(hit.group(0), Some("Tacos"));
    }

    #[test]
    fn test_falls_through_to_later_strategy() {
        let cascade = StrategyCascade::from_patterns(
            "name",
            &[
                ("recipe_div", r#"(?i)<div class="labelrecipe">([^<]+)</div>"#),
                ("title", r"(?i)<title>([^<]+)</title>"),
            ],
        )
        .unwrap();

        assert_eq!(cascade.first_text("<TITLE> Soup </TITLE>"), Some("Soup".to_string()));
        assert_eq!(cascade.first_text("<p>nothing</p>"), None);
    }

    #[test]
    fn test_optional_group_is_none() {
        let strategy = RegexStrategy::new("opt", r"(\d+)g(?: (\d+)%)?").unwrap();
        let groups = strategy.extract("12g").unwrap();
        assert_eq!(groups, vec![Some("12".to_string()), None]);
    }
}
