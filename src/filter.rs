use crate::config::FilterConfig;
use crate::feed::types::Item;

/// Why an item was kept or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Match,
    /// Text post on the monitored subreddit itself (no external link).
    SelfPost,
    NoAllowedTerm,
    Excluded(String),
    NoQualifyingTerm,
}

/// Title rules for one monitored subreddit. Terms are stored lowercased.
#[derive(Debug, Clone)]
pub struct RuleSet {
    self_post_domain: String,
    allow: Vec<String>,
    exclude: Vec<String>,
    qualify: Vec<String>,
}

impl RuleSet {
    pub fn new(subreddit: &str, config: &FilterConfig) -> Self {
        Self {
            self_post_domain: format!("self.{}", subreddit.to_lowercase()),
            allow: lowercase_all(&config.allow),
            exclude: lowercase_all(&config.exclude),
            qualify: lowercase_all(&config.qualify),
        }
    }

    /// Checks run in a fixed order and the first failure wins:
    /// self-post, allow-list, exclusion list, qualifying list.
    pub fn evaluate(&self, item: &Item) -> Verdict {
        if item.domain.to_lowercase() == self.self_post_domain {
            return Verdict::SelfPost;
        }

        let title = item.title.to_lowercase();

        if !self.allow.iter().any(|t| title.contains(t.as_str())) {
            return Verdict::NoAllowedTerm;
        }
        if let Some(term) = self.exclude.iter().find(|t| title.contains(t.as_str())) {
            return Verdict::Excluded(term.clone());
        }
        if !self.qualify.iter().any(|t| title.contains(t.as_str())) {
            return Verdict::NoQualifyingTerm;
        }
        Verdict::Match
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.evaluate(item) == Verdict::Match
    }
}

fn lowercase_all(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
