//! Core type definitions for botgate
//!
//! Rules, clean-param rules and groups are produced once by the compiler and
//! are only read afterwards. Rules are reference-counted so that every agent
//! named in a block can point at the same allocation.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

/// Agent token of the catch-all group.
pub const WILDCARD_AGENT: &str = "*";

// =============================================================================
// Rule Actions
// =============================================================================

/// Action carried by an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAction {
    /// `Allow:` line
    Allow,
    /// `Disallow:` line
    Disallow,
}

impl RuleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Disallow => "disallow",
        }
    }
}

// =============================================================================
// Path Matchers
// =============================================================================

/// How a rule path is compared against a request path.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    /// Plain prefix comparison, no wildcards in the source path.
    Literal(String),
    /// Wildcard path compiled into a start-anchored regex.
    Pattern(Regex),
}

impl PathMatcher {
    /// Check whether `path` is covered by this matcher.
    #[inline]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Literal(prefix) => path.starts_with(prefix.as_str()),
            Self::Pattern(re) => re.is_match(path),
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern(_))
    }
}

// =============================================================================
// Rules
// =============================================================================

/// A single allow/disallow rule.
#[derive(Debug, Clone)]
pub struct Rule {
    action: RuleAction,
    /// Normalized path text before wildcard compilation.
    path: String,
    matcher: PathMatcher,
}

impl Rule {
    pub fn new(action: RuleAction, path: String, matcher: PathMatcher) -> Self {
        Self {
            action,
            path,
            matcher,
        }
    }

    pub fn action(&self) -> RuleAction {
        self.action
    }

    pub fn is_allow(&self) -> bool {
        self.action == RuleAction::Allow
    }

    /// The path as written in the document (after normalization).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    /// Tie-break weight: length of the pre-compilation path text.
    #[inline]
    pub fn specificity(&self) -> usize {
        self.path.len()
    }

    #[inline]
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

/// A `Clean-param` declaration: query parameters that do not change page
/// content, optionally limited to a path scope.
#[derive(Debug, Clone)]
pub struct CleanParamRule {
    params: Vec<String>,
    scope: Option<(String, PathMatcher)>,
}

impl CleanParamRule {
    /// `raw_params` is the `&`-joined list from the document; empty names are
    /// skipped.
    pub fn new(raw_params: &str, scope: Option<(String, PathMatcher)>) -> Self {
        let params = raw_params
            .split('&')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Self { params, scope }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Scope path text, empty when the rule applies document-wide.
    pub fn scope_path(&self) -> &str {
        self.scope.as_ref().map_or("", |(path, _)| path.as_str())
    }

    pub fn applies_to(&self, path: &str) -> bool {
        match &self.scope {
            Some((_, matcher)) => matcher.matches(path),
            None => true,
        }
    }
}

// =============================================================================
// Groups
// =============================================================================

/// Rules declared for one agent token.
///
/// Groups are filled in by the compiler while a document is assembled and are
/// read-only once handed out through a `Directory`.
#[derive(Debug, Clone, Default)]
pub struct Group {
    agent: String,
    rules: Vec<Arc<Rule>>,
    crawl_delay: Option<Duration>,
    clean_params: Vec<Arc<CleanParamRule>>,
}

impl Group {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            ..Self::default()
        }
    }

    /// Group with a single `Disallow: /` rule.
    pub fn deny_all() -> Self {
        let mut group = Self::new(WILDCARD_AGENT);
        group.push_rule(Arc::new(Rule::new(
            RuleAction::Disallow,
            "/".to_string(),
            PathMatcher::Literal("/".to_string()),
        )));
        group
    }

    /// Lower-cased agent token this group was declared for.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    /// Declared crawl delay, if any.
    pub fn declared_crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }

    /// Crawl delay, zero when none was declared.
    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay.unwrap_or(Duration::ZERO)
    }

    pub fn clean_params(&self) -> &[Arc<CleanParamRule>] {
        &self.clean_params
    }

    pub fn push_rule(&mut self, rule: Arc<Rule>) {
        self.rules.push(rule);
    }

    pub fn set_crawl_delay(&mut self, delay: Duration) {
        self.crawl_delay = Some(delay);
    }

    pub fn push_clean_param(&mut self, rule: Arc<CleanParamRule>) {
        self.clean_params.push(rule);
    }
}
