//! Core Matching Engine
//!
//! Picks the group that applies to a crawler and resolves overlapping
//! allow/disallow rules by specificity.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::{Group, Rule, WILDCARD_AGENT};

// =============================================================================
// Match Result
// =============================================================================

/// Final decision for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDecision {
    /// No rule matched, or the winning rule is an allow rule
    Allow,
    /// The winning rule is a disallow rule
    Disallow,
}

/// Result of checking a path against a group.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub decision: MatchDecision,
    /// Rule that determined the decision, `None` for the default allow.
    pub rule: Option<&'a Rule>,
}

impl MatchResult<'_> {
    pub fn is_allowed(&self) -> bool {
        self.decision == MatchDecision::Allow
    }
}

// =============================================================================
// Rule resolution
// =============================================================================

impl Group {
    /// Resolve the winning rule for `path`.
    ///
    /// The longest matching rule wins; an allow rule beats a disallow rule of
    /// the same length. Unmatched paths are allowed.
    pub fn check(&self, path: &str) -> MatchResult<'_> {
        let mut best: Option<&Rule> = None;

        for rule in self.rules() {
            let rule: &Rule = rule;
            if !rule.matches(path) {
                continue;
            }
            if best.map_or(true, |current| outranks(rule, current)) {
                best = Some(rule);
            }
        }

        match best {
            Some(rule) if !rule.is_allow() => MatchResult {
                decision: MatchDecision::Disallow,
                rule: Some(rule),
            },
            rule => MatchResult {
                decision: MatchDecision::Allow,
                rule,
            },
        }
    }

    /// Is `path` allowed for this group?
    pub fn test(&self, path: &str) -> bool {
        self.check(path).is_allowed()
    }

    /// Names of the query parameters declared irrelevant for `path`.
    pub fn clean_params_for(&self, path: &str) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for rule in self.clean_params() {
            if !rule.applies_to(path) {
                continue;
            }
            for name in rule.params() {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }
}

fn outranks(candidate: &Rule, current: &Rule) -> bool {
    match candidate.specificity().cmp(&current.specificity()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.is_allow() && !current.is_allow(),
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Group selection over a set of declared groups.
pub struct Matcher<'a> {
    groups: &'a BTreeMap<String, Group>,
    fallback: &'a Group,
}

impl<'a> Matcher<'a> {
    /// `fallback` answers for agents that match no declared token when no `*`
    /// group was declared either.
    pub fn new(groups: &'a BTreeMap<String, Group>, fallback: &'a Group) -> Self {
        Self { groups, fallback }
    }

    /// Select the group that applies to `agent`.
    ///
    /// A declared token applies when the lower-cased agent contains it; the
    /// longest such token wins. Otherwise the `*` group, otherwise the
    /// fallback.
    pub fn match_group(&self, agent: &str) -> &'a Group {
        let agent = agent.to_lowercase();
        let mut best: Option<&'a Group> = None;

        for (token, group) in self.groups {
            if token == WILDCARD_AGENT || !agent.contains(token.as_str()) {
                continue;
            }
            // BTreeMap order keeps equal-length ties deterministic.
            if best.map_or(true, |b| token.len() > b.agent().len()) {
                best = Some(group);
            }
        }

        if let Some(group) = best {
            log::trace!("agent {:?} matched group {:?}", agent, group.agent());
            return group;
        }

        self.groups.get(WILDCARD_AGENT).unwrap_or(self.fallback)
    }

    /// Is `path` allowed for `agent`?
    pub fn test(&self, path: &str, agent: &str) -> bool {
        self.match_group(agent).test(path)
    }

    pub fn crawl_delay(&self, agent: &str) -> Duration {
        self.match_group(agent).crawl_delay()
    }
}

/// Probe `/` against a group holding only a deny-everything rule.
pub fn disallow_all_default() -> bool {
    Group::deny_all().test("/")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use regex::Regex;

    use super::*;
    use crate::types::{CleanParamRule, PathMatcher, RuleAction};

    fn literal(action: RuleAction, path: &str) -> Arc<Rule> {
        Arc::new(Rule::new(action, path.to_string(), PathMatcher::Literal(path.to_string())))
    }

    fn pattern(action: RuleAction, path: &str, re: &str) -> Arc<Rule> {
        Arc::new(Rule::new(
            action,
            path.to_string(),
            PathMatcher::Pattern(Regex::new(re).unwrap()),
        ))
    }

    fn group(agent: &str, rules: Vec<Arc<Rule>>) -> Group {
        let mut g = Group::new(agent);
        for rule in rules {
            g.push_rule(rule);
        }
        g
    }

    #[test]
    fn longer_rule_wins() {
        let g = group(
            "*",
            vec![
                literal(RuleAction::Disallow, "/a/"),
                literal(RuleAction::Allow, "/a/b"),
            ],
        );
        assert!(g.test("/a/b"));
        assert!(!g.test("/a/c"));
        assert!(g.test("/b"));
    }

    #[test]
    fn allow_wins_ties() {
        let g = group(
            "*",
            vec![
                literal(RuleAction::Disallow, "/page"),
                literal(RuleAction::Allow, "/page"),
            ],
        );
        let result = g.check("/page");
        assert_eq!(result.decision, MatchDecision::Allow);
        assert_eq!(result.rule.map(Rule::action), Some(RuleAction::Allow));

        let reversed = group(
            "*",
            vec![
                literal(RuleAction::Allow, "/page"),
                literal(RuleAction::Disallow, "/page"),
            ],
        );
        assert!(reversed.test("/page"));
    }

    #[test]
    fn pattern_rule_competes_by_source_length() {
        let g = group(
            "*",
            vec![
                literal(RuleAction::Disallow, "/toolkit/"),
                pattern(RuleAction::Allow, "/toolkit/*.html", r"^/toolkit/.*\.html"),
            ],
        );
        assert!(g.test("/toolkit/intro.html"));
        assert!(!g.test("/toolkit/intro.pdf"));
    }

    #[test]
    fn unmatched_path_is_allowed() {
        let g = group("*", vec![literal(RuleAction::Disallow, "/private")]);
        let result = g.check("/public");
        assert!(result.is_allowed());
        assert!(result.rule.is_none());
    }

    #[test]
    fn match_group_prefers_longest_token() {
        let mut groups = BTreeMap::new();
        groups.insert("*".to_string(), group("*", vec![literal(RuleAction::Disallow, "/")]));
        groups.insert("google".to_string(), group("google", vec![]));
        groups.insert(
            "googlebot-news".to_string(),
            group("googlebot-news", vec![literal(RuleAction::Disallow, "/news")]),
        );
        let fallback = Group::new(WILDCARD_AGENT);
        let matcher = Matcher::new(&groups, &fallback);

        assert_eq!(matcher.match_group("Googlebot").agent(), "google");
        assert_eq!(matcher.match_group("Googlebot-News/2.1").agent(), "googlebot-news");
        assert_eq!(matcher.match_group("SomeBot").agent(), "*");
        assert!(matcher.test("/", "Googlebot"));
        assert!(!matcher.test("/news/today", "googlebot-news"));
        assert!(!matcher.test("/", "SomeBot"));
    }

    #[test]
    fn match_group_uses_fallback_without_wildcard() {
        let mut groups = BTreeMap::new();
        groups.insert("mybot".to_string(), group("mybot", vec![literal(RuleAction::Disallow, "/")]));
        let fallback = Group::new(WILDCARD_AGENT);
        let matcher = Matcher::new(&groups, &fallback);

        assert!(std::ptr::eq(matcher.match_group("otherbot"), &fallback));
        assert!(matcher.test("/", "otherbot"));
        assert_eq!(matcher.crawl_delay("otherbot"), Duration::ZERO);
    }

    #[test]
    fn clean_params_collects_matching_scopes() {
        let mut g = Group::new("yandex");
        g.push_clean_param(Arc::new(CleanParamRule::new("ref&sid", None)));
        g.push_clean_param(Arc::new(CleanParamRule::new(
            "sort&sid",
            Some(("/catalog".to_string(), PathMatcher::Literal("/catalog".to_string()))),
        )));

        assert_eq!(g.clean_params_for("/catalog/shoes"), vec!["ref", "sid", "sort"]);
        assert_eq!(g.clean_params_for("/blog"), vec!["ref", "sid"]);
    }

    #[test]
    fn deny_all_probe() {
        assert!(!disallow_all_default());
    }
}
