//! Parsed crawl-policy document.
//!
//! A `Directory` is built once by the compiler and is read-only afterwards,
//! so it can be shared between threads without locking.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::matcher::{MatchResult, Matcher};
use crate::types::{Group, WILDCARD_AGENT};

/// Groups, mirror host and sitemaps of one robots.txt document.
#[derive(Debug, Clone)]
pub struct Directory {
    groups: BTreeMap<String, Group>,
    host: String,
    sitemaps: Vec<String>,
    fallback: Group,
}

impl Directory {
    /// Directory for a parsed document; agents with no applicable group are
    /// allowed everything.
    pub fn new(groups: BTreeMap<String, Group>, host: String, sitemaps: Vec<String>) -> Self {
        Self {
            groups,
            host,
            sitemaps,
            fallback: Group::new(WILDCARD_AGENT),
        }
    }

    /// Directory that allows every path for every agent.
    pub fn allow_all() -> Self {
        Self::new(BTreeMap::new(), String::new(), Vec::new())
    }

    /// Directory that denies every path for every agent.
    pub fn disallow_all() -> Self {
        Self {
            fallback: Group::deny_all(),
            ..Self::allow_all()
        }
    }

    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.groups, &self.fallback)
    }

    /// Is `path` allowed for `agent`?
    pub fn test(&self, path: &str, agent: &str) -> bool {
        self.matcher().test(path, agent)
    }

    /// Decision for `path` together with the rule that produced it.
    pub fn check(&self, path: &str, agent: &str) -> MatchResult<'_> {
        self.find_group(agent).check(path)
    }

    /// Crawl delay for `agent`, zero when none applies.
    pub fn crawl_delay(&self, agent: &str) -> Duration {
        self.matcher().crawl_delay(agent)
    }

    /// Group that applies to `agent`. Never absent: agents that match nothing
    /// get the directory's fallback group.
    pub fn find_group(&self, agent: &str) -> &Group {
        self.matcher().match_group(agent)
    }

    /// Declared group for an exact (case-insensitive) agent token.
    pub fn group(&self, agent: &str) -> Option<&Group> {
        self.groups.get(&agent.to_lowercase())
    }

    /// Declared groups in agent-token order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Mirror host, empty when never declared.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::allow_all()
    }
}
