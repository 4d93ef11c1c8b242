//! Group assembler.
//!
//! Walks the classified lines and builds one `Group` per agent token. A block
//! is a run of `User-agent` lines followed by rule lines; consecutive agents
//! share the block's rules, and a `User-agent` line that follows a rule line
//! starts a new block. Rule lines seen before any `User-agent` apply to `*`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use bg_core::types::{CleanParamRule, Group, Rule, RuleAction, WILDCARD_AGENT};
use bg_core::Directory;

use crate::parser::{ClassifiedLine, LineKind, ParseError};
use crate::pattern::CompiledPath;

/// Assemble a `Directory` from classified lines.
///
/// Errors are collected and returned next to the directory; the lines that
/// produced them are skipped.
pub fn build_directory<'a, I>(lines: I) -> (Directory, Vec<ParseError>)
where
    I: IntoIterator<Item = Result<ClassifiedLine<'a>, ParseError>>,
{
    let mut assembler = GroupAssembler::default();
    let mut errors = Vec::new();

    for line in lines {
        match line {
            Ok(line) => assembler.apply(line.kind),
            Err(err) => {
                log::warn!("skipping line: {err}");
                errors.push(err);
            }
        }
    }

    (assembler.finish(), errors)
}

#[derive(Default)]
struct GroupAssembler {
    groups: BTreeMap<String, Group>,
    agents: Vec<String>,
    block_has_rules: bool,
    host: String,
    sitemaps: Vec<String>,
}

impl GroupAssembler {
    fn apply(&mut self, kind: LineKind) {
        match kind {
            LineKind::Ignore | LineKind::Unknown => {}
            LineKind::UserAgent(agent) => self.user_agent(agent),
            LineKind::Allow(path) => self.rule(RuleAction::Allow, path),
            LineKind::Disallow(path) => self.rule(RuleAction::Disallow, path),
            LineKind::CrawlDelay(secs) => {
                let delay = Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
                self.enter_rules();
                self.for_each_group(|group| group.set_crawl_delay(delay));
            }
            LineKind::CleanParam { params, scope } => {
                if params.is_empty() {
                    return;
                }
                let scope = scope.map(|CompiledPath { path, matcher }| (path, matcher));
                let rule = Arc::new(CleanParamRule::new(&params, scope));
                self.enter_rules();
                self.for_each_group(|group| group.push_clean_param(Arc::clone(&rule)));
            }
            LineKind::Host(host) => self.host = host,
            LineKind::Sitemap(url) => {
                if !url.is_empty() {
                    self.sitemaps.push(url);
                }
            }
        }
    }

    fn user_agent(&mut self, agent: String) {
        if self.block_has_rules {
            self.agents.clear();
            self.block_has_rules = false;
        }
        if !self.agents.contains(&agent) {
            self.agents.push(agent);
        }
    }

    /// An empty path adds no rule but still closes the run of `User-agent`
    /// lines and declares the block's groups.
    fn rule(&mut self, action: RuleAction, path: Option<CompiledPath>) {
        self.enter_rules();
        match path {
            Some(CompiledPath { path, matcher }) => {
                let rule = Arc::new(Rule::new(action, path, matcher));
                self.for_each_group(|group| group.push_rule(Arc::clone(&rule)));
            }
            None => self.for_each_group(|_| {}),
        }
    }

    fn enter_rules(&mut self) {
        if self.agents.is_empty() {
            self.agents.push(WILDCARD_AGENT.to_string());
        }
        self.block_has_rules = true;
    }

    fn for_each_group(&mut self, mut f: impl FnMut(&mut Group)) {
        for agent in &self.agents {
            let group = self
                .groups
                .entry(agent.clone())
                .or_insert_with(|| Group::new(agent.clone()));
            f(group);
        }
    }

    fn finish(self) -> Directory {
        log::debug!(
            "assembled {} groups, {} sitemaps, host {:?}",
            self.groups.len(),
            self.sitemaps.len(),
            self.host
        );
        Directory::new(self.groups, self.host, self.sitemaps)
    }
}
