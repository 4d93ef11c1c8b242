use std::fs;
use std::path::Path;
use std::time::Instant;

use bg_compiler::{from_status_and_bytes, line_count, parse_policy, ParseError};
use bg_core::Directory;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LoadStats {
    pub bytes: usize,
    pub lines: usize,
    pub parse_ms: f64,
}

/// Read a robots.txt file and build its directory, going through the status
/// shortcut when a fetch status is given.
pub fn load_directory(
    path: &Path,
    status: Option<u16>,
) -> Result<(Directory, Vec<ParseError>, LoadStats), String> {
    let content = fs::read(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;

    let start = Instant::now();
    let (directory, errors) = match status {
        Some(code) => from_status_and_bytes(code, &content),
        None => parse_policy(&content),
    };

    let stats = LoadStats {
        bytes: content.len(),
        lines: line_count(&content),
        parse_ms: start.elapsed().as_secs_f64() * 1000.0,
    };

    Ok((directory, errors, stats))
}

#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub agent: String,
    pub rules: Vec<RuleReport>,
    pub crawl_delay_secs: Option<f64>,
    pub clean_params: Vec<CleanParamReport>,
}

#[derive(Debug, Serialize)]
pub struct RuleReport {
    pub action: &'static str,
    pub path: String,
    pub pattern: bool,
}

#[derive(Debug, Serialize)]
pub struct CleanParamReport {
    pub params: Vec<String>,
    pub scope: String,
}

#[derive(Debug, Serialize)]
pub struct DirectoryReport {
    pub host: String,
    pub sitemaps: Vec<String>,
    pub groups: Vec<GroupReport>,
    pub diagnostics: Vec<String>,
    pub stats: LoadStats,
}

impl DirectoryReport {
    pub fn new(directory: &Directory, errors: &[ParseError], stats: LoadStats) -> Self {
        let groups = directory
            .groups()
            .map(|group| GroupReport {
                agent: group.agent().to_string(),
                rules: group
                    .rules()
                    .iter()
                    .map(|rule| RuleReport {
                        action: rule.action().as_str(),
                        path: rule.path().to_string(),
                        pattern: rule.matcher().is_pattern(),
                    })
                    .collect(),
                crawl_delay_secs: group.declared_crawl_delay().map(|d| d.as_secs_f64()),
                clean_params: group
                    .clean_params()
                    .iter()
                    .map(|rule| CleanParamReport {
                        params: rule.params().to_vec(),
                        scope: rule.scope_path().to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            host: directory.host().to_string(),
            sitemaps: directory.sitemaps().to_vec(),
            groups,
            diagnostics: errors.iter().map(ToString::to_string).collect(),
            stats,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Verdict<'a> {
    pub path: &'a str,
    pub agent: &'a str,
    pub group: String,
    pub allowed: bool,
    pub rule: Option<String>,
}

pub fn verdict<'a>(directory: &Directory, path: &'a str, agent: &'a str) -> Verdict<'a> {
    let group = directory.find_group(agent);
    let result = group.check(path);
    Verdict {
        path,
        agent,
        group: group.agent().to_string(),
        allowed: result.is_allowed(),
        rule: result
            .rule
            .map(|rule| format!("{}: {}", rule.action().as_str(), rule.path())),
    }
}
