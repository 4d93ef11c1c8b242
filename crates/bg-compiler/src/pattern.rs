//! Rule path compiler.
//!
//! Paths are normalized first. Paths without wildcards stay literal prefixes;
//! paths with `*` or `$` go through two steps: escape every regex
//! metacharacter, then turn the escaped `\*` back into `.*` and the escaped
//! `\$` back into an end anchor.

use bg_core::types::PathMatcher;
use regex::Regex;

/// A normalized rule path and its matcher.
#[derive(Debug, Clone)]
pub struct CompiledPath {
    /// Normalized text, used for specificity.
    pub path: String,
    pub matcher: PathMatcher,
}

/// Prepend `/` unless the path starts with `*` or `/`, then drop trailing `*`.
pub fn normalize_path(raw: &str) -> String {
    let mut path = if raw.starts_with('*') || raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    };
    let trimmed = path.trim_end_matches('*').len();
    path.truncate(trimmed);
    path
}

pub fn has_wildcards(path: &str) -> bool {
    path.contains(['*', '$'])
}

/// Step one: escape every regex metacharacter.
pub fn escape_path(path: &str) -> String {
    regex::escape(path)
}

/// Step two: reinterpret escaped `*` as "any characters" and escaped `$` as
/// the end anchor. Every other escape is kept as is.
pub fn translate_wildcards(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len() + 4);
    let mut chars = escaped.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('*') => out.push_str(".*"),
            Some('$') => out.push('$'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Normalize `raw` and build its matcher.
pub fn compile_path(raw: &str) -> Result<CompiledPath, regex::Error> {
    let path = normalize_path(raw);

    let matcher = if has_wildcards(&path) {
        let source = format!("^{}", translate_wildcards(&escape_path(&path)));
        PathMatcher::Pattern(Regex::new(&source)?)
    } else {
        PathMatcher::Literal(path.clone())
    };

    Ok(CompiledPath { path, matcher })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/admin"), "/admin");
        assert_eq!(normalize_path("admin"), "/admin");
        assert_eq!(normalize_path("*/x/*"), "*/x/");
        assert_eq!(normalize_path("/private***"), "/private");
        assert_eq!(normalize_path("*"), "");
        assert_eq!(normalize_path("/places/$"), "/places/$");
    }

    #[test]
    fn test_translate_wildcards() {
        assert_eq!(translate_wildcards(&escape_path("/a*b$")), "/a.*b$");
        assert_eq!(translate_wildcards(&escape_path("/a.b*")), r"/a\.b.*");
        assert_eq!(translate_wildcards(&escape_path(r"/a\*")), r"/a\\.*");
        assert_eq!(
            translate_wildcards(&escape_path("/index.php?option=com_phorum*,newer")),
            r"/index\.php\?option=com_phorum.*,newer"
        );
    }

    #[test]
    fn test_literal_path() {
        let compiled = compile_path("wp-admin/").unwrap();
        assert_eq!(compiled.path, "/wp-admin/");
        assert!(!compiled.matcher.is_pattern());
        assert!(compiled.matcher.matches("/wp-admin/options.php"));
    }

    #[test]
    fn test_wildcard_prefix() {
        let compiled = compile_path("*/oroscopo-di-oggi/*").unwrap();
        assert_eq!(compiled.path, "*/oroscopo-di-oggi/");
        assert!(compiled.matcher.is_pattern());
        assert!(compiled.matcher.matches("/oroscopo-di-oggi/bar"));
        assert!(compiled.matcher.matches("/foo/oroscopo-di-oggi/bar"));
        assert!(!compiled.matcher.matches("/foo/bar"));
    }

    #[test]
    fn test_end_anchor() {
        let compiled = compile_path("/places/$").unwrap();
        assert!(compiled.matcher.matches("/places/"));
        assert!(!compiled.matcher.matches("/places/paris"));
    }

    #[test]
    fn test_pattern_is_anchored_at_start() {
        let compiled = compile_path("/toolkit/*.html").unwrap();
        assert!(compiled.matcher.matches("/toolkit/docs/index.html"));
        assert!(!compiled.matcher.matches("/other/toolkit/index.html"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let compiled = compile_path("/search?q=(a|b)*").unwrap();
        // Trailing `*` is stripped, so this stays a literal prefix.
        assert!(!compiled.matcher.is_pattern());
        assert!(compiled.matcher.matches("/search?q=(a|b)&page=2"));

        let compiled = compile_path("/a+b*/c").unwrap();
        assert!(compiled.matcher.matches("/a+b/x/c"));
        assert!(!compiled.matcher.matches("/aab/x/c"));
    }
}
