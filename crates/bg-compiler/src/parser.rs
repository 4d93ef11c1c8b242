//! Line classifier.
//!
//! Consumes the token stream two tokens at a time (directive, value) and
//! classifies each pair. Directive names are matched case-insensitively,
//! including the misspellings commonly found in the wild.

use std::borrow::Cow;

use crate::pattern::{compile_path, CompiledPath};
use crate::tokenizer::Token;

/// Recoverable problem found while parsing. The offending line is dropped;
/// the rest of the document is still used.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: invalid wildcard path {path:?}: {source}")]
    InvalidPattern {
        line: usize,
        path: String,
        #[source]
        source: regex::Error,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidPattern { line, .. } => *line,
        }
    }
}

/// What a line turned out to be.
#[derive(Debug, Clone)]
pub enum LineKind {
    /// Blank line, or a directive whose value makes it meaningless.
    Ignore,
    /// Unrecognized directive.
    Unknown,
    /// Lower-cased agent token.
    UserAgent(String),
    /// `None` when the path was empty: the line still counts as a rule line
    /// of the current block but carries no rule.
    Allow(Option<CompiledPath>),
    Disallow(Option<CompiledPath>),
    /// Seconds; invalid values are already replaced with zero.
    CrawlDelay(f64),
    Sitemap(String),
    Host(String),
    /// Raw `&`-joined parameter list and optional scope.
    CleanParam {
        params: String,
        scope: Option<CompiledPath>,
    },
}

/// A classified directive line.
#[derive(Debug, Clone)]
pub struct ClassifiedLine<'a> {
    /// Directive spelling as written, empty for blank lines.
    pub directive: &'a [u8],
    /// 1-based line number.
    pub line: usize,
    pub kind: LineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    UserAgent,
    Allow,
    Disallow,
    CrawlDelay,
    Sitemap,
    Host,
    CleanParam,
}

const USER_AGENT_SPELLINGS: &[&str] = &["user-agent", "useragent", "usser-agent", "ser-agent"];
const CRAWL_DELAY_SPELLINGS: &[&str] = &["crawl-delay", "crawldelay"];
const CLEAN_PARAM_SPELLINGS: &[&str] = &["clean-param", "cleanparam", "clean-params"];

impl Directive {
    fn recognize(name: &[u8]) -> Option<Self> {
        let is = |spellings: &[&str]| spellings.iter().any(|s| name.eq_ignore_ascii_case(s.as_bytes()));

        if is(USER_AGENT_SPELLINGS) {
            Some(Self::UserAgent)
        } else if name.eq_ignore_ascii_case(b"disallow") {
            Some(Self::Disallow)
        } else if name.eq_ignore_ascii_case(b"allow") {
            Some(Self::Allow)
        } else if name.eq_ignore_ascii_case(b"host") {
            Some(Self::Host)
        } else if name.eq_ignore_ascii_case(b"sitemap") {
            Some(Self::Sitemap)
        } else if is(CRAWL_DELAY_SPELLINGS) {
            Some(Self::CrawlDelay)
        } else if is(CLEAN_PARAM_SPELLINGS) {
            Some(Self::CleanParam)
        } else {
            None
        }
    }
}

/// Cursor over a token stream that yields one classified line per call.
pub struct LineParser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    line: usize,
}

impl<'a> LineParser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens,
            pos: 0,
            line: 1,
        }
    }

    /// Classify the next line, `None` at end of input.
    pub fn parse_line(&mut self) -> Option<Result<ClassifiedLine<'a>, ParseError>> {
        let line = self.line;
        let directive = match self.pop_token()? {
            Token::Eol => {
                self.line += 1;
                return Some(Ok(ClassifiedLine {
                    directive: b"",
                    line,
                    kind: LineKind::Ignore,
                }));
            }
            Token::Word(word) => word,
        };

        let kind = match Directive::recognize(directive) {
            Some(known) => self.classify(known, line),
            None => {
                self.take_value();
                Ok(LineKind::Unknown)
            }
        };

        Some(kind.map(|kind| ClassifiedLine {
            directive,
            line,
            kind,
        }))
    }

    fn classify(&mut self, directive: Directive, line: usize) -> Result<LineKind, ParseError> {
        let value = self.take_value();

        let kind = match directive {
            Directive::UserAgent => match value {
                Some(v) => LineKind::UserAgent(text(v).to_lowercase()),
                None => LineKind::Ignore,
            },
            Directive::Allow => LineKind::Allow(path_value(value, line)?),
            Directive::Disallow => LineKind::Disallow(path_value(value, line)?),
            Directive::Host => match value {
                Some(v) => LineKind::Host(text(v).into_owned()),
                None => LineKind::Ignore,
            },
            Directive::Sitemap => match value {
                Some(v) => LineKind::Sitemap(text(v).into_owned()),
                None => LineKind::Ignore,
            },
            Directive::CrawlDelay => LineKind::CrawlDelay(parse_crawl_delay(value.unwrap_or_default())),
            Directive::CleanParam => match value {
                Some(params) => {
                    let scope = self.take_value();
                    LineKind::CleanParam {
                        params: text(params).into_owned(),
                        scope: path_value(scope, line)?,
                    }
                }
                None => LineKind::CleanParam {
                    params: String::new(),
                    scope: None,
                },
            },
        };

        Ok(kind)
    }

    fn pop_token(&mut self) -> Option<Token<'a>> {
        let token = self.peek_token()?;
        self.pos += 1;
        Some(token)
    }

    fn peek_token(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    /// Consume the next token if it is a word. An end-of-line marker is left
    /// in place so the line count stays correct.
    fn take_value(&mut self) -> Option<&'a [u8]> {
        match self.peek_token()? {
            Token::Word(word) => {
                self.pos += 1;
                Some(word)
            }
            Token::Eol => None,
        }
    }
}

impl<'a> Iterator for LineParser<'a> {
    type Item = Result<ClassifiedLine<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_line()
    }
}

fn text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn path_value(value: Option<&[u8]>, line: usize) -> Result<Option<CompiledPath>, ParseError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let raw = text(value);
    compile_path(&raw)
        .map(Some)
        .map_err(|source| ParseError::InvalidPattern {
            line,
            path: raw.into_owned(),
            source,
        })
}

/// Seconds as a float; anything unusable becomes zero.
fn parse_crawl_delay(value: &[u8]) -> f64 {
    match std::str::from_utf8(value).ok().and_then(|s| s.parse::<f64>().ok()) {
        Some(secs) if secs.is_finite() && secs >= 0.0 => secs,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn classify(input: &str) -> Vec<LineKind> {
        LineParser::new(tokenize(input.as_bytes()))
            .map(|line| line.expect("no parse errors expected").kind)
            .filter(|kind| !matches!(kind, LineKind::Ignore))
            .collect()
    }

    #[test]
    fn test_misspelled_user_agent() {
        for input in [
            "User-agent: Bot",
            "useragent: Bot",
            "Usser-agent: Bot",
            "ser-agent: Bot",
            "USER-AGENT: Bot",
        ] {
            let kinds = classify(input);
            assert!(
                matches!(kinds.as_slice(), [LineKind::UserAgent(agent)] if agent == "bot"),
                "{input}: {kinds:?}"
            );
        }
    }

    #[test]
    fn test_crawl_delay_values() {
        let delays: Vec<f64> = ["100", "0.5", "/", "-3", "inf", "NaN", ""]
            .iter()
            .map(|v| match classify(&format!("Crawl-delay: {v}")).as_slice() {
                [LineKind::CrawlDelay(secs)] => *secs,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(delays, [100.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);

        assert!(matches!(classify("crawldelay: 2").as_slice(), [LineKind::CrawlDelay(s)] if *s == 2.0));
    }

    #[test]
    fn test_empty_values() {
        assert!(matches!(classify("Disallow:").as_slice(), [LineKind::Disallow(None)]));
        assert!(matches!(classify("Allow:   ").as_slice(), [LineKind::Allow(None)]));
        assert!(classify("Sitemap:").is_empty());
        assert!(classify("Host:").is_empty());
        assert!(classify("User-agent:").is_empty());
    }

    #[test]
    fn test_unknown_directive_consumes_value() {
        let kinds = classify("Request-rate: 1/5\nDisallow: /x");
        assert!(matches!(kinds[0], LineKind::Unknown));
        match &kinds[1] {
            LineKind::Disallow(Some(path)) => assert_eq!(path.path, "/x"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(kinds.len(), 2);
    }

    #[test]
    fn test_clean_param() {
        match classify("Clean-param: ref&sid /forum*").as_slice() {
            [LineKind::CleanParam { params, scope: Some(scope) }] => {
                assert_eq!(params, "ref&sid");
                assert_eq!(scope.path, "/forum");
            }
            other => panic!("unexpected {other:?}"),
        }

        match classify("cleanparam: utm_source\nAllow: /").as_slice() {
            [LineKind::CleanParam { params, scope: None }, LineKind::Allow(Some(_))] => {
                assert_eq!(params, "utm_source");
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            classify("Clean-params:").as_slice(),
            [LineKind::CleanParam { params, scope: None }] if params.is_empty()
        ));
    }

    #[test]
    fn test_line_numbers() {
        let lines: Vec<(usize, &[u8])> = LineParser::new(tokenize(b"\nUser-agent: a\n\nDisallow: /b"))
            .map(|line| line.unwrap())
            .filter(|line| !matches!(line.kind, LineKind::Ignore))
            .map(|line| (line.line, line.directive))
            .collect();
        assert_eq!(lines, [(2, &b"User-agent"[..]), (4, &b"Disallow"[..])]);
    }

    #[test]
    fn test_host_and_sitemap() {
        match classify("Host: site.ru\nSitemap: https://site.ru/s.xml").as_slice() {
            [LineKind::Host(host), LineKind::Sitemap(url)] => {
                assert_eq!(host, "site.ru");
                assert_eq!(url, "https://site.ru/s.xml");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
