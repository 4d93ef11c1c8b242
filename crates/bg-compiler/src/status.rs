//! Policy shortcut for the HTTP status of a robots.txt fetch.

use bg_core::Directory;

use crate::parser::ParseError;

/// How a fetch status decides the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Everything is allowed; the body is not looked at.
    AllowAll,
    /// Server error: nothing is allowed.
    DisallowAll,
    /// The body is parsed as a document.
    ParseBody,
}

impl StatusPolicy {
    pub fn for_status(code: u16) -> Self {
        match code {
            200 | 400 | 401 | 403 | 404 => Self::AllowAll,
            500..=u16::MAX => Self::DisallowAll,
            _ => Self::ParseBody,
        }
    }
}

/// Build a directory from a fetch status and its body.
pub fn from_status_and_bytes(code: u16, body: &[u8]) -> (Directory, Vec<ParseError>) {
    match StatusPolicy::for_status(code) {
        StatusPolicy::AllowAll => (Directory::allow_all(), Vec::new()),
        StatusPolicy::DisallowAll => (Directory::disallow_all(), Vec::new()),
        StatusPolicy::ParseBody => crate::parse_policy(body),
    }
}

pub fn from_status_and_str(code: u16, body: &str) -> (Directory, Vec<ParseError>) {
    from_status_and_bytes(code, body.as_bytes())
}
