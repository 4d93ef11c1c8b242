//! botgate Core Library
//!
//! This crate holds the rule model and the matching engine that answers
//! "may this crawler fetch this path?" for a parsed robots.txt document.
//!
//! # Architecture
//!
//! The compiler crate turns document text into a `Directory`. Rules are
//! allocated once per directive and shared by every group they apply to;
//! nothing is mutated after construction, so queries need no locking.
//!
//! # Modules
//!
//! - `types`: rules, clean-param rules and groups
//! - `matcher`: group selection and rule resolution
//! - `directory`: immutable document facade and query surface

pub mod types;
pub mod matcher;
pub mod directory;

// Re-export commonly used types
pub use directory::Directory;
pub use matcher::{disallow_all_default, MatchDecision, MatchResult, Matcher};
pub use types::{CleanParamRule, Group, PathMatcher, Rule, RuleAction, WILDCARD_AGENT};
