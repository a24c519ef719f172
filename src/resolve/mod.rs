//! Path resolution: classification, wildcard matching, and the source
//! resolver that turns raw user input into a validated (directory, pattern)
//! pair.

mod classify;
mod source;
mod wildcard;

pub use classify::{classify, classify_in};
pub use source::{resolve, resolve_in, ResolvedSource};
pub use wildcard::{contains_wildcard, is_default_patterns, WildcardMatcher};
