//! Filename wildcard matching.
//! Compiles a set of glob patterns (`*`, `?`) into one anchored,
//! case-insensitive regex so matching thousands of names costs one
//! compilation.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

pub struct WildcardMatcher {
    re: Regex,
}

impl WildcardMatcher {
    /// Compile patterns into a single alternation. An empty list matches
    /// everything (treated as `["*"]`).
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let alternation = if patterns.is_empty() {
            glob_to_regex("*")
        } else {
            patterns
                .iter()
                .map(|p| glob_to_regex(p.as_ref()))
                .collect::<Vec<_>>()
                .join("|")
        };

        let re = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("compile filename patterns: {alternation}"))?;
        Ok(Self { re })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.re.is_match(name)
    }
}

/// True when the pattern set is the implicit match-all default.
pub fn is_default_patterns<S: AsRef<str>>(patterns: &[S]) -> bool {
    patterns.is_empty() || (patterns.len() == 1 && patterns[0].as_ref() == "*")
}

/// True when `segment` carries a glob metacharacter.
pub fn contains_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?'])
}

/// One glob pattern -> anchored regex fragment. Literals are escaped,
/// `*` maps to `.*`, `?` maps to `.`.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
    }
    out.push('$');
    out
}
