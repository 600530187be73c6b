//! The reserved-name predicate shared by every sweep.

use regex::Regex;

/// Runtime-environment names containing this substring are
/// system-managed and must not remain associated with the account.
pub const DEFAULT_RESERVED_LITERAL: &str = "system";

/// Matches runtime-environment names that are system-reserved.
///
/// The match is a case-sensitive, unanchored substring test. The same
/// predicate decides candidacy in all three sweeps; backends reuse
/// [`ReservedPattern::pattern`] for server-side filters so the two
/// cannot diverge.
#[derive(Debug, Clone)]
pub struct ReservedPattern {
    pattern: String,
    regex: Regex,
}

impl ReservedPattern {
    /// Build the predicate for a literal substring.
    pub fn new(literal: &str) -> Self {
        let pattern = regex::escape(literal);
        let regex = Regex::new(&pattern).expect("escaped literal is a valid regex");
        Self { pattern, regex }
    }

    /// Whether `name` names a system-reserved runtime environment.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// The regex source, for backend-side filters.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for ReservedPattern {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_LITERAL)
    }
}
