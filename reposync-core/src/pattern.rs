//! Glob matching with `!negation`.
//!
//! A name matches a [`PatternSet`] when it matches at least one positive
//! pattern and none of the negated ones. A set made only of negations behaves
//! as if `*` were also present, so `['!legacy-*']` means "everything except
//! `legacy-*`".
//!
//! Repository-name sets ([`PatternSet::new`]) never let a wildcard match a
//! leading `.`: `*` skips `.github`, while `.github` or `.*` select it.
//! Workspace-path sets ([`PatternSet::for_paths`]) match dotfiles freely.

use glob::{MatchOptions, Pattern};

use crate::error::ConfigError;

const NAME_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

const PATH_OPTIONS: MatchOptions = MatchOptions {
    require_literal_leading_dot: false,
    ..NAME_OPTIONS
};

/// Compiled include/exclude globs.
#[derive(Debug, Clone)]
pub struct PatternSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    options: MatchOptions,
}

impl PatternSet {
    /// Patterns over repository names.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        Self::compile(patterns, NAME_OPTIONS)
    }

    /// Patterns over workspace-relative paths, dotfiles included.
    pub fn for_paths<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        Self::compile(patterns, PATH_OPTIONS)
    }

    fn compile<S: AsRef<str>>(patterns: &[S], options: MatchOptions) -> Result<Self, ConfigError> {
        let mut set = PatternSet {
            include: Vec::new(),
            exclude: Vec::new(),
            options,
        };
        for raw in patterns {
            let raw = raw.as_ref();
            let (negated, body) = match raw.strip_prefix('!') {
                Some(body) => (true, body),
                None => (false, raw),
            };
            let pattern = Pattern::new(body).map_err(|source| ConfigError::Pattern {
                pattern: raw.to_owned(),
                source,
            })?;
            if negated {
                set.exclude.push(pattern);
            } else {
                set.include.push(pattern);
            }
        }
        Ok(set)
    }

    /// No patterns were given at all.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| p.matches_with(name, self.options));
        included && !self.exclude.iter().any(|p| p.matches_with(name, self.options))
    }

    /// Whether `name` is hit by one of the negated patterns.
    pub fn excludes(&self, name: &str) -> bool {
        self.exclude.iter().any(|p| p.matches_with(name, self.options))
    }

    /// Keep the names that match, preserving input order.
    pub fn filter<I, T>(&self, names: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        names
            .into_iter()
            .filter(|n| self.matches(n.as_ref()))
            .collect()
    }
}
