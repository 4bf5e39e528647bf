//! Target host resolution.
//!
//! Narrows the configured host names down to the hosts the user asked for.
//! Each filter is matched either as a regular expression (unanchored) or as
//! an exact name, and filters are combined with AND or OR.
//!
//! # Composition
//!
//! - `And`: every filter narrows the survivors of the previous one.
//! - `Or`: every filter is matched against the full candidate list and the
//!   matches are pooled.
//!
//! Host names starting with `_` are templates and never resolve.
//!
//! # Example
//!
//! ```
//! use mssh::resolver::{resolve, FilterSpec};
//!
//! let hosts = ["web1", "web2", "db1", "_tpl"];
//! let spec = FilterSpec::regex_and(vec!["web".to_string()]);
//! assert_eq!(resolve(&hosts, &spec).unwrap(), vec!["web1", "web2"]);
//! ```

use crate::error::{MsshError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

/// Prefix marking a template host that is never launched directly.
pub const TEMPLATE_PREFIX: char = '_';

/// How the filters in a [`FilterSpec`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// A host must match every filter.
    And,
    /// A host must match at least one filter.
    Or,
}

/// How a single filter is compared against a host name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matching {
    /// Regular expression matched anywhere in the name.
    Regex,
    /// Exact string equality.
    Literal,
}

/// The user's filters plus how to apply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Filter patterns, in the order given.
    pub patterns: Vec<String>,
    /// How the filters combine.
    pub composition: Composition,
    /// How each filter matches.
    pub matching: Matching,
}

impl FilterSpec {
    /// Regex matching, AND composition (the default mode).
    pub fn regex_and(patterns: Vec<String>) -> Self {
        FilterSpec {
            patterns,
            composition: Composition::And,
            matching: Matching::Regex,
        }
    }

    /// Literal matching, OR composition (`--fixed-string` mode).
    pub fn literal_or(patterns: Vec<String>) -> Self {
        FilterSpec {
            patterns,
            composition: Composition::Or,
            matching: Matching::Literal,
        }
    }

    /// Pick the mode pair from the `--fixed-string` flag.
    pub fn from_fixed_string(patterns: Vec<String>, fixed_string: bool) -> Self {
        if fixed_string {
            Self::literal_or(patterns)
        } else {
            Self::regex_and(patterns)
        }
    }
}

/// A compiled single filter.
#[derive(Debug)]
enum Matcher<'a> {
    Regex(Regex),
    Literal(&'a str),
}

impl<'a> Matcher<'a> {
    fn compile(pattern: &'a str, matching: Matching) -> Result<Self> {
        match matching {
            Matching::Literal => Ok(Matcher::Literal(pattern)),
            Matching::Regex => Regex::new(pattern)
                .map(Matcher::Regex)
                .map_err(|source| MsshError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                }),
        }
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            Matcher::Regex(re) => re.is_match(name),
            Matcher::Literal(literal) => *literal == name,
        }
    }
}

/// Return the candidates matching a single filter, skipping templates.
///
/// # Errors
///
/// Returns [`MsshError::Pattern`] if `matching` is [`Matching::Regex`] and the
/// pattern doesn't compile.
pub fn filter<'c, S: AsRef<str>>(
    candidates: &'c [S],
    pattern: &str,
    matching: Matching,
) -> Result<Vec<&'c str>> {
    let matcher = Matcher::compile(pattern, matching)?;
    Ok(candidates
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !name.starts_with(TEMPLATE_PREFIX))
        .filter(|name| matcher.is_match(name))
        .collect())
}

/// Resolve the target hosts for `spec` among `candidates`.
///
/// The result is sorted ascending and free of duplicates.
///
/// With no filters, `And` yields every non-template candidate and `Or` yields
/// nothing.
///
/// # Errors
///
/// Returns [`MsshError::Pattern`] if a regex filter doesn't compile.
pub fn resolve<S: AsRef<str>>(candidates: &[S], spec: &FilterSpec) -> Result<Vec<String>> {
    let targets: BTreeSet<&str> = match spec.composition {
        Composition::And => {
            let mut survivors: Vec<&str> = candidates
                .iter()
                .map(|name| name.as_ref())
                .filter(|name| !name.starts_with(TEMPLATE_PREFIX))
                .collect();
            for pattern in &spec.patterns {
                let matcher = Matcher::compile(pattern, spec.matching)?;
                survivors.retain(|name| matcher.is_match(name));
                debug!(pattern = %pattern, remaining = survivors.len(), "narrowed targets");
            }
            survivors.into_iter().collect()
        }
        Composition::Or => {
            let mut pooled: Vec<&str> = Vec::new();
            for pattern in &spec.patterns {
                let matched = filter(candidates, pattern, spec.matching)?;
                debug!(pattern = %pattern, matched = ?matched, "pooled targets");
                pooled.extend(matched);
            }
            pooled.into_iter().collect()
        }
    };

    Ok(targets.into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    const HOSTS: [&str; 6] = ["web2", "web1", "db1", "_tpl", "_web", "web10"];

    #[test]
    fn test_filter_regex_unanchored() {
        let matched = filter(&HOSTS, "eb1", Matching::Regex).unwrap();
        assert_eq!(matched, vec!["web1", "web10"]);
    }

    #[test]
    fn test_filter_literal_exact() {
        assert_eq!(filter(&HOSTS, "web1", Matching::Literal).unwrap(), vec!["web1"]);
        assert!(filter(&HOSTS, "web", Matching::Literal).unwrap().is_empty());
    }

    #[test]
    fn test_filter_skips_templates() {
        assert!(filter(&HOSTS, "_tpl", Matching::Literal).unwrap().is_empty());
        assert_eq!(
            filter(&HOSTS, "web", Matching::Regex).unwrap(),
            vec!["web2", "web1", "web10"]
        );
    }

    #[test]
    fn test_literal_never_compiles() {
        assert!(filter(&HOSTS, "(", Matching::Literal).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_regex() {
        let err = resolve(&HOSTS, &FilterSpec::regex_and(names(&["web("]))).unwrap_err();
        assert!(matches!(err, MsshError::Pattern { ref pattern, .. } if pattern == "web("));
    }

    #[test]
    fn test_invalid_regex_in_or_mode() {
        let spec = FilterSpec {
            patterns: names(&["web1", "["]),
            composition: Composition::Or,
            matching: Matching::Regex,
        };
        assert!(resolve(&HOSTS, &spec).is_err());
    }

    #[test]
    fn test_and_narrows() {
        let spec = FilterSpec::regex_and(names(&["web", "1"]));
        assert_eq!(resolve(&HOSTS, &spec).unwrap(), names(&["web1", "web10"]));

        let spec = FilterSpec::regex_and(names(&["web", "0$"]));
        assert_eq!(resolve(&HOSTS, &spec).unwrap(), names(&["web10"]));
    }

    #[test]
    fn test_or_pools_against_all_candidates() {
        let spec = FilterSpec {
            patterns: names(&["^web1", "db"]),
            composition: Composition::Or,
            matching: Matching::Regex,
        };
        assert_eq!(resolve(&HOSTS, &spec).unwrap(), names(&["db1", "web1", "web10"]));
    }

    #[test]
    fn test_or_deduplicates_and_sorts() {
        let spec = FilterSpec {
            patterns: names(&["web", "web1", "2"]),
            composition: Composition::Or,
            matching: Matching::Regex,
        };
        assert_eq!(resolve(&HOSTS, &spec).unwrap(), names(&["web1", "web10", "web2"]));

        let spec = FilterSpec::literal_or(names(&["web2", "web1", "web2"]));
        assert_eq!(resolve(&HOSTS, &spec).unwrap(), names(&["web1", "web2"]));
    }

    #[test]
    fn test_zero_filters() {
        assert_eq!(
            resolve(&HOSTS, &FilterSpec::regex_and(vec![])).unwrap(),
            names(&["db1", "web1", "web10", "web2"])
        );
        assert!(resolve(&HOSTS, &FilterSpec::literal_or(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_templates_never_resolve() {
        let specs = [
            FilterSpec::regex_and(vec![]),
            FilterSpec::regex_and(names(&["_"])),
            FilterSpec::regex_and(names(&[".*"])),
            FilterSpec::literal_or(names(&["_tpl", "_web"])),
            FilterSpec {
                patterns: names(&["tpl", "^_"]),
                composition: Composition::Or,
                matching: Matching::Regex,
            },
        ];
        for spec in &specs {
            let resolved = resolve(&HOSTS, spec).unwrap();
            assert!(resolved.iter().all(|n| !n.starts_with('_')), "{:?}", spec);
        }
    }

    #[test]
    fn test_web_scenarios() {
        let hosts = ["web1", "web2", "_tpl"];
        assert_eq!(
            resolve(&hosts, &FilterSpec::regex_and(names(&["web.*"]))).unwrap(),
            names(&["web1", "web2"])
        );
        assert_eq!(
            resolve(&hosts, &FilterSpec::literal_or(names(&["web1", "web2"]))).unwrap(),
            names(&["web1", "web2"])
        );
    }

    #[test]
    fn test_from_fixed_string() {
        let spec = FilterSpec::from_fixed_string(names(&["a"]), true);
        assert_eq!(spec.composition, Composition::Or);
        assert_eq!(spec.matching, Matching::Literal);

        let spec = FilterSpec::from_fixed_string(names(&["a"]), false);
        assert_eq!(spec.composition, Composition::And);
        assert_eq!(spec.matching, Matching::Regex);
    }
}
