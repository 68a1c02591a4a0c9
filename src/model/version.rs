use std::{cmp::Ordering, fmt::Display, str::FromStr};

use crate::model::ParseError;

/// A dotted version string with Maven-like ordering.
///
/// Items are split on `.`, `-` and digit/letter transitions. Trailing zero and
/// release items are not significant, so `1`, `1.0` and `1.0.0-final` compare equal.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Number(u64),
    Qualifier(String),
}

impl Item {
    fn is_null(&self) -> bool {
        match self {
            Item::Number(n) => *n == 0,
            Item::Qualifier(q) => q.is_empty(),
        }
    }
}

const RELEASE_RANK: usize = 5;

fn qualifier_rank(qualifier: &str) -> usize {
    match qualifier {
        "alpha" => 0,
        "beta" => 1,
        "milestone" => 2,
        "rc" => 3,
        "snapshot" => 4,
        "" => RELEASE_RANK,
        "sp" => 6,
        _ => 7,
    }
}

fn canonical_qualifier(qualifier: &str) -> String {
    match qualifier {
        "a" => "alpha".to_owned(),
        "b" => "beta".to_owned(),
        "m" => "milestone".to_owned(),
        "cr" => "rc".to_owned(),
        "ga" | "final" | "release" => String::new(),
        other => other.to_owned(),
    }
}

impl Version {
    pub fn parse(s: &str) -> Version {
        let original = s.trim().to_owned();
        let lower = original.to_ascii_lowercase();

        let mut items = Vec::new();
        let mut current = String::new();
        let flush = |current: &mut String, items: &mut Vec<Item>| {
            if current.is_empty() {
                return;
            }
            let item = match current.parse::<u64>() {
                Ok(n) if current.bytes().all(|b| b.is_ascii_digit()) => Item::Number(n),
                _ => Item::Qualifier(canonical_qualifier(current)),
            };
            items.push(item);
            current.clear();
        };

        for c in lower.chars() {
            if c == '.' || c == '-' || c == '_' {
                flush(&mut current, &mut items);
                continue;
            }
            let switches_kind = current
                .chars()
                .last()
                .is_some_and(|last| last.is_ascii_digit() != c.is_ascii_digit());
            if switches_kind {
                flush(&mut current, &mut items);
            }
            current.push(c);
        }
        flush(&mut current, &mut items);

        while items.last().is_some_and(Item::is_null) {
            items.pop();
        }

        Version { original, items }
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

fn compare_items(a: Option<&Item>, b: Option<&Item>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(Item::Number(a)), Some(Item::Number(b))) => a.cmp(b),
        (Some(Item::Number(_)), Some(Item::Qualifier(_))) => Ordering::Greater,
        (Some(Item::Qualifier(_)), Some(Item::Number(_))) => Ordering::Less,
        (Some(Item::Qualifier(a)), Some(Item::Qualifier(b))) => qualifier_rank(a)
            .cmp(&qualifier_rank(b))
            .then_with(|| a.cmp(b)),
        (Some(Item::Number(n)), None) => n.cmp(&0),
        (Some(Item::Qualifier(q)), None) => qualifier_rank(q).cmp(&RELEASE_RANK),
        (None, Some(_)) => compare_items(b, a).reverse(),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        (0..len)
            .map(|i| compare_items(self.items.get(i), other.items.get(i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.original)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

/// One bracketed restriction of a range, e.g. `[1.0,2.0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Restriction {
    pub fn contains(&self, version: &Version) -> bool {
        let above_lower = match &self.lower {
            None => true,
            Some(Bound {
                version: lower,
                inclusive,
            }) => match version.cmp(lower) {
                Ordering::Greater => true,
                Ordering::Equal => *inclusive,
                Ordering::Less => false,
            },
        };
        let below_upper = match &self.upper {
            None => true,
            Some(Bound {
                version: upper,
                inclusive,
            }) => match version.cmp(upper) {
                Ordering::Less => true,
                Ordering::Equal => *inclusive,
                Ordering::Greater => false,
            },
        };
        above_lower && below_upper
    }
}

/// A dependency's version requirement: either a plain version used verbatim,
/// or a union of ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    Soft(Version),
    Ranges(Vec<Restriction>),
}

impl VersionConstraint {
    pub fn is_range(&self) -> bool {
        matches!(self, VersionConstraint::Ranges(_))
    }

    pub fn contains(&self, version: &Version) -> bool {
        match self {
            VersionConstraint::Soft(soft) => soft == version,
            VersionConstraint::Ranges(restrictions) => {
                restrictions.iter().any(|r| r.contains(version))
            }
        }
    }

    /// Highest of `candidates` satisfying the constraint.
    pub fn select<'a>(&self, candidates: impl IntoIterator<Item = &'a Version>) -> Option<&'a Version> {
        candidates.into_iter().filter(|v| self.contains(v)).max()
    }
}

impl FromStr for VersionConstraint {
    type Err = ParseError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ParseError::InvalidVersion {
            spec: spec.to_owned(),
            reason: reason.to_owned(),
        };

        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(invalid("version is empty"));
        }
        if !trimmed.starts_with(['[', '(']) {
            if trimmed.contains(['[', ']', '(', ')', ',']) {
                return Err(invalid("unexpected range characters outside brackets"));
            }
            return Ok(VersionConstraint::Soft(Version::parse(trimmed)));
        }

        let mut restrictions = Vec::new();
        let mut rest = trimmed;
        while !rest.is_empty() {
            let lower_inclusive = match rest.chars().next() {
                Some('[') => true,
                Some('(') => false,
                _ => return Err(invalid("expected `[` or `(`")),
            };
            let close = rest
                .find([']', ')'])
                .ok_or_else(|| invalid("unterminated range"))?;
            let upper_inclusive = rest[close..].starts_with(']');
            let inner = &rest[1..close];
            rest = rest[close + 1..].trim_start();
            rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();

            let restriction = match inner.split_once(',') {
                None => {
                    if !lower_inclusive || !upper_inclusive || inner.trim().is_empty() {
                        return Err(invalid("single version ranges must be of the form [x]"));
                    }
                    let exact = Bound {
                        version: Version::parse(inner),
                        inclusive: true,
                    };
                    Restriction {
                        lower: Some(exact.clone()),
                        upper: Some(exact),
                    }
                }
                Some((lower, upper)) => {
                    if upper.contains(',') {
                        return Err(invalid("too many bounds in range"));
                    }
                    let bound = |s: &str, inclusive: bool| {
                        let s = s.trim();
                        (!s.is_empty()).then(|| Bound {
                            version: Version::parse(s),
                            inclusive,
                        })
                    };
                    let lower = bound(lower, lower_inclusive);
                    let upper = bound(upper, upper_inclusive);
                    if let (Some(lower), Some(upper)) = (&lower, &upper) {
                        let ordering = lower.version.cmp(&upper.version);
                        if ordering.is_gt()
                            || (ordering.is_eq() && !(lower.inclusive && upper.inclusive))
                        {
                            return Err(invalid("lower bound is above upper bound"));
                        }
                    }
                    Restriction { lower, upper }
                }
            };
            restrictions.push(restriction);
        }

        Ok(VersionConstraint::Ranges(restrictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    #[test]
    fn version_ordering() {
        assert!(v("1.0") < v("1.1"));
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.0-alpha-1") < v("1.0-beta"));
        assert!(v("1.0-rc1") < v("1.0"));
        assert!(v("1.0-SNAPSHOT") < v("1.0"));
        assert!(v("1.0") < v("1.0-sp1"));
        assert!(v("1.0") < v("1.0.1"));
        assert!(v("1.0-foo") > v("1.0-sp"));
    }

    #[test]
    fn trailing_zeros_are_insignificant() {
        assert_eq!(v("1"), v("1.0.0"));
        assert_eq!(v("1.0-final"), v("1"));
        assert_eq!(v("2.0.0").as_str(), "2.0.0");
    }

    #[test]
    fn soft_version() {
        let constraint = VersionConstraint::from_str("1.0").unwrap();
        assert!(!constraint.is_range());
        assert!(constraint.contains(&v("1.0")));
        assert!(!constraint.contains(&v("1.1")));
    }

    #[test]
    fn half_open_range() {
        let constraint = VersionConstraint::from_str("[1.0,2.0)").unwrap();
        assert!(constraint.is_range());
        assert!(constraint.contains(&v("1.0")));
        assert!(constraint.contains(&v("1.9.9")));
        assert!(!constraint.contains(&v("2.0")));
        assert!(!constraint.contains(&v("0.9")));
    }

    #[test]
    fn unbounded_and_exact_ranges() {
        let at_least = VersionConstraint::from_str("[1.5,)").unwrap();
        assert!(at_least.contains(&v("99")));
        assert!(!at_least.contains(&v("1.4")));

        let at_most = VersionConstraint::from_str("(,1.0]").unwrap();
        assert!(at_most.contains(&v("0.1")));
        assert!(!at_most.contains(&v("1.0.1")));

        let exact = VersionConstraint::from_str("[1.2]").unwrap();
        assert!(exact.contains(&v("1.2.0")));
        assert!(!exact.contains(&v("1.3")));
    }

    #[test]
    fn union_of_ranges() {
        let constraint = VersionConstraint::from_str("(,1.0],[1.2,)").unwrap();
        assert!(constraint.contains(&v("0.5")));
        assert!(!constraint.contains(&v("1.1")));
        assert!(constraint.contains(&v("1.2")));
    }

    #[test]
    fn select_highest_candidate() {
        let candidates = vec![v("1.0"), v("1.5"), v("2.0"), v("1.10")];
        let constraint = VersionConstraint::from_str("[1.0,2.0)").unwrap();
        assert_eq!(constraint.select(&candidates).map(Version::as_str), Some("1.10"));

        let none = VersionConstraint::from_str("[3.0,)").unwrap();
        assert_eq!(none.select(&candidates), None);
    }

    #[test]
    fn invalid_specifications() {
        for spec in ["", "[1.0", "1.0]", "(1.0)", "[2.0,1.0]", "[1.0,2.0,3.0]", "(1.0,1.0)"] {
            assert!(
                VersionConstraint::from_str(spec).is_err(),
                "{spec} should be rejected"
            );
        }
    }
}
