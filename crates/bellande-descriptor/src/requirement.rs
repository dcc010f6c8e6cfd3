//! Requirement and version-specifier parsing
//!
//! Handles the subset of PEP 508 used by descriptors:
//! `name[extra,...] op version, op version ; marker`

use crate::errors::DescriptorError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

fn requirement_re() -> &'static Regex {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[([^\]]*)\])?\s*(.*)$").ok()
    })
    .as_ref()
    .unwrap_or_else(|| unreachable!("requirement pattern is a valid regex"))
}

fn clause_re() -> &'static Regex {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(===|~=|==|!=|<=|>=|<|>)\s*([A-Za-z0-9.*+!_-]+)$").ok())
        .as_ref()
        .unwrap_or_else(|| unreachable!("clause pattern is a valid regex"))
}

/// Normalize a distribution or extra name (lowercase, runs of `-_.` become `-`)
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('-');
        }
        pending_sep = false;
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Whether a string is a valid distribution name
pub fn is_valid_name(name: &str) -> bool {
    requirement_re()
        .captures(name)
        .is_some_and(|caps| caps.get(0).map(|m| m.as_str()) == caps.get(1).map(|m| m.as_str()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Compatible,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Arbitrary,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "~=" => Operator::Compatible,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<=" => Operator::LessEqual,
            ">=" => Operator::GreaterEqual,
            "<" => Operator::Less,
            ">" => Operator::Greater,
            "===" => Operator::Arbitrary,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Operator::Compatible => "~=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Arbitrary => "===",
        }
    }
}

/// One `op version` clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionClause {
    pub op: Operator,
    pub version: String,
}

impl VersionClause {
    /// Check a dotted release version against this clause.
    ///
    /// Only numeric release segments are compared; `*` wildcards match any
    /// trailing segments.
    pub fn matches(&self, candidate: &str) -> bool {
        if self.op == Operator::Arbitrary {
            return candidate == self.version;
        }
        let (wanted, wildcard) = match self.version.strip_suffix(".*") {
            Some(prefix) => (release_segments(prefix), true),
            None => (release_segments(&self.version), false),
        };
        let have = release_segments(candidate);

        if wildcard {
            let prefix_eq = have.len() >= wanted.len() && have[..wanted.len()] == wanted[..];
            return match self.op {
                Operator::Equal => prefix_eq,
                Operator::NotEqual => !prefix_eq,
                _ => false,
            };
        }

        let ord = compare_release(&have, &wanted);
        match self.op {
            Operator::Equal => ord == Ordering::Equal,
            Operator::NotEqual => ord != Ordering::Equal,
            Operator::LessEqual => ord != Ordering::Greater,
            Operator::GreaterEqual => ord != Ordering::Less,
            Operator::Less => ord == Ordering::Less,
            Operator::Greater => ord == Ordering::Greater,
            Operator::Compatible => {
                let prefix_len = wanted.len().saturating_sub(1).max(1);
                ord != Ordering::Less
                    && have.len() >= prefix_len
                    && have[..prefix_len] == wanted[..prefix_len]
            }
            Operator::Arbitrary => false,
        }
    }
}

impl fmt::Display for VersionClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

fn release_segments(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map_while(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u64>().ok()
        })
        .collect()
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Parse a comma-separated specifier set such as `>=3.0, <4`
pub fn parse_specifier_set(input: &str) -> Option<Vec<VersionClause>> {
    let input = input.trim();
    let input = input
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(input)
        .trim();
    if input.is_empty() {
        return Some(Vec::new());
    }

    input
        .split(',')
        .map(|clause| {
            let caps = clause_re().captures(clause.trim())?;
            Some(VersionClause {
                op: Operator::parse(caps.get(1)?.as_str())?,
                version: caps.get(2)?.as_str().to_string(),
            })
        })
        .collect()
}

/// Interpreter version constraint (`requires-python`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonRequirement {
    pub clauses: Vec<VersionClause>,
}

impl PythonRequirement {
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        match parse_specifier_set(input) {
            Some(clauses) if !clauses.is_empty() => Ok(Self { clauses }),
            _ => Err(DescriptorError::InvalidPythonRequirement(input.to_string())),
        }
    }

    pub fn allows(&self, version: &str) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }
}

impl fmt::Display for PythonRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.clauses.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// A parsed dependency requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub specifiers: Vec<VersionClause>,
    pub marker: Option<String>,
}

impl Requirement {
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        let invalid = || DescriptorError::InvalidRequirement(input.to_string());

        let (spec, marker) = match input.split_once(';') {
            Some((spec, marker)) => (spec.trim(), Some(marker.trim().to_string())),
            None => (input.trim(), None),
        };
        if marker.as_deref().is_some_and(str::is_empty) {
            return Err(invalid());
        }

        let caps = requirement_re().captures(spec).ok_or_else(invalid)?;
        let name = caps.get(1).ok_or_else(invalid)?.as_str().to_string();

        let mut extras = Vec::new();
        if let Some(raw) = caps.get(2) {
            for extra in raw.as_str().split(',') {
                let extra = extra.trim();
                if extra.is_empty() || !is_valid_name(extra) {
                    return Err(invalid());
                }
                extras.push(extra.to_string());
            }
        }

        let rest = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        let specifiers = parse_specifier_set(rest).ok_or_else(invalid)?;

        Ok(Self {
            name,
            extras,
            specifiers,
            marker,
        })
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let clauses: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        write!(f, "{}", clauses.join(","))?;
        if let Some(ref marker) = self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_requirement() {
        let req = Requirement::parse("numpy");
        assert!(req.is_ok());
        let req = req.unwrap_or_else(|_| unreachable!());
        assert_eq!(req.name, "numpy");
        assert!(req.extras.is_empty());
        assert!(req.specifiers.is_empty());
        assert_eq!(req.to_string(), "numpy");
    }

    #[test]
    fn test_parse_requirement_with_extras_and_specifiers() {
        let req = Requirement::parse("pytest-cov[all] >= 4.0, <6 ; python_version >= \"3.8\"")
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(req.name, "pytest-cov");
        assert_eq!(req.extras, vec!["all".to_string()]);
        assert_eq!(req.specifiers.len(), 2);
        assert_eq!(req.specifiers[0].op, Operator::GreaterEqual);
        assert_eq!(req.marker.as_deref(), Some("python_version >= \"3.8\""));
        assert_eq!(
            req.to_string(),
            "pytest-cov[all]>=4.0,<6; python_version >= \"3.8\""
        );
    }

    #[test]
    fn test_parse_invalid_requirements() {
        for bad in ["", "-numpy", "numpy >>> 1", "numpy[", "numpy[a,,b]", "numpy;"] {
            assert!(
                matches!(
                    Requirement::parse(bad),
                    Err(DescriptorError::InvalidRequirement(_))
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Pytest_Cov"), "pytest-cov");
        assert_eq!(normalize_name("bellande__motion.probability"), "bellande-motion-probability");
        assert_eq!(normalize_name("numpy"), "numpy");
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("bellande_motion_probability"));
        assert!(is_valid_name("a"));
        assert!(!is_valid_name("bad name"));
        assert!(!is_valid_name("trailing-"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_python_requirement_open_upper_bound() {
        let req = PythonRequirement::parse(">=3.0").unwrap_or_else(|e| unreachable!("{e}"));
        assert!(req.allows("3.0"));
        assert!(req.allows("3.12.1"));
        assert!(req.allows("4.0"));
        assert!(!req.allows("2.7.18"));
        assert_eq!(req.to_string(), ">=3.0");
    }

    #[test]
    fn test_python_requirement_rejects_garbage() {
        assert!(PythonRequirement::parse("three").is_err());
        assert!(PythonRequirement::parse("").is_err());
    }

    #[test]
    fn test_compatible_and_wildcard_clauses() {
        let compat = parse_specifier_set("~=1.4.2").unwrap_or_default();
        assert!(compat[0].matches("1.4.9"));
        assert!(!compat[0].matches("1.5.0"));
        assert!(!compat[0].matches("1.4.1"));

        let wildcard = parse_specifier_set("==3.*").unwrap_or_default();
        assert!(wildcard[0].matches("3.11"));
        assert!(!wildcard[0].matches("2.7"));
    }
}
