//! Dependency set resolution
//!
//! Selects the requirements an install needs: runtime requirements always,
//! extras only when requested. Concrete version selection against a package
//! index is outside this crate; the resolved set is what gets recorded.

use crate::errors::DescriptorError;
use crate::requirement::{normalize_name, Requirement};
use crate::types::DependencySpec;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

/// Why a requirement is part of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "extra", rename_all = "lowercase")]
pub enum Origin {
    Runtime,
    Extra(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRequirement {
    pub requirement: Requirement,
    pub origin: Origin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub requirements: Vec<ResolvedRequirement>,
}

impl Resolution {
    pub fn names(&self) -> Vec<String> {
        self.requirements
            .iter()
            .map(|r| r.requirement.name.clone())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        let wanted = normalize_name(name);
        self.requirements
            .iter()
            .any(|r| r.requirement.normalized_name() == wanted)
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl DependencySpec {
    /// Every requirement string, runtime first then extras in name order
    pub fn all_requirements(&self) -> impl Iterator<Item = &String> {
        self.runtime
            .iter()
            .chain(self.extras.values().flat_map(|members| members.iter()))
    }

    pub fn extra_names(&self) -> Vec<String> {
        self.extras.keys().cloned().collect()
    }

    fn find_extra(&self, extra: &str) -> Option<(&String, &Vec<String>)> {
        let wanted = normalize_name(extra);
        self.extras
            .iter()
            .find(|(name, _)| normalize_name(name) == wanted)
    }

    /// Resolve runtime requirements plus the selected extras.
    ///
    /// The result keeps declaration order and drops repeated distributions
    /// (first occurrence wins). Unknown extras are an error.
    pub fn resolve(&self, extras: &[String]) -> Result<Resolution, DescriptorError> {
        let mut selected = Vec::new();
        for extra in extras {
            let (name, members) =
                self.find_extra(extra)
                    .ok_or_else(|| DescriptorError::UnknownExtra {
                        extra: extra.clone(),
                        available: self.available_extras(),
                    })?;
            if !selected.iter().any(|(n, _)| *n == name) {
                selected.push((name, members));
            }
        }

        let mut seen = HashSet::new();
        let mut resolution = Resolution::default();

        let runtime = self.runtime.iter().map(|r| (r, Origin::Runtime));
        let optional = selected.iter().flat_map(|(name, members)| {
            members
                .iter()
                .map(move |r| (r, Origin::Extra((*name).clone())))
        });

        for (raw, origin) in runtime.chain(optional) {
            let requirement = Requirement::parse(raw)?;
            if seen.insert(requirement.normalized_name()) {
                resolution
                    .requirements
                    .push(ResolvedRequirement { requirement, origin });
            }
        }

        debug!(
            "Resolved {} requirements (extras: {:?})",
            resolution.len(),
            extras
        );
        Ok(resolution)
    }

    fn available_extras(&self) -> String {
        if self.extras.is_empty() {
            "none".to_string()
        } else {
            self.extra_names().join(", ")
        }
    }

    /// Rebuild a dependency spec from core-metadata `Requires-Dist` lines.
    ///
    /// Lines carrying an `extra == "<name>"` marker go to that extra; the
    /// marker is stripped.
    pub fn from_requires_dist(requires_dist: &[String], provides_extra: &[String]) -> Self {
        let mut spec = DependencySpec::default();
        for extra in provides_extra {
            spec.extras.entry(extra.clone()).or_default();
        }
        for line in requires_dist {
            match split_extra_marker(line) {
                Some((requirement, extra)) => {
                    spec.extras.entry(extra).or_default().push(requirement);
                }
                None => spec.runtime.push(line.trim().to_string()),
            }
        }
        spec
    }
}

fn extra_clause_re() -> &'static Regex {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\bextra\s*==\s*["']([^"']+)["']"#).ok())
        .as_ref()
        .unwrap_or_else(|| unreachable!("extra clause pattern is a valid regex"))
}

/// Split `req; <marker>` into the requirement without its `extra == "<x>"`
/// clause and the extra name. Any remaining marker stays on the requirement.
fn split_extra_marker(line: &str) -> Option<(String, String)> {
    let (requirement, marker) = line.split_once(';')?;
    let marker = marker.trim();
    let caps = extra_clause_re().captures(marker)?;
    let clause = caps.get(0)?;
    let extra = caps.get(1)?.as_str().trim();
    if extra.is_empty() {
        return None;
    }

    let before = marker[..clause.start()].trim_end();
    let after = marker[clause.end()..].trim_start();
    let rest = match (before.strip_suffix("and"), after.strip_prefix("and")) {
        (Some(head), _) => format!("{} {}", head.trim_end(), after),
        (None, Some(tail)) => format!("{} {}", before, tail.trim_start()),
        (None, None) => format!("{} {}", before, after),
    };
    let rest = strip_outer_parens(rest.trim());

    let requirement = requirement.trim();
    let requirement = if rest.is_empty() {
        requirement.to_string()
    } else {
        format!("{}; {}", requirement, rest)
    };
    Some((requirement, extra.to_string()))
}

/// `(a and b)` -> `a and b` when the outer parentheses enclose everything
fn strip_outer_parens(marker: &str) -> &str {
    let Some(inner) = marker.strip_prefix('(').and_then(|m| m.strip_suffix(')')) else {
        return marker;
    };
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return marker;
                }
            }
            _ => {}
        }
    }
    if depth == 0 {
        inner.trim()
    } else {
        marker
    }
}
