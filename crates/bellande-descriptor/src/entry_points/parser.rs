//! entry_points.txt parser and writer

use crate::types::EntryPoint;
use std::collections::BTreeMap;
use tracing::debug;

/// Parse every entry point in entry_points.txt content, across all groups
pub fn parse_entry_points_txt(content: &str) -> Vec<EntryPoint> {
    let mut entries = Vec::new();
    let mut current_group: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current_group = Some(line[1..line.len() - 1].trim().to_string());
            continue;
        }

        if let Some(ref group) = current_group {
            if let Some(entry) = parse_entry_point_line(line, group) {
                entries.push(entry);
            }
        }
    }

    debug!("Parsed {} entry points from entry_points.txt", entries.len());
    entries
}

/// Entry points of a single group
pub fn entry_points_in_group(content: &str, group: &str) -> Vec<EntryPoint> {
    parse_entry_points_txt(content)
        .into_iter()
        .filter(|ep| ep.group == group)
        .collect()
}

/// Parse a single entry point line in the format: name = module:callable
pub fn parse_entry_point_line(line: &str, group: &str) -> Option<EntryPoint> {
    let (name, value) = line.split_once('=')?;
    let name = name.trim();

    let value = value.trim().trim_matches('"').trim_matches('\'');
    // Drop trailing `[extras]` qualifiers
    let value = value.split('[').next().unwrap_or(value).trim();

    let (module, callable) = value.split_once(':')?;
    let module = module.trim();
    let callable = callable.trim();

    if name.is_empty() || !is_dotted_identifier(module) || !is_dotted_identifier(callable) {
        return None;
    }

    Some(EntryPoint {
        group: group.to_string(),
        name: name.to_string(),
        module: module.to_string(),
        callable: callable.to_string(),
    })
}

fn is_dotted_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Render entry points grouped by section, groups and names sorted
pub fn render_entry_points_txt(entries: &[EntryPoint]) -> String {
    let mut groups: BTreeMap<&str, Vec<&EntryPoint>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.group.as_str()).or_default().push(entry);
    }

    let mut out = String::new();
    for (group, mut members) in groups {
        members.sort_by(|a, b| a.name.cmp(&b.name));
        out.push_str(&format!("[{}]\n", group));
        for entry in members {
            out.push_str(&format!("{} = {}\n", entry.name, entry.target()));
        }
        out.push('\n');
    }
    out
}
