//! Native entry point registry
//!
//! Console scripts name their callable as a `module:callable` string. The
//! registry binds those strings to Rust functions at startup so a command can
//! be dispatched by name; unknown targets fail immediately.

use crate::entry_points::parser::parse_entry_point_line;
use crate::errors::DescriptorError;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Entry function: receives the full argv (command name first) and returns an exit status
pub type EntryFn = fn(&[String]) -> i32;

#[derive(Clone, Default)]
pub struct EntryPointRegistry {
    entries: BTreeMap<String, EntryFn>,
}

impl fmt::Debug for EntryPointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl EntryPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a `module:callable` target to a function, replacing any previous binding
    pub fn register(&mut self, target: &str, entry: EntryFn) -> Result<(), DescriptorError> {
        let parsed = parse_entry_point_line(&format!("registered = {}", target), "registry")
            .ok_or_else(|| DescriptorError::InvalidEntryPoint(target.to_string()))?;
        debug!("Registering entry point target: {}", parsed.target());
        self.entries.insert(parsed.target(), entry);
        Ok(())
    }

    pub fn contains(&self, target: &str) -> bool {
        self.entries.contains_key(target)
    }

    pub fn resolve(&self, target: &str) -> Result<EntryFn, DescriptorError> {
        self.entries
            .get(target)
            .copied()
            .ok_or_else(|| DescriptorError::EntryPointNotFound {
                target: target.to_string(),
                reason: "no callable registered for this target".to_string(),
            })
    }

    /// Resolve and call a target with the given argv
    pub fn invoke(&self, target: &str, argv: &[String]) -> Result<i32, DescriptorError> {
        let entry = self.resolve(target)?;
        Ok(entry(argv))
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_arg_count(argv: &[String]) -> i32 {
        argv.len() as i32
    }

    fn always_fails(_argv: &[String]) -> i32 {
        2
    }

    #[test]
    fn test_register_and_invoke() {
        let mut registry = EntryPointRegistry::new();
        assert!(registry.register("pkg.api:main", echo_arg_count).is_ok());
        assert!(registry.contains("pkg.api:main"));

        let argv = vec!["api".to_string(), "--flag".to_string()];
        assert!(registry.invoke("pkg.api:main", &argv).is_ok_and(|code| code == 2));
    }

    #[test]
    fn test_unregistered_target_fails_fast() {
        let registry = EntryPointRegistry::new();
        assert!(matches!(
            registry.resolve("pkg.missing:main"),
            Err(DescriptorError::EntryPointNotFound { .. })
        ));
    }

    #[test]
    fn test_register_rejects_malformed_target() {
        let mut registry = EntryPointRegistry::new();
        assert!(matches!(
            registry.register("not-a-target", always_fails),
            Err(DescriptorError::InvalidEntryPoint(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut registry = EntryPointRegistry::new();
        assert!(registry.register("pkg.api:main", echo_arg_count).is_ok());
        assert!(registry.register("pkg.api:main", always_fails).is_ok());
        assert_eq!(registry.len(), 1);
        assert!(registry.invoke("pkg.api:main", &[]).is_ok_and(|code| code == 2));
        assert_eq!(registry.targets().collect::<Vec<_>>(), vec!["pkg.api:main"]);
    }
}
