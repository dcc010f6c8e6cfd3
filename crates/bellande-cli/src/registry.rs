//! Native callables behind the distribution's entry points

use crate::motion_api;
use bellande_descriptor::{DescriptorError, EntryPointRegistry};

/// Target of the `bellande_motion_probability_api` console script
pub const MOTION_API_TARGET: &str =
    "bellande_motion_probability.bellande_motion_probability_api:main";

/// Registry with every callable this build provides
pub fn builtin_registry() -> Result<EntryPointRegistry, DescriptorError> {
    let mut registry = EntryPointRegistry::new();
    registry.register(MOTION_API_TARGET, motion_api::entry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor_source;

    #[test]
    fn test_registry_covers_declared_console_script() {
        let Ok(registry) = builtin_registry() else {
            unreachable!("builtin targets must parse");
        };
        assert_eq!(registry.len(), 1);
        let declared = descriptor_source::console_script();
        assert!(declared.is_ok_and(|ep| registry.contains(&ep.target())));
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let Ok(registry) = builtin_registry() else {
            unreachable!("builtin targets must parse");
        };
        assert!(matches!(
            registry.invoke("bellande_motion_probability.other:main", &[]),
            Err(DescriptorError::EntryPointNotFound { .. })
        ));
    }
}
