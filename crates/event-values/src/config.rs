//! Registry configuration.

use serde::{Deserialize, Serialize};

use crate::flags::ResolveFlags;

/// Configuration for an [`EventValueRegistry`](crate::EventValueRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Flags used by queries that do not pass their own
    pub default_flags: ResolveFlags,
    /// Memoize resolutions until the next registration change
    pub cache_resolutions: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_flags: ResolveFlags::DEFAULT,
            cache_resolutions: true,
        }
    }
}

impl RegistryConfig {
    /// Default config with resolution caching turned off.
    #[must_use]
    pub fn uncached() -> Self {
        Self {
            cache_resolutions: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.default_flags, ResolveFlags::DEFAULT);
        assert!(config.cache_resolutions);
        assert!(!RegistryConfig::uncached().cache_resolutions);
    }

    #[test]
    fn json_round_trip() {
        let config = RegistryConfig {
            default_flags: ResolveFlags::ALLOW_CONVERSION,
            cache_resolutions: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: RegistryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: RegistryConfig = serde_json::from_str(r#"{ "cache_resolutions": false }"#).unwrap();
        assert_eq!(config.default_flags, ResolveFlags::DEFAULT);
        assert!(!config.cache_resolutions);

        let empty: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, RegistryConfig::default());
    }
}
