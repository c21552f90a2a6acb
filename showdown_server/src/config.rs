use crate::room::DEFAULT_CHANNEL_CAPACITY;
use crate::showdown::ShowdownEngine;
use crate::variant::{UnknownVariantPolicy, VariantRegistry};
use log::info;
use showdown_protocol::{Chips, ConfigError};
use std::path::PathBuf;

/// Environment variable naming a JSON variants file.
pub const VARIANTS_ENV: &str = "SHOWDOWN_VARIANTS";

const STARTING_STACK: Chips = 1000;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Overlaid on the built-in variant table when set.
    pub variants_path: Option<PathBuf>,
    /// Overrides the policy from the variants file when set.
    pub unknown_variant: Option<UnknownVariantPolicy>,
    pub channel_capacity: usize,
    /// Stack given to players a replayed hand mentions without one.
    pub starting_stack: Chips,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            variants_path: None,
            unknown_variant: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            starting_stack: STARTING_STACK,
        }
    }
}

impl EngineConfig {
    /// Defaults, with the variants path taken from `SHOWDOWN_VARIANTS`.
    pub fn from_env() -> Self {
        Self {
            variants_path: std::env::var_os(VARIANTS_ENV).map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn build_registry(&self) -> Result<VariantRegistry, ConfigError> {
        let mut registry = match &self.variants_path {
            Some(path) => VariantRegistry::load(path)?,
            None => VariantRegistry::default(),
        };
        if let Some(policy) = self.unknown_variant {
            registry.set_unknown_policy(policy);
        }
        info!(
            "Unknown variants will be handled with {:?}",
            registry.unknown_policy()
        );
        Ok(registry)
    }

    pub fn build_engine(&self) -> Result<ShowdownEngine, ConfigError> {
        Ok(ShowdownEngine::new(self.build_registry()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.variants_path.is_none());
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        let registry = config.build_registry().unwrap();
        assert!(registry.contains("plo8"));
        assert_eq!(registry.unknown_policy(), UnknownVariantPolicy::FallbackToHigh);
    }

    #[test]
    fn test_policy_override() {
        let config = EngineConfig {
            unknown_variant: Some(UnknownVariantPolicy::Reject),
            ..Default::default()
        };
        let engine = config.build_engine().unwrap();
        assert_eq!(engine.registry().unknown_policy(), UnknownVariantPolicy::Reject);
    }

    #[test]
    fn test_variants_file_overlay() {
        let path = std::env::temp_dir().join(format!("showdown_variants_{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"unknown_variant": "reject", "variants": {{"five_card_draw": {{"families": [{{"family": "high"}}]}}}}}}"#
        )
        .unwrap();
        drop(file);

        let config = EngineConfig {
            variants_path: Some(path.clone()),
            ..Default::default()
        };
        let registry = config.build_registry().unwrap();
        assert!(registry.contains("five_card_draw"));
        assert!(registry.contains("nlh"));
        assert_eq!(registry.unknown_policy(), UnknownVariantPolicy::Reject);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_variants_file() {
        let config = EngineConfig {
            variants_path: Some(PathBuf::from("/nonexistent/variants.json")),
            ..Default::default()
        };
        assert!(matches!(config.build_registry(), Err(ConfigError::Io(_, _))));
    }
}
