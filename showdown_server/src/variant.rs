use crate::selector::SelectionMode;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use showdown_protocol::{ConfigError, EngineResult, RankingFamily, ShowdownError};
use std::collections::HashMap;
use std::path::Path;

/// One ranking family and the way its hand is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRule {
    pub family: RankingFamily,
    #[serde(default = "default_selection")]
    pub selection: SelectionMode,
}

fn default_selection() -> SelectionMode {
    SelectionMode::Free
}

impl FamilyRule {
    pub fn new(family: RankingFamily, selection: SelectionMode) -> Self {
        Self { family, selection }
    }

    pub fn free(family: RankingFamily) -> Self {
        Self::new(family, SelectionMode::Free)
    }
}

/// How a game variant is ranked at showdown.
///
/// One family takes the whole pot. Two families split every tier: the first
/// family owns `floor(amount / 2)` and the second owns the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub families: Vec<FamilyRule>,
}

impl VariantConfig {
    pub fn single(rule: FamilyRule) -> Self {
        Self {
            families: vec![rule],
        }
    }

    pub fn split(first: FamilyRule, second: FamilyRule) -> Self {
        Self {
            families: vec![first, second],
        }
    }

    /// High-only, free-choice evaluation.
    pub fn high_only() -> Self {
        Self::single(FamilyRule::free(RankingFamily::High))
    }

    pub fn is_split(&self) -> bool {
        self.families.len() == 2
    }

    fn validate(&self, id: &str) -> Result<(), ConfigError> {
        match self.families.len() {
            1 | 2 => Ok(()),
            n => Err(ConfigError::FamilyCount(id.to_string(), n)),
        }
    }
}

/// What to do with a variant identifier missing from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownVariantPolicy {
    /// Use high-only free choice and log a warning.
    #[default]
    FallbackToHigh,
    /// Refuse the showdown with `ShowdownError::UnknownVariant`.
    Reject,
}

/// On-disk shape of a variants file. Entries override the built-in table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantFile {
    #[serde(default)]
    pub unknown_variant: Option<UnknownVariantPolicy>,
    #[serde(default)]
    pub variants: HashMap<String, VariantConfig>,
}

#[derive(Debug, Clone)]
pub struct VariantRegistry {
    variants: HashMap<String, VariantConfig>,
    unknown_policy: UnknownVariantPolicy,
    fallback: VariantConfig,
}

fn normalize(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

impl VariantRegistry {
    pub fn empty(unknown_policy: UnknownVariantPolicy) -> Self {
        Self {
            variants: HashMap::new(),
            unknown_policy,
            fallback: VariantConfig::high_only(),
        }
    }

    /// Registers a variant under each of the given identifiers.
    pub fn register(&mut self, ids: &[&str], config: VariantConfig) -> Result<(), ConfigError> {
        for id in ids {
            config.validate(id)?;
            self.variants.insert(normalize(id), config.clone());
        }
        Ok(())
    }

    pub fn set_unknown_policy(&mut self, policy: UnknownVariantPolicy) {
        self.unknown_policy = policy;
    }

    pub fn unknown_policy(&self) -> UnknownVariantPolicy {
        self.unknown_policy
    }

    pub fn contains(&self, id: &str) -> bool {
        self.variants.contains_key(&normalize(id))
    }

    /// Merges a parsed variants file over the current table.
    pub fn apply(&mut self, file: VariantFile) -> Result<(), ConfigError> {
        if let Some(policy) = file.unknown_variant {
            self.unknown_policy = policy;
        }
        for (id, config) in file.variants {
            config.validate(&id)?;
            self.variants.insert(normalize(&id), config);
        }
        Ok(())
    }

    pub fn apply_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let file: VariantFile = serde_json::from_str(json)?;
        self.apply(file)
    }

    /// Builds the default table and overlays the variants file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
        let mut registry = Self::default();
        registry.apply_json(&json)?;
        info!(
            "Loaded variant table from {} ({} identifiers)",
            path.display(),
            registry.variants.len()
        );
        Ok(registry)
    }

    /// Looks up the ranking configuration for a variant identifier.
    pub fn resolve(&self, id: &str) -> EngineResult<&VariantConfig> {
        if let Some(config) = self.variants.get(&normalize(id)) {
            return Ok(config);
        }
        match self.unknown_policy {
            UnknownVariantPolicy::FallbackToHigh => {
                warn!(
                    "Unknown variant '{}', falling back to high-only free choice",
                    id
                );
                Ok(&self.fallback)
            }
            UnknownVariantPolicy::Reject => Err(ShowdownError::UnknownVariant(id.to_string())),
        }
    }
}

impl Default for VariantRegistry {
    fn default() -> Self {
        use RankingFamily::*;

        let omaha = SelectionMode::OMAHA;
        let table: Vec<(Vec<&str>, VariantConfig)> = vec![
            (
                vec!["nlh", "holdem", "texas_holdem", "flh", "lhe"],
                VariantConfig::high_only(),
            ),
            (
                vec!["plo", "omaha", "plo5"],
                VariantConfig::single(FamilyRule::new(High, omaha)),
            ),
            (
                vec!["plo8", "omaha8", "omaha_hi_lo", "o8"],
                VariantConfig::split(
                    FamilyRule::new(High, omaha),
                    FamilyRule::new(QualifyingLow, omaha),
                ),
            ),
            (vec!["7cs", "stud"], VariantConfig::high_only()),
            (
                vec!["7cs8", "stud8", "stud_hi_lo"],
                VariantConfig::split(FamilyRule::free(High), FamilyRule::free(QualifyingLow)),
            ),
            (
                vec!["razz"],
                VariantConfig::single(FamilyRule::free(AceToFiveLow)),
            ),
            (
                vec!["27td", "2-7", "2-7_triple_draw", "27sd", "stud27", "2-7_stud"],
                VariantConfig::single(FamilyRule::free(DeuceToSevenLow)),
            ),
            (vec!["badugi"], VariantConfig::single(FamilyRule::free(Badugi))),
            (vec!["hidugi"], VariantConfig::single(FamilyRule::free(Hidugi))),
            (
                vec!["baduecey"],
                VariantConfig::split(FamilyRule::free(Badugi), FamilyRule::free(DeuceToSevenLow)),
            ),
            (
                vec!["badacey"],
                VariantConfig::split(FamilyRule::free(Badugi), FamilyRule::free(AceToFiveLow)),
            ),
            // Archie plays here as plain high with an eight-or-better low; the
            // pair-of-nines high qualifier is not modelled.
            (
                vec!["archie"],
                VariantConfig::split(FamilyRule::free(High), FamilyRule::free(QualifyingLow)),
            ),
            (
                vec!["razzdugi"],
                VariantConfig::split(FamilyRule::free(AceToFiveLow), FamilyRule::free(Badugi)),
            ),
        ];

        let mut variants = HashMap::new();
        for (ids, config) in table {
            for id in ids {
                variants.insert(normalize(id), config.clone());
            }
        }

        Self {
            variants,
            unknown_policy: UnknownVariantPolicy::default(),
            fallback: VariantConfig::high_only(),
        }
    }
}
