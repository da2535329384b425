// File: src/core/diet.rs
use crate::core::types::{Category, DietProfile, DietTag, Dish};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Maps each diet profile to the tags that make a dish eligible for it.
/// `None` never filters. A restricted profile with no entry admits nothing;
/// `validate` rejects such rules at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietRules {
    accepted: HashMap<DietProfile, BTreeSet<DietTag>>,
}

impl DietRules {
    pub fn empty() -> Self {
        Self {
            accepted: HashMap::new(),
        }
    }

    pub fn with_profile(mut self, profile: DietProfile, tags: &[DietTag]) -> Self {
        if profile != DietProfile::None {
            self.accepted.insert(profile, tags.iter().copied().collect());
        }
        self
    }

    /// Tags accepted for a restricted `profile`. Always `None` for `DietProfile::None`.
    pub fn accepted_tags(&self, profile: DietProfile) -> Option<&BTreeSet<DietTag>> {
        if profile == DietProfile::None {
            return None;
        }
        self.accepted.get(&profile)
    }

    pub fn admits(&self, dish: &Dish, profile: DietProfile) -> bool {
        if profile == DietProfile::None {
            return true;
        }
        match self.accepted.get(&profile) {
            Some(tags) => dish.tags.iter().any(|t| tags.contains(t)),
            None => false,
        }
    }

    /// Restricted profiles that have no tag set.
    pub fn missing_profiles(&self) -> Vec<DietProfile> {
        DietProfile::ALL
            .into_iter()
            .filter(|&p| p != DietProfile::None && !self.accepted.contains_key(&p))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.missing_profiles().first() {
            Some(&profile) => Err(ConfigError::MissingDietRule(profile)),
            None => Ok(()),
        }
    }

    /// Projects a category's dish list down to the dishes eligible under `profile`.
    /// Keeps catalog order. An empty result is a normal outcome.
    pub fn eligible<'a>(&self, category: &'a Category, profile: DietProfile) -> Vec<&'a Dish> {
        category
            .dishes
            .iter()
            .filter(|dish| self.admits(dish, profile))
            .collect()
    }
}

impl Default for DietRules {
    /// Jain-safe dishes are also Swaminarayan-safe, so the Jain set nests inside it.
    fn default() -> Self {
        Self::empty()
            .with_profile(DietProfile::Jain, &[DietTag::Jain])
            .with_profile(
                DietProfile::Swaminarayan,
                &[DietTag::Swaminarayan, DietTag::Jain],
            )
    }
}
