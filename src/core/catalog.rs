// File: src/core/catalog.rs
use crate::core::diet::DietRules;
use crate::core::key::CombinationKey;
use crate::core::types::{Category, CategoryKind, DietProfile, DietTag, Dish};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// The static dish catalog. Loaded once, never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigError> {
        let catalog = Self { categories };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog: Catalog = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::InvalidCatalog("no categories".into()));
        }
        let mut stations = HashSet::new();
        for category in &self.categories {
            match &category.kind {
                CategoryKind::Variable { stations: labels } => {
                    if labels.is_empty() {
                        return Err(ConfigError::InvalidCatalog(format!(
                            "category '{}' has no stations",
                            category.name
                        )));
                    }
                    if category.dishes.len() < labels.len() {
                        return Err(ConfigError::InvalidCatalog(format!(
                            "category '{}' has {} dishes for {} stations",
                            category.name,
                            category.dishes.len(),
                            labels.len()
                        )));
                    }
                    for label in labels {
                        if !stations.insert(label.as_str()) {
                            return Err(ConfigError::InvalidCatalog(format!(
                                "station '{}' assigned twice",
                                label
                            )));
                        }
                    }
                }
                CategoryKind::Fixed { station, .. } => {
                    if !stations.insert(station.as_str()) {
                        return Err(ConfigError::InvalidCatalog(format!(
                            "station '{}' assigned twice",
                            station
                        )));
                    }
                }
            }
            let mut names = HashSet::new();
            for dish in &category.dishes {
                if !names.insert(dish.name.as_str()) {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "dish '{}' listed twice in '{}'",
                        dish.name, category.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Filters every variable category for `profile`.
    pub fn view<'a>(&'a self, rules: &DietRules, profile: DietProfile) -> CatalogView<'a> {
        let entries = self
            .categories
            .iter()
            .map(|category| ViewEntry {
                category,
                eligible: if category.is_fixed() {
                    Vec::new()
                } else {
                    rules.eligible(category, profile)
                },
            })
            .collect();
        CatalogView { profile, entries }
    }

    /// The reference shack layout: one Gujarati curry, Undhiyu, one lentil curry,
    /// Chole, and two distinct Punjabi curries.
    pub fn default_shack() -> Self {
        use DietTag::{Jain, Swaminarayan};
        let both: &[DietTag] = &[Jain, Swaminarayan];
        let swami: &[DietTag] = &[Swaminarayan];

        let gujarati = vec![
            Dish::new("Bhindi Capsicums", both),
            Dish::new("Bhindi Potato Masala", swami),
            Dish::new("Bhindi Masala", both),
            Dish::new("Cauliflower Peas Potato", swami),
            Dish::new("Cauliflower Peas Tomato", both),
            Dish::new("Cauliflower Potato Tomato", swami),
            Dish::new("Eggplant Lilva/Eggplant Toover", both),
            Dish::new("Eggplant Potato", swami),
            Dish::new("Eggplant Potato Raviya", swami),
            Dish::new("Potato Rasa", swami),
            Dish::new("Potato Tomato", swami),
            Dish::new("Tindora Potato", swami),
            Dish::new("Tindora Masala", both),
            Dish::new("Tindora Dry", both),
            Dish::new("Turiya Patra", both),
        ];
        let punjabi = vec![
            Dish::untagged("Baingan Bharta"),
            Dish::new("Dum Aloo", swami),
            Dish::untagged("Dal Makhani"),
            Dish::new("Dal Fry", both),
            Dish::new("Tadka Dal", both),
            Dish::new("Malai Kofta", swami),
            Dish::new("Methi Mutter Malai", both),
            Dish::untagged("Vegetable Korma"),
            Dish::new("Kaju Corn", both),
            Dish::new("Kaju Khoya", both),
            Dish::new("Shahi Paneer", swami),
            Dish::new("Palak Paneer", both),
            Dish::untagged("Kadai Paneer"),
            Dish::new("Mutter Paneer", both),
            Dish::new("Paneer Tikka", swami),
            Dish::untagged("Paneer Angara"),
            Dish::untagged("Paneer Chettinad"),
            Dish::new("Paneer Bhurji", swami),
            Dish::untagged("Paneer Pasanda"),
        ];
        let lentil = vec![
            Dish::new("Vaal/Lima Beans", both),
            Dish::new("Mix Kathod", both),
            Dish::new("Moong Rasa", both),
            Dish::new("Sprouted Moong", both),
            Dish::new("Rajma", swami),
            Dish::new("Black Chana", both),
            Dish::new("Red Chori", both),
            Dish::new("White Chori", both),
        ];

        Self {
            categories: vec![
                Category::variable("Gujarati Curry", &["Shack 1"], gujarati),
                Category::fixed("Undhiyu", "Shack 2", "Undhiyu"),
                Category::variable("Lentil Curry", &["Shack 3"], lentil),
                Category::fixed("Chole", "Shack 4", "Chole"),
                Category::variable("Punjabi Curry", &["Shack 5", "Shack 6"], punjabi),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_shack()
    }
}

#[derive(Debug, Clone)]
pub struct ViewEntry<'a> {
    pub category: &'a Category,
    /// Empty for fixed categories.
    pub eligible: Vec<&'a Dish>,
}

/// The catalog as seen through one diet profile.
#[derive(Debug, Clone)]
pub struct CatalogView<'a> {
    pub profile: DietProfile,
    pub entries: Vec<ViewEntry<'a>>,
}

/// A variable category that cannot fill its stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub category: String,
    pub eligible: usize,
    pub required: usize,
}

impl<'a> CatalogView<'a> {
    /// First variable category whose eligible list is smaller than its arity.
    pub fn shortfall(&self) -> Option<Shortfall> {
        self.variable_entries()
            .find(|entry| entry.eligible.len() < entry.category.arity())
            .map(|entry| Shortfall {
                category: entry.category.name.clone(),
                eligible: entry.eligible.len(),
                required: entry.category.arity(),
            })
    }

    pub fn variable_entries(&self) -> impl Iterator<Item = &ViewEntry<'a>> {
        self.entries.iter().filter(|entry| !entry.category.is_fixed())
    }

    /// Number of distinct combination keys reachable under this view.
    pub fn combination_count(&self) -> u128 {
        self.variable_entries()
            .map(|entry| binomial(entry.eligible.len(), entry.category.arity()))
            .fold(1u128, |acc, n| acc.saturating_mul(n))
    }

    /// True when every pick in `key` fits its category's arity and is eligible
    /// under this view. Keys issued under a stricter profile are reachable from
    /// a looser one, and the reverse is not always true.
    pub fn reaches(&self, key: &CombinationKey) -> bool {
        let parts = key.parts();
        self.variable_entries().count() == parts.len()
            && self.variable_entries().zip(parts).all(|(entry, part)| {
                part.len() == entry.category.arity()
                    && part
                        .iter()
                        .all(|name| entry.eligible.iter().any(|d| &d.name == name))
            })
    }

    /// Every combination key reachable under this view, in catalog order.
    #[cfg(test)]
    pub fn all_keys(&self) -> Vec<CombinationKey> {
        let mut partials: Vec<Vec<Vec<&str>>> = vec![Vec::new()];
        for entry in self.variable_entries() {
            let names: Vec<&str> = entry.eligible.iter().map(|d| d.name.as_str()).collect();
            let picks = k_subsets(&names, entry.category.arity());
            let mut next = Vec::with_capacity(partials.len() * picks.len());
            for partial in &partials {
                for pick in &picks {
                    let mut extended = partial.clone();
                    extended.push(pick.clone());
                    next.push(extended);
                }
            }
            partials = next;
        }
        partials
            .into_iter()
            .map(CombinationKey::from_picks)
            .collect()
    }
}

fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
    }
    result
}

#[cfg(test)]
fn k_subsets<'s>(items: &[&'s str], k: usize) -> Vec<Vec<&'s str>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, &head) in items.iter().enumerate() {
        for mut rest in k_subsets(&items[i + 1..], k - 1) {
            rest.insert(0, head);
            out.push(rest);
        }
    }
    out
}

/// Two variable categories: {X, Y} for one station and {P, Q, R} drawn as a pair.
#[cfg(test)]
pub(crate) fn tiny_catalog() -> Catalog {
    Catalog::new(vec![
        Category::variable(
            "CategoryA",
            &["Station A"],
            vec![Dish::untagged("X"), Dish::untagged("Y")],
        ),
        Category::variable(
            "CategoryB",
            &["Station B1", "Station B2"],
            vec![Dish::untagged("P"), Dish::untagged("Q"), Dish::untagged("R")],
        ),
    ])
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(3, 2), 3);
        assert_eq!(binomial(19, 2), 171);
        assert_eq!(binomial(2, 3), 0);
        assert_eq!(binomial(5, 0), 1);
    }

    #[test]
    fn test_tiny_catalog_has_six_keys() {
        let catalog = tiny_catalog();
        let view = catalog.view(&DietRules::default(), DietProfile::None);
        assert_eq!(view.combination_count(), 6);
        let keys = view.all_keys();
        assert_eq!(keys.len(), 6);
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_reaches_matches_enumeration() {
        let catalog = Catalog::default_shack();
        let rules = DietRules::default();
        let none = catalog.view(&rules, DietProfile::None);
        let jain = catalog.view(&rules, DietProfile::Jain);

        let jain_keys = jain.all_keys();
        assert!(!jain_keys.is_empty());
        assert!(jain_keys.iter().all(|k| jain.reaches(k) && none.reaches(k)));
        let reached = none.all_keys().iter().filter(|k| jain.reaches(k)).count();
        assert_eq!(reached, jain_keys.len());
    }

    #[test]
    fn test_reaches_rejects_foreign_shapes() {
        let catalog = tiny_catalog();
        let view = catalog.view(&DietRules::default(), DietProfile::None);
        assert!(view.reaches(&CombinationKey::from_picks(vec![vec!["X"], vec!["R", "P"]])));
        assert!(!view.reaches(&CombinationKey::from_picks(vec![vec!["X"], vec!["P"]])));
        assert!(!view.reaches(&CombinationKey::from_picks(vec![vec!["Z"], vec!["P", "Q"]])));
        assert!(!view.reaches(&CombinationKey::from_picks(vec![vec!["X"]])));
    }

    #[test]
    fn test_default_shack_capacity() {
        let catalog = Catalog::default_shack();
        let view = catalog.view(&DietRules::default(), DietProfile::None);
        assert_eq!(view.combination_count(), 15 * 8 * 171);
        assert!(view.shortfall().is_none());
    }

    #[test]
    fn test_default_shack_feasible_for_every_profile() {
        let catalog = Catalog::default_shack();
        let rules = DietRules::default();
        for profile in DietProfile::ALL {
            assert!(catalog.view(&rules, profile).shortfall().is_none(), "{}", profile);
        }
    }

    #[test]
    fn test_shortfall_reports_category() {
        let catalog = Catalog::new(vec![Category::variable(
            "Pair",
            &["S1", "S2"],
            vec![Dish::new("Only", &[DietTag::Jain]), Dish::untagged("Other")],
        )])
        .unwrap();
        let view = catalog.view(&DietRules::default(), DietProfile::Jain);
        let shortfall = view.shortfall().unwrap();
        assert_eq!(shortfall.category, "Pair");
        assert_eq!(shortfall.eligible, 1);
        assert_eq!(shortfall.required, 2);
        assert_eq!(view.combination_count(), 0);
        assert!(view.all_keys().is_empty());
    }

    #[test]
    fn test_validation_rejects_duplicate_station() {
        let result = Catalog::new(vec![
            Category::fixed("Undhiyu", "Shack 2", "Undhiyu"),
            Category::fixed("Chole", "Shack 2", "Chole"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidCatalog(_))));
    }

    #[test]
    fn test_validation_rejects_duplicate_dish() {
        let result = Catalog::new(vec![Category::variable(
            "Lentil",
            &["Shack 3"],
            vec![Dish::untagged("Rajma"), Dish::untagged("Rajma")],
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let json = serde_json::to_string_pretty(&tiny_catalog()).unwrap();
        fs::write(&path, json).unwrap();

        let loaded = Catalog::from_json_file(&path).unwrap();
        assert_eq!(loaded, tiny_catalog());
    }
}
