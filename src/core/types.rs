// src/core/types.rs
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A dietary marker carried by a dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DietTag {
    Jain,
    Swaminarayan,
}

/// A named dietary restriction mode applied to dish selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum DietProfile {
    #[default]
    None,
    Jain,
    Swaminarayan,
}

impl DietProfile {
    pub const ALL: [DietProfile; 3] = [
        DietProfile::None,
        DietProfile::Jain,
        DietProfile::Swaminarayan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DietProfile::None => "None",
            DietProfile::Jain => "Jain",
            DietProfile::Swaminarayan => "Swaminarayan",
        }
    }
}

impl fmt::Display for DietProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DietProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(DietProfile::None),
            "jain" => Ok(DietProfile::Jain),
            "swaminarayan" => Ok(DietProfile::Swaminarayan),
            other => Err(format!("unknown diet profile '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    #[serde(default)]
    pub tags: BTreeSet<DietTag>,
}

impl Dish {
    pub fn new(name: &str, tags: &[DietTag]) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().copied().collect(),
        }
    }

    pub fn untagged(name: &str) -> Self {
        Self::new(name, &[])
    }
}

/// How a category fills its stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryKind {
    /// Draws `stations.len()` distinct dishes per combination.
    Variable { stations: Vec<String> },
    /// Always serves the same dish at one station.
    Fixed { station: String, dish: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(flatten)]
    pub kind: CategoryKind,
    #[serde(default)]
    pub dishes: Vec<Dish>,
}

impl Category {
    pub fn variable(name: &str, stations: &[&str], dishes: Vec<Dish>) -> Self {
        Self {
            name: name.to_string(),
            kind: CategoryKind::Variable {
                stations: stations.iter().map(|s| s.to_string()).collect(),
            },
            dishes,
        }
    }

    pub fn fixed(name: &str, station: &str, dish: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: CategoryKind::Fixed {
                station: station.to_string(),
                dish: dish.to_string(),
            },
            dishes: Vec::new(),
        }
    }

    /// Number of dishes a combination draws from this category. Zero for fixed categories.
    pub fn arity(&self) -> usize {
        match &self.kind {
            CategoryKind::Variable { stations } => stations.len(),
            CategoryKind::Fixed { .. } => 0,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.kind, CategoryKind::Fixed { .. })
    }
}

/// One serving point and the dish placed at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationDish {
    pub station: String,
    pub dish: String,
}

/// A successfully issued menu. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAssignment {
    pub issued_at: DateTime<FixedOffset>,
    pub profile: DietProfile,
    pub stations: Vec<StationDish>,
}

impl MenuAssignment {
    pub fn dish_at(&self, station: &str) -> Option<&str> {
        self.stations
            .iter()
            .find(|s| s.station == station)
            .map(|s| s.dish.as_str())
    }

    pub fn serves(&self, dish: &str) -> bool {
        self.stations.iter().any(|s| s.dish == dish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parse_is_case_insensitive() {
        assert_eq!("JAIN".parse::<DietProfile>().unwrap(), DietProfile::Jain);
        assert_eq!(" none ".parse::<DietProfile>().unwrap(), DietProfile::None);
        assert_eq!(
            "Swaminarayan".parse::<DietProfile>().unwrap(),
            DietProfile::Swaminarayan
        );
        assert!("vegan".parse::<DietProfile>().is_err());
    }

    #[test]
    fn test_category_arity() {
        let pair = Category::variable("Punjabi", &["Shack 5", "Shack 6"], vec![]);
        let fixed = Category::fixed("Undhiyu", "Shack 2", "Undhiyu");
        assert_eq!(pair.arity(), 2);
        assert_eq!(fixed.arity(), 0);
        assert!(fixed.is_fixed());
    }

    #[test]
    fn test_category_json_shape() {
        let json = r#"{
            "name": "Lentil",
            "kind": "variable",
            "stations": ["Shack 3"],
            "dishes": [{"name": "Rajma", "tags": ["Jain"]}, {"name": "Mix Kathod"}]
        }"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.arity(), 1);
        assert_eq!(category.dishes.len(), 2);
        assert!(category.dishes[0].tags.contains(&DietTag::Jain));
        assert!(category.dishes[1].tags.is_empty());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let json = r#"{"name": "Rajma", "tags": ["Keto"]}"#;
        assert!(serde_json::from_str::<Dish>(json).is_err());
    }
}
