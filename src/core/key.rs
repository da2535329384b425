// File: src/core/key.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order-independent fingerprint of a combination.
///
/// One part per variable category, in catalog order. Each part holds the dish
/// names drawn from that category, sorted, so permutations of a multi-draw
/// pick collapse to the same key. Fixed stations never contribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombinationKey(Vec<Vec<String>>);

impl CombinationKey {
    pub fn from_picks<I, P, S>(picks: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts = picks
            .into_iter()
            .map(|part| {
                let mut names: Vec<String> = part.into_iter().map(Into::into).collect();
                names.sort();
                names
            })
            .collect();
        Self(parts)
    }

    pub fn parts(&self) -> &[Vec<String>] {
        &self.0
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|part| part.join(" + ")).collect();
        write!(f, "({})", rendered.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_draw_order_does_not_matter() {
        let ab = CombinationKey::from_picks(vec![vec!["X"], vec!["A", "B"]]);
        let ba = CombinationKey::from_picks(vec![vec!["X"], vec!["B", "A"]]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_category_position_matters() {
        // The same dish name in different categories is a different combination.
        let first = CombinationKey::from_picks(vec![vec!["X"], vec!["Y"]]);
        let second = CombinationKey::from_picks(vec![vec!["Y"], vec!["X"]]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_display() {
        let key = CombinationKey::from_picks(vec![vec!["Rajma"], vec!["Shahi Paneer", "Dum Aloo"]]);
        assert_eq!(key.to_string(), "(Rajma | Dum Aloo + Shahi Paneer)");
    }
}
