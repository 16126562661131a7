//! Ranked fuzzy lookup of gazetteer names.

use crate::GazetteerEntry;
use crate::normalize::normalize;
use crate::similarity::weighted_ratio;

/// A gazetteer name proposed as a replacement for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The gazetteer name.
    pub name: String,
    /// Similarity to the query (0-100).
    pub score: u8,
}

/// Ranks a candidate pool against a query.
///
/// Implementations must return at most `limit` candidates, all scoring at
/// least `min_score`, ordered by descending score with ties kept in pool
/// order.
pub trait FuzzyMatcher: Send + Sync {
    /// Returns the best-scoring candidates for `query`.
    fn top_matches(
        &self,
        query: &str,
        pool: &[GazetteerEntry],
        limit: usize,
        min_score: u8,
    ) -> Vec<Candidate>;
}

/// Default matcher scoring with [`weighted_ratio`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatioMatcher;

impl FuzzyMatcher for WeightedRatioMatcher {
    fn top_matches(
        &self,
        query: &str,
        pool: &[GazetteerEntry],
        limit: usize,
        min_score: u8,
    ) -> Vec<Candidate> {
        if limit == 0 {
            return Vec::new();
        }

        let query = normalize(query);
        if query.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(u8, &GazetteerEntry)> = pool
            .iter()
            .filter_map(|entry| {
                let score = weighted_ratio(&query, entry.normalized());
                (score >= min_score).then_some((score, entry))
            })
            .collect();

        // Stable sort keeps pool order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, entry)| Candidate {
                name: entry.name().to_string(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gazetteer;

    fn pool() -> Gazetteer {
        Gazetteer::from_names(["Paris", "Parish", "Pari", "London", "Lyon", "Paria"])
    }

    #[test]
    fn ranks_by_descending_score() {
        let gaz = pool();
        let matches = WeightedRatioMatcher.top_matches("Paris", gaz.entries(), 5, 70);
        let names: Vec<&str> = matches.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(matches[0].name, "Paris");
        assert_eq!(matches[0].score, 100);
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!names.contains(&"London"));
    }

    #[test]
    fn ties_keep_pool_order() {
        let gaz = pool();
        // "Paris" and "Paria" both score 80 against "Parix".
        let matches = WeightedRatioMatcher.top_matches("Parix", gaz.entries(), 6, 0);
        let paris = matches.iter().position(|c| c.name == "Paris").unwrap();
        let paria = matches.iter().position(|c| c.name == "Paria").unwrap();
        assert_eq!(matches[paris].score, 80);
        assert_eq!(matches[paria].score, 80);
        assert!(paris < paria);
    }

    #[test]
    fn respects_limit_and_threshold() {
        let gaz = pool();
        let matches = WeightedRatioMatcher.top_matches("Paris", gaz.entries(), 2, 70);
        assert_eq!(matches.len(), 2);

        let none = WeightedRatioMatcher.top_matches("Kathmandu", gaz.entries(), 5, 70);
        assert!(none.is_empty());
    }

    #[test]
    fn zero_limit_or_blank_query_yields_nothing() {
        let gaz = pool();
        assert!(
            WeightedRatioMatcher
                .top_matches("Paris", gaz.entries(), 0, 0)
                .is_empty()
        );
        assert!(
            WeightedRatioMatcher
                .top_matches("  ", gaz.entries(), 5, 0)
                .is_empty()
        );
    }

    #[test]
    fn partial_name_matches_longer_city() {
        let gaz = Gazetteer::from_names(["Newark", "New York", "Yonkers"]);
        let matches = WeightedRatioMatcher.top_matches("York", gaz.entries(), 1, 70);
        assert_eq!(
            matches,
            vec![Candidate {
                name: "New York".to_string(),
                score: 90,
            }]
        );
    }

    #[test]
    fn gazetteer_candidates_delegates_to_matcher() {
        let gaz = pool();
        let matches = gaz.candidates(&WeightedRatioMatcher, "lyon", 1, 70);
        assert_eq!(
            matches,
            vec![Candidate {
                name: "Lyon".to_string(),
                score: 100,
            }]
        );
    }
}
