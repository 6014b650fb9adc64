use core::str::FromStr;

use indexmap::IndexMap;
use tracing::warn;

use crate::tfidf::TermVector;

/// Cosine similarity of two term vectors.
///
/// Terms missing from one vector count as zero. Returns [`None`] when either vector has zero
/// norm.
///
/// # Examples
///
/// ```
/// use vsmtag::{cosine, TermVector};
///
/// let x: TermVector = [("fox", 1.0), ("crow", 1.0)].into_iter().collect();
/// let y: TermVector = [("fox", 2.0)].into_iter().collect();
/// let z: TermVector = [("fox", 0.0)].into_iter().collect();
///
/// assert!((cosine(&x, &y).unwrap() - 0.5f64.sqrt()).abs() < 1e-12);
/// assert_eq!(None, cosine(&x, &z));
/// ```
pub fn cosine(x: &TermVector, y: &TermVector) -> Option<f64> {
    let norm_x = x.norm();
    let norm_y = y.norm();
    if norm_x == 0.0 || norm_y == 0.0 {
        return None;
    }
    let dot: f64 = x
        .iter()
        .filter_map(|(t, w)| y.get(t).map(|v| w * v))
        .sum();
    Some(dot / (norm_x * norm_y))
}

/// Squared Euclidean distance of two term vectors.
///
/// Terms of `x` are visited first, then the terms found only in `y`.
pub fn euclidean(x: &TermVector, y: &TermVector) -> f64 {
    let shared: f64 = x
        .iter()
        .map(|(t, w)| (w - y.get(t).unwrap_or(0.0)).powi(2))
        .sum();
    let only_y: f64 = y
        .iter()
        .filter(|(t, _)| !x.contains(t))
        .map(|(_, v)| v.powi(2))
        .sum();
    shared + only_y
}

/// Similarity measure used by [`SimilarityMatcher`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Metric {
    /// Higher is better.
    #[default]
    Cosine,

    /// Lower is better.
    Euclidean,
}

impl Metric {
    fn score(&self, x: &TermVector, y: &TermVector) -> Option<f64> {
        match self {
            Self::Cosine => cosine(x, y),
            Self::Euclidean => Some(euclidean(x, y)),
        }
    }

    fn is_better(&self, score: f64, best: f64) -> bool {
        match self {
            Self::Cosine => score > best,
            Self::Euclidean => score < best,
        }
    }
}

impl FromStr for Metric {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            _ => Err("Could not parse a metric value"),
        }
    }
}

/// Best reference document found for a query document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match<'a> {
    pub query: &'a str,
    pub reference: &'a str,
    pub score: f64,
}

/// Finds, for each query document, the most similar reference document.
///
/// # Examples
///
/// ```
/// use vsmtag::{Document, Metric, SimilarityMatcher, TfIdfVectorizer};
///
/// let references = TfIdfVectorizer::new().vectorize(&[
///     Document::new("fox", ["fox", "grapes", "sour"]),
///     Document::new("crow", ["crow", "cheese", "flattery"]),
/// ]);
/// let queries = TfIdfVectorizer::new().vectorize(&[
///     Document::new("q", ["cheese", "crow", "tree"]),
///     Document::new("r", ["sour", "tree"]),
/// ]);
///
/// let matcher = SimilarityMatcher::new(Metric::Cosine);
/// let matches = matcher.match_all(&queries, &references);
/// assert_eq!("crow", matches[0].reference);
/// assert_eq!("fox", matches[1].reference);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SimilarityMatcher {
    metric: Metric,
}

impl SimilarityMatcher {
    pub fn new(metric: Metric) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Returns the identifier and score of the best reference for `query`.
    ///
    /// References are scanned in insertion order and a later one replaces the current best only
    /// when it is strictly better. References with an undefined score are skipped. Returns
    /// [`None`] if no reference has a defined score.
    pub fn most_similar<'a>(
        &self,
        query: &TermVector,
        references: &'a IndexMap<String, TermVector>,
    ) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for (id, reference) in references {
            let Some(score) = self.metric.score(query, reference) else {
                continue;
            };
            if best.map_or(true, |(_, b)| self.metric.is_better(score, b)) {
                best = Some((id.as_str(), score));
            }
        }
        best
    }

    /// Runs [`Self::most_similar`] for every query in insertion order.
    ///
    /// Queries without any defined score are omitted.
    pub fn match_all<'a>(
        &self,
        queries: &'a IndexMap<String, TermVector>,
        references: &'a IndexMap<String, TermVector>,
    ) -> Vec<Match<'a>> {
        let mut matches = Vec::with_capacity(queries.len());
        for (id, query) in queries {
            match self.most_similar(query, references) {
                Some((reference, score)) => matches.push(Match {
                    query: id,
                    reference,
                    score,
                }),
                None => warn!(query = %id, "No reference document has a defined similarity"),
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, f64)]) -> TermVector {
        pairs.iter().copied().collect()
    }

    fn references() -> IndexMap<String, TermVector> {
        let mut refs = IndexMap::new();
        refs.insert("a".to_string(), vector(&[("x", 1.0), ("y", 1.0)]));
        refs.insert("b".to_string(), vector(&[("x", 1.0), ("y", 1.0)]));
        refs.insert("c".to_string(), vector(&[("z", 3.0)]));
        refs
    }

    #[test]
    fn test_cosine_symmetric() {
        let x = vector(&[("a", 1.0), ("b", 2.0)]);
        let y = vector(&[("b", 1.0), ("c", 4.0)]);

        assert_eq!(cosine(&x, &y), cosine(&y, &x));
        assert!((cosine(&x, &x).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_disjoint() {
        let x = vector(&[("a", 1.0)]);
        let y = vector(&[("b", 1.0)]);

        assert_eq!(Some(0.0), cosine(&x, &y));
    }

    #[test]
    fn test_cosine_zero_vector() {
        let x = vector(&[("a", 0.0)]);
        let y = vector(&[("a", 1.0)]);

        assert_eq!(None, cosine(&x, &y));
        assert_eq!(None, cosine(&y, &TermVector::default()));
    }

    #[test]
    fn test_euclidean() {
        let x = vector(&[("a", 1.0), ("b", 2.0)]);
        let y = vector(&[("b", 1.0), ("c", 3.0)]);

        assert_eq!(1.0 + 1.0 + 9.0, euclidean(&x, &y));
        assert_eq!(0.0, euclidean(&x, &x));
    }

    #[test]
    fn test_most_similar_tie_keeps_first() {
        let refs = references();
        let matcher = SimilarityMatcher::new(Metric::Cosine);

        let (id, score) = matcher
            .most_similar(&vector(&[("x", 2.0), ("y", 2.0)]), &refs)
            .unwrap();
        assert_eq!("a", id);
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_most_similar_euclidean_prefers_lower() {
        let refs = references();
        let matcher = SimilarityMatcher::new(Metric::Euclidean);

        let (id, score) = matcher
            .most_similar(&vector(&[("z", 2.0)]), &refs)
            .unwrap();
        assert_eq!("c", id);
        assert_eq!(1.0, score);
    }

    #[test]
    fn test_most_similar_skips_undefined() {
        let mut refs = IndexMap::new();
        refs.insert("zero".to_string(), vector(&[("x", 0.0)]));
        refs.insert("far".to_string(), vector(&[("y", 1.0)]));
        let matcher = SimilarityMatcher::new(Metric::Cosine);

        assert_eq!(
            Some(("far", 0.0)),
            matcher.most_similar(&vector(&[("x", 1.0)]), &refs)
        );
        assert_eq!(None, matcher.most_similar(&TermVector::default(), &refs));
    }

    #[test]
    fn test_match_all_skips_unmatched_queries() {
        let refs = references();
        let mut queries = IndexMap::new();
        queries.insert("q1".to_string(), vector(&[("z", 1.0)]));
        queries.insert("q2".to_string(), vector(&[("x", 0.0)]));
        queries.insert("q3".to_string(), vector(&[("y", 1.0)]));
        let matcher = SimilarityMatcher::new(Metric::Cosine);

        let matches = matcher.match_all(&queries, &refs);
        assert_eq!(
            vec![("q1", "c"), ("q3", "a")],
            matches
                .iter()
                .map(|m| (m.query, m.reference))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_match_all_deterministic() {
        let refs = references();
        let matcher = SimilarityMatcher::new(Metric::Euclidean);

        assert_eq!(
            matcher.match_all(&refs, &refs),
            matcher.match_all(&refs, &refs)
        );
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!(Ok(Metric::Euclidean), "euclidean".parse());
        assert!("manhattan".parse::<Metric>().is_err());
    }
}
