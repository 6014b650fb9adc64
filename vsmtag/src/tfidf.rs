use core::str::FromStr;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use tracing::debug;

use crate::document::Document;
use crate::errors::{Result, VsmtagError};
use crate::utils::Counter;

/// Default `alpha` of [`Weighting::Augmented`].
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Sparse term weights of one document, in first-occurrence order of the terms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TermVector(IndexMap<String, f64>);

impl TermVector {
    pub fn get(&self, term: &str) -> Option<f64> {
        self.0.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(t, &w)| (t.as_str(), w))
    }

    /// Returns the L2 norm.
    pub fn norm(&self) -> f64 {
        self.0.values().map(|w| w.powi(2)).sum::<f64>().sqrt()
    }
}

impl<S> FromIterator<(S, f64)> for TermVector
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(t, w)| (t.into(), w)).collect())
    }
}

/// Counts the terms of every document, keyed by document identifier.
///
/// A later document with an already seen identifier replaces the earlier counts but keeps the
/// earlier position.
pub fn term_frequencies(documents: &[Document]) -> IndexMap<String, Counter<String>> {
    let mut tfs = IndexMap::new();
    for doc in documents {
        let counts: Counter<String> = doc.tokens().iter().cloned().collect();
        tfs.insert(doc.id().to_string(), counts);
    }
    tfs
}

/// Counts, for every term, the number of documents it occurs in.
pub fn document_frequencies(documents: &[Document]) -> HashMap<String, usize> {
    let mut dfs = HashMap::new();
    for doc in documents {
        let terms: HashSet<&str> = doc.tokens().iter().map(String::as_str).collect();
        for term in terms {
            *dfs.entry_ref(term).or_insert(0) += 1;
        }
    }
    dfs
}

/// Term weighting scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Weighting {
    /// `tf * ln(N / df)`.
    #[default]
    TfIdf,

    /// `1 + ln(w)` of the TF-IDF weight `w` when it is positive, `0` otherwise.
    Sublinear,

    /// `alpha + (1 - alpha) * w / max_w` of the TF-IDF weight `w` within each document.
    Augmented { alpha: f64 },
}

impl Weighting {
    /// Creates [`Weighting::Augmented`].
    ///
    /// # Errors
    ///
    /// If `alpha` is not within `[0, 1]`, an error variant will be returned.
    pub fn augmented(alpha: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(VsmtagError::invalid_argument(
                "alpha",
                format!("must be in [0, 1], got {alpha}"),
            ));
        }
        Ok(Self::Augmented { alpha })
    }

    fn apply(&self, vector: &mut IndexMap<String, f64>) {
        match *self {
            Self::TfIdf => (),
            Self::Sublinear => {
                for w in vector.values_mut() {
                    *w = if *w > 0.0 { 1.0 + w.ln() } else { 0.0 };
                }
            }
            Self::Augmented { alpha } => {
                let max = vector.values().copied().fold(0.0, f64::max);
                if max <= 0.0 {
                    return;
                }
                for w in vector.values_mut() {
                    *w = alpha + (1.0 - alpha) * *w / max;
                }
            }
        }
    }
}

impl FromStr for Weighting {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tfidf" => Ok(Self::TfIdf),
            "sublinear" => Ok(Self::Sublinear),
            "augmented" => Ok(Self::Augmented {
                alpha: DEFAULT_ALPHA,
            }),
            _ => Err("Could not parse a weighting value"),
        }
    }
}

/// Converts documents into TF-IDF term vectors.
///
/// # Examples
///
/// ```
/// use vsmtag::{Document, TfIdfVectorizer};
///
/// let docs = vec![
///     Document::new("a", ["the", "fox", "the"]),
///     Document::new("b", ["the", "crow"]),
/// ];
/// let vectors = TfIdfVectorizer::new().vectorize(&docs);
///
/// assert_eq!(Some(0.0), vectors["a"].get("the"));
/// assert_eq!(Some(2f64.ln()), vectors["a"].get("fox"));
/// assert_eq!(None, vectors["a"].get("crow"));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TfIdfVectorizer {
    weighting: Weighting,
}

impl TfIdfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Builds one term vector per distinct document identifier.
    ///
    /// The number of documents `N` is the number of distinct identifiers.
    pub fn vectorize(&self, documents: &[Document]) -> IndexMap<String, TermVector> {
        let tfs = term_frequencies(documents);
        let dfs = document_frequencies(documents);
        let n_docs = tfs.len() as f64;
        debug!(
            documents = tfs.len(),
            vocabulary = dfs.len(),
            "Computing TF-IDF vectors"
        );

        let mut result = IndexMap::with_capacity(tfs.len());
        for (id, counts) in tfs {
            let mut vector: IndexMap<String, f64> = counts
                .into_iter()
                .map(|(term, tf)| {
                    let df = dfs.get(term.as_str()).copied().unwrap_or(1) as f64;
                    let w = tf as f64 * (n_docs / df).ln();
                    (term, w)
                })
                .collect();
            self.weighting.apply(&mut vector);
            result.insert(id, TermVector(vector));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("fox", ["the", "fox", "saw", "the", "grapes"]),
            Document::new("crow", ["the", "crow", "had", "cheese"]),
            Document::new("ant", ["the", "ant", "saw", "the", "grasshopper"]),
        ]
    }

    #[test]
    fn test_term_in_every_document_has_zero_weight() {
        let vectors = TfIdfVectorizer::new().vectorize(&corpus());

        for v in vectors.values() {
            assert_eq!(Some(0.0), v.get("the"));
        }
    }

    #[test]
    fn test_tfidf_values() {
        let vectors = TfIdfVectorizer::new().vectorize(&corpus());
        let fox = &vectors["fox"];

        assert_eq!(Some((3f64 / 2.0).ln()), fox.get("saw"));
        assert_eq!(Some(3f64.ln()), fox.get("grapes"));
        assert!(!fox.contains("crow"));
        assert_eq!(
            vec!["the", "fox", "saw", "grapes"],
            fox.iter().map(|(t, _)| t).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_document_frequencies_count_once_per_document() {
        let dfs = document_frequencies(&corpus());

        assert_eq!(Some(&3), dfs.get("the"));
        assert_eq!(Some(&2), dfs.get("saw"));
        assert_eq!(Some(&1), dfs.get("cheese"));
    }

    #[test]
    fn test_term_frequencies_duplicate_id_keeps_position() {
        let docs = vec![
            Document::new("a", ["x"]),
            Document::new("b", ["y"]),
            Document::new("a", ["z", "z"]),
        ];
        let tfs = term_frequencies(&docs);

        assert_eq!(
            vec!["a", "b"],
            tfs.keys().map(String::as_str).collect::<Vec<_>>()
        );
        assert_eq!(2, tfs["a"].total());
    }

    #[test]
    fn test_sublinear() {
        let vectors = TfIdfVectorizer::new()
            .weighting(Weighting::Sublinear)
            .vectorize(&corpus());
        let fox = &vectors["fox"];

        assert_eq!(Some(0.0), fox.get("the"));
        assert_eq!(Some(1.0 + 3f64.ln().ln()), fox.get("grapes"));
    }

    #[test]
    fn test_augmented() {
        let vectors = TfIdfVectorizer::new()
            .weighting(Weighting::augmented(0.5).unwrap())
            .vectorize(&corpus());
        let crow = &vectors["crow"];

        assert_eq!(Some(0.5), crow.get("the"));
        assert_eq!(Some(1.0), crow.get("cheese"));
    }

    #[test]
    fn test_augmented_invalid_alpha() {
        assert!(Weighting::augmented(1.5).is_err());
        assert!(Weighting::augmented(-0.1).is_err());
    }

    #[test]
    fn test_weighting_default_is_tfidf() {
        assert_eq!(Weighting::TfIdf, Weighting::default());
        assert_eq!(
            TfIdfVectorizer::new().vectorize(&corpus()),
            TfIdfVectorizer::new()
                .weighting(Weighting::TfIdf)
                .vectorize(&corpus())
        );
    }

    #[test]
    fn test_weighting_from_str() {
        assert_eq!(Ok(Weighting::TfIdf), "tfidf".parse());
        assert_eq!(Ok(Weighting::Sublinear), "sublinear".parse());
        assert!("bm25".parse::<Weighting>().is_err());
    }
}
