use indexmap::IndexMap;

use crate::feature::{Context, FeatureTables, TagProb};
use crate::model::Weights;

/// Tag emitted when no table has any evidence for a token.
pub const FALLBACK_TAG: &str = "XX";

/// Tag predicted for a single token together with its accumulated score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction<'a> {
    tag: &'a str,
    score: f64,
}

impl<'a> Prediction<'a> {
    pub fn tag(&self) -> &'a str {
        self.tag
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Greedy left-to-right tagger that sums the weighted votes of all tables.
///
/// The previous-tag context of each token is the tag predicted for the preceding token, so
/// errors can propagate along the sentence.
///
/// # Examples
///
/// ```
/// use vsmtag::{FeatureModelBuilder, TaggedSentence, Tagger, Weights};
///
/// let s = TaggedSentence::from_pairs([("The", "DT"), ("dog", "NN"), ("barks", "VBZ")]).unwrap();
/// let mut builder = FeatureModelBuilder::new();
/// builder.add_sentence(&s);
/// let tables = builder.build();
///
/// let tagger = Tagger::new(&tables, Weights::default());
/// let tags: Vec<_> = tagger.predict(&["The", "dog", "barks"]).iter().map(|p| p.tag()).collect();
/// assert_eq!(vec!["DT", "NN", "VBZ"], tags);
/// ```
pub struct Tagger<'a> {
    tables: &'a FeatureTables,
    weights: Weights,
}

impl<'a> Tagger<'a> {
    /// Creates a new tagger.
    ///
    /// # Arguments
    ///
    /// * `tables` - Feature tables built from a training set.
    /// * `weights` - Weights of the five weighted tables.
    pub fn new(tables: &'a FeatureTables, weights: Weights) -> Self {
        Self { tables, weights }
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    fn vote(scores: &mut IndexMap<&'a str, f64>, probs: &'a [TagProb], weight: f64) {
        for p in probs {
            *scores.entry(p.tag.as_str()).or_insert(0.0) += p.prob * weight;
        }
    }

    /// Predicts a tag for every token.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Words of a sentence.
    ///
    /// # Returns
    ///
    /// One prediction per token. Tokens without any evidence are tagged [`FALLBACK_TAG`] with
    /// score `0.0`.
    pub fn predict<S>(&self, tokens: &[S]) -> Vec<Prediction<'a>>
    where
        S: AsRef<str>,
    {
        let tables = self.tables;
        let weights = &self.weights;
        let mut output: Vec<Prediction<'a>> = Vec::with_capacity(tokens.len());

        for (i, curr_word) in tokens.iter().enumerate() {
            let curr_word: &str = curr_word.as_ref();
            let prev_tag = i
                .checked_sub(1)
                .map_or(Context::Dummy, |j| Context::Value(output[j].tag.to_string()));
            let prev_word = Context::at(tokens, i.checked_sub(1));
            let next_word = Context::at(tokens, Some(i + 1));
            // Keyed on words during training but queried with the tag predicted two positions
            // back, so the table only hits at the boundary or where a word equals its tag.
            let prev_prev_tag = i
                .checked_sub(2)
                .map_or(Context::Dummy, |j| Context::Value(output[j].tag.to_string()));

            let mut scores = IndexMap::new();
            Self::vote(
                &mut scores,
                tables.current_word.get(curr_word),
                weights.current_word,
            );
            Self::vote(&mut scores, tables.prev_tag.get(&prev_tag), weights.prev_tag);
            Self::vote(
                &mut scores,
                tables.next_tag.get(&prev_tag),
                weights.prev_tag_next,
            );
            Self::vote(&mut scores, tables.prev_word.get(&prev_word), weights.prev_word);
            Self::vote(&mut scores, tables.next_word.get(&next_word), weights.next_word);

            let curr_word = curr_word.to_string();
            Self::vote(
                &mut scores,
                tables
                    .prev_word_word
                    .get(&(prev_word.clone(), curr_word.clone())),
                1.0,
            );
            Self::vote(
                &mut scores,
                tables.next_word_word.get(&(next_word, curr_word.clone())),
                1.0,
            );
            Self::vote(
                &mut scores,
                tables.prev_tag_word.get(&(prev_tag, curr_word.clone())),
                1.0,
            );
            Self::vote(
                &mut scores,
                tables.trigram.get(&(prev_prev_tag, prev_word, curr_word)),
                1.0,
            );

            // The first tag reaching the maximum wins.
            let mut best = Prediction {
                tag: FALLBACK_TAG,
                score: 0.0,
            };
            let mut found = false;
            for (tag, score) in scores {
                if !found || score > best.score {
                    best = Prediction { tag, score };
                    found = true;
                }
            }
            output.push(best);
        }

        output
    }
}
