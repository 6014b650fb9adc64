use core::fmt;
use core::hash::Hash;

use bincode::{
    de::{BorrowDecoder, Decoder},
    enc::Encoder,
    error::{DecodeError, EncodeError},
    BorrowDecode, Decode, Encode,
};
use indexmap::{Equivalent, IndexMap};

use crate::sentence::TaggedSentence;
use crate::utils::{Counter, SerializableIndexMap};

/// Context value of a neighbouring position.
///
/// Positions beyond the sentence boundary are represented by [`Context::Dummy`], which can never
/// be equal to a real word or tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Encode, Decode)]
pub enum Context {
    /// Sentence boundary.
    Dummy,

    /// Word or tag at the position.
    Value(String),
}

impl Context {
    /// Label used when the boundary has to be printed.
    pub const DUMMY_LABEL: &'static str = "!@#$";

    /// Gets the context at `pos`, or [`Context::Dummy`] when `pos` is outside `items`.
    pub fn at<S>(items: &[S], pos: Option<usize>) -> Self
    where
        S: AsRef<str>,
    {
        pos.and_then(|i| items.get(i))
            .map_or(Self::Dummy, |item| Self::Value(item.as_ref().to_string()))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Dummy => f.write_str(Self::DUMMY_LABEL),
            Self::Value(v) => f.write_str(v),
        }
    }
}

/// Key of the tables conditioned on a neighbour and the current word.
pub type PairKey = (Context, String);

/// Key of the table conditioned on the two previous words and the current word.
pub type TrigramKey = (Context, Context, String);

/// Probability of a tag under some context.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct TagProb {
    pub(crate) tag: String,
    pub(crate) prob: f64,
}

impl TagProb {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn prob(&self) -> f64 {
        self.prob
    }
}

/// Maps a context key to tag probabilities sorted in descending order.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTable<K>
where
    K: Eq + Hash,
{
    entries: SerializableIndexMap<K, Vec<TagProb>>,
}

impl<K> Default for FeatureTable<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: SerializableIndexMap::default(),
        }
    }
}

impl<K> FeatureTable<K>
where
    K: Eq + Hash,
{
    /// Converts raw tag counts into probabilities.
    ///
    /// Tags with equal counts keep the order in which they were first counted.
    pub fn from_counts(counts: IndexMap<K, Counter<String>>) -> Self {
        let mut entries = SerializableIndexMap::default();
        for (key, counter) in counts {
            let total = counter.total() as f64;
            let probs = counter
                .most_common()
                .into_iter()
                .map(|(tag, count)| TagProb {
                    tag,
                    prob: count as f64 / total,
                })
                .collect();
            entries.insert(key, probs);
        }
        Self { entries }
    }

    /// Gets tag probabilities of `key`. A missing key yields an empty slice.
    pub fn get<Q>(&self, key: &Q) -> &[TagProb]
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[TagProb])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

impl<K> Encode for FeatureTable<K>
where
    K: Encode + Eq + Hash,
{
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.entries.encode(encoder)
    }
}

impl<K> Decode for FeatureTable<K>
where
    K: Decode + Eq + Hash + 'static,
{
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(Self {
            entries: Decode::decode(decoder)?,
        })
    }
}

impl<'de, K> BorrowDecode<'de> for FeatureTable<K>
where
    K: Decode + Eq + Hash + 'static,
{
    fn borrow_decode<D: BorrowDecoder<'de>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Self::decode(decoder)
    }
}

/// The nine context-conditioned tag tables.
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct FeatureTables {
    pub(crate) current_word: FeatureTable<String>,
    pub(crate) prev_tag: FeatureTable<Context>,
    pub(crate) next_tag: FeatureTable<Context>,
    pub(crate) prev_word: FeatureTable<Context>,
    pub(crate) next_word: FeatureTable<Context>,
    pub(crate) prev_word_word: FeatureTable<PairKey>,
    pub(crate) next_word_word: FeatureTable<PairKey>,
    pub(crate) prev_tag_word: FeatureTable<PairKey>,
    pub(crate) trigram: FeatureTable<TrigramKey>,
}

impl FeatureTables {
    pub fn current_word(&self) -> &FeatureTable<String> {
        &self.current_word
    }

    pub fn prev_tag(&self) -> &FeatureTable<Context> {
        &self.prev_tag
    }

    /// Table keyed on the tag of the following position.
    pub fn next_tag(&self) -> &FeatureTable<Context> {
        &self.next_tag
    }

    pub fn prev_word(&self) -> &FeatureTable<Context> {
        &self.prev_word
    }

    pub fn next_word(&self) -> &FeatureTable<Context> {
        &self.next_word
    }

    pub fn prev_word_word(&self) -> &FeatureTable<PairKey> {
        &self.prev_word_word
    }

    pub fn next_word_word(&self) -> &FeatureTable<PairKey> {
        &self.next_word_word
    }

    pub fn prev_tag_word(&self) -> &FeatureTable<PairKey> {
        &self.prev_tag_word
    }

    pub fn trigram(&self) -> &FeatureTable<TrigramKey> {
        &self.trigram
    }
}

fn count<K>(table: &mut IndexMap<K, Counter<String>>, key: K, tag: &str)
where
    K: Eq + Hash,
{
    table.entry(key).or_default().add(tag.to_string());
}

/// Collects tag counts for every table from gold-tagged sentences.
///
/// # Examples
///
/// ```
/// use vsmtag::{Context, FeatureModelBuilder, TaggedSentence};
///
/// let s = TaggedSentence::from_pairs([("The", "DT"), ("dog", "NN"), ("barks", "VBZ")]).unwrap();
/// let mut builder = FeatureModelBuilder::new();
/// builder.add_sentence(&s);
/// let tables = builder.build();
///
/// let probs = tables.prev_word().get(&Context::Value("The".into()));
/// assert_eq!("NN", probs[0].tag());
/// assert_eq!(1.0, probs[0].prob());
/// ```
#[derive(Default)]
pub struct FeatureModelBuilder {
    current_word: IndexMap<String, Counter<String>>,
    prev_tag: IndexMap<Context, Counter<String>>,
    next_tag: IndexMap<Context, Counter<String>>,
    prev_word: IndexMap<Context, Counter<String>>,
    next_word: IndexMap<Context, Counter<String>>,
    prev_word_word: IndexMap<PairKey, Counter<String>>,
    next_word_word: IndexMap<PairKey, Counter<String>>,
    prev_tag_word: IndexMap<PairKey, Counter<String>>,
    trigram: IndexMap<TrigramKey, Counter<String>>,
    n_sentences: usize,
}

impl FeatureModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the tags of `sentence` under every context.
    pub fn add_sentence(&mut self, sentence: &TaggedSentence) {
        let words = sentence.words();
        let tags = sentence.tags();
        for (i, (curr_word, curr_tag)) in sentence.iter().enumerate() {
            let prev = i.checked_sub(1);
            let next = Some(i + 1);
            let prev_prev = i.checked_sub(2);

            let prev_tag = Context::at(tags, prev);
            let next_tag = Context::at(tags, next);
            let prev_word = Context::at(words, prev);
            let next_word = Context::at(words, next);
            let prev_prev_word = Context::at(words, prev_prev);

            count(&mut self.current_word, curr_word.to_string(), curr_tag);
            count(&mut self.prev_tag, prev_tag.clone(), curr_tag);
            count(&mut self.next_tag, next_tag, curr_tag);
            count(&mut self.prev_word, prev_word.clone(), curr_tag);
            count(&mut self.next_word, next_word.clone(), curr_tag);
            count(
                &mut self.prev_word_word,
                (prev_word.clone(), curr_word.to_string()),
                curr_tag,
            );
            count(
                &mut self.next_word_word,
                (next_word, curr_word.to_string()),
                curr_tag,
            );
            count(
                &mut self.prev_tag_word,
                (prev_tag, curr_word.to_string()),
                curr_tag,
            );
            count(
                &mut self.trigram,
                (prev_prev_word, prev_word, curr_word.to_string()),
                curr_tag,
            );
        }
        self.n_sentences += 1;
    }

    pub fn n_sentences(&self) -> usize {
        self.n_sentences
    }

    /// Converts all counts into probability tables.
    pub fn build(self) -> FeatureTables {
        FeatureTables {
            current_word: FeatureTable::from_counts(self.current_word),
            prev_tag: FeatureTable::from_counts(self.prev_tag),
            next_tag: FeatureTable::from_counts(self.next_tag),
            prev_word: FeatureTable::from_counts(self.prev_word),
            next_word: FeatureTable::from_counts(self.next_word),
            prev_word_word: FeatureTable::from_counts(self.prev_word_word),
            next_word_word: FeatureTable::from_counts(self.next_word_word),
            prev_tag_word: FeatureTable::from_counts(self.prev_tag_word),
            trigram: FeatureTable::from_counts(self.trigram),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(s: &str) -> Context {
        Context::Value(s.to_string())
    }

    fn probs(entries: &[TagProb]) -> Vec<(&str, f64)> {
        entries.iter().map(|p| (p.tag(), p.prob())).collect()
    }

    fn build(sentences: &[TaggedSentence]) -> FeatureTables {
        let mut builder = FeatureModelBuilder::new();
        for s in sentences {
            builder.add_sentence(s);
        }
        builder.build()
    }

    #[test]
    fn test_single_sentence_tables() {
        let s =
            TaggedSentence::from_pairs([("The", "DT"), ("dog", "NN"), ("barks", "VBZ")]).unwrap();
        let tables = build(&[s]);

        assert_eq!(vec![("NN", 1.0)], probs(tables.prev_word().get(&value("The"))));
        assert_eq!(vec![("NN", 1.0)], probs(tables.prev_tag().get(&value("DT"))));
        assert_eq!(vec![("DT", 1.0)], probs(tables.prev_tag().get(&Context::Dummy)));
        assert_eq!(vec![("VBZ", 1.0)], probs(tables.next_tag().get(&Context::Dummy)));
        assert_eq!(vec![("DT", 1.0)], probs(tables.next_tag().get(&value("NN"))));
        assert_eq!(vec![("DT", 1.0)], probs(tables.current_word().get("The")));
        assert_eq!(
            vec![("VBZ", 1.0)],
            probs(
                tables
                    .prev_tag_word()
                    .get(&(value("NN"), "barks".to_string()))
            )
        );
        assert_eq!(
            vec![("NN", 1.0)],
            probs(
                tables
                    .next_word_word()
                    .get(&(value("barks"), "dog".to_string()))
            )
        );
    }

    #[test]
    fn test_trigram_boundaries() {
        let s =
            TaggedSentence::from_pairs([("The", "DT"), ("dog", "NN"), ("barks", "VBZ")]).unwrap();
        let tables = build(&[s]);

        let keys: Vec<_> = tables.trigram().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            vec![
                (Context::Dummy, Context::Dummy, "The".to_string()),
                (Context::Dummy, value("The"), "dog".to_string()),
                (value("The"), value("dog"), "barks".to_string()),
            ],
            keys
        );
    }

    #[test]
    fn test_probabilities_sorted_and_sum_to_one() {
        let data = [
            TaggedSentence::from_pairs([("run", "VB"), ("fast", "RB")]).unwrap(),
            TaggedSentence::from_pairs([("run", "NN")]).unwrap(),
            TaggedSentence::from_pairs([("run", "NN"), ("home", "NN")]).unwrap(),
        ];
        let tables = build(&data);

        let run = probs(tables.current_word().get("run"));
        assert_eq!("NN", run[0].0);
        assert!((run[0].1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!("VB", run[1].0);

        for (_, entries) in tables.prev_word().iter() {
            let sum: f64 = entries.iter().map(TagProb::prob).sum();
            assert!((sum - 1.0).abs() < 1e-9);
            for w in entries.windows(2) {
                assert!(w[0].prob() >= w[1].prob());
            }
        }
    }

    #[test]
    fn test_ties_keep_first_counted_order() {
        let data = [
            TaggedSentence::from_pairs([("saw", "VBD")]).unwrap(),
            TaggedSentence::from_pairs([("saw", "NN")]).unwrap(),
        ];
        let tables = build(&data);

        assert_eq!(
            vec![("VBD", 0.5), ("NN", 0.5)],
            probs(tables.current_word().get("saw"))
        );
    }

    #[test]
    fn test_builder_counts_sentences() {
        let mut builder = FeatureModelBuilder::new();
        assert_eq!(0, builder.n_sentences());
        builder.add_sentence(&TaggedSentence::from_pairs([("a", "DT")]).unwrap());
        builder.add_sentence(&TaggedSentence::from_pairs([("b", "NN"), ("c", "VB")]).unwrap());

        assert_eq!(2, builder.n_sentences());
    }

    #[test]
    fn test_missing_key_is_empty() {
        let tables = build(&[TaggedSentence::from_pairs([("a", "DT")]).unwrap()]);

        assert!(tables.current_word().get("zebra").is_empty());
    }

    #[test]
    fn test_dummy_never_equals_value() {
        let s = TaggedSentence::from_pairs([(Context::DUMMY_LABEL, "SYM")]).unwrap();
        let tables = build(&[s]);

        assert!(tables.prev_word().get(&value(Context::DUMMY_LABEL)).is_empty());
        assert_eq!(vec![("SYM", 1.0)], probs(tables.prev_word().get(&Context::Dummy)));
    }
}
