use core::fmt;
use core::ops::AddAssign;

use crate::predictor::Tagger;
use crate::sentence::TaggedSentence;

/// Token-level accuracy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Accuracy {
    n_correct: usize,
    n_total: usize,
}

impl Accuracy {
    pub const fn new(n_correct: usize, n_total: usize) -> Self {
        Self { n_correct, n_total }
    }

    pub const fn n_correct(&self) -> usize {
        self.n_correct
    }

    pub const fn n_total(&self) -> usize {
        self.n_total
    }

    /// Returns the accuracy as a percentage in `[0, 100]`. An empty evaluation yields `0.0`.
    pub fn percentage(&self) -> f64 {
        if self.n_total == 0 {
            return 0.0;
        }
        100.0 * self.n_correct as f64 / self.n_total as f64
    }
}

impl AddAssign for Accuracy {
    fn add_assign(&mut self, other: Self) {
        self.n_correct += other.n_correct;
        self.n_total += other.n_total;
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:5.2}% ({}/{})",
            self.percentage(),
            self.n_correct,
            self.n_total
        )
    }
}

/// Scores a tagger against gold-tagged sentences.
pub struct Evaluator<'a> {
    data: &'a [TaggedSentence],
}

impl<'a> Evaluator<'a> {
    pub fn new(data: &'a [TaggedSentence]) -> Self {
        Self { data }
    }

    pub fn n_tokens(&self) -> usize {
        self.data.iter().map(TaggedSentence::len).sum()
    }

    /// Tags every sentence and counts predictions equal to the gold tags.
    pub fn evaluate(&self, tagger: &Tagger) -> Accuracy {
        let mut accuracy = Accuracy::default();
        for sentence in self.data {
            let predictions = tagger.predict(sentence.words());
            let n_correct = predictions
                .iter()
                .zip(sentence.tags())
                .filter(|(p, gold)| p.tag() == gold.as_str())
                .count();
            accuracy += Accuracy::new(n_correct, sentence.len());
        }
        accuracy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::feature::FeatureModelBuilder;
    use crate::model::Weights;

    #[test]
    fn test_percentage() {
        assert_eq!(75.0, Accuracy::new(3, 4).percentage());
        assert_eq!(0.0, Accuracy::default().percentage());
    }

    #[test]
    fn test_display() {
        assert_eq!("50.00% (1/2)", Accuracy::new(1, 2).to_string());
    }

    #[test]
    fn test_evaluate() {
        let trn = [TaggedSentence::from_pairs([("the", "DT"), ("dog", "NN")]).unwrap()];
        let mut builder = FeatureModelBuilder::new();
        builder.add_sentence(&trn[0]);
        let tables = builder.build();
        let tagger = Tagger::new(&tables, Weights::default());

        let dev = [
            TaggedSentence::from_pairs([("the", "DT"), ("dog", "NN")]).unwrap(),
            TaggedSentence::from_pairs([("the", "DT"), ("dog", "VB")]).unwrap(),
        ];
        let evaluator = Evaluator::new(&dev);

        assert_eq!(4, evaluator.n_tokens());
        assert_eq!(Accuracy::new(3, 4), evaluator.evaluate(&tagger));
    }
}
