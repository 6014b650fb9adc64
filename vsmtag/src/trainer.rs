use tracing::{debug, info};

use crate::errors::{Result, VsmtagError};
use crate::evaluator::{Accuracy, Evaluator};
use crate::feature::{FeatureModelBuilder, FeatureTables};
use crate::model::{Model, Weights};
use crate::predictor::Tagger;
use crate::sentence::TaggedSentence;

/// Candidate values of each tuned weight.
pub const WEIGHT_GRID: [f64; 3] = [0.1, 0.5, 1.0];

/// Enumerates all weight combinations in search order.
///
/// The current-word weight is fixed at `1.0`. Loops are nested as previous tag, previous word,
/// next word, and previous-tag-to-next from the outermost to the innermost.
pub fn weight_grid() -> impl Iterator<Item = Weights> {
    WEIGHT_GRID.into_iter().flat_map(|prev_tag| {
        WEIGHT_GRID.into_iter().flat_map(move |prev_word| {
            WEIGHT_GRID.into_iter().flat_map(move |next_word| {
                WEIGHT_GRID.into_iter().map(move |prev_tag_next| Weights {
                    current_word: 1.0,
                    prev_tag,
                    prev_tag_next,
                    prev_word,
                    next_word,
                })
            })
        })
    })
}

/// Model selected by the grid search with its development accuracy.
pub struct TrainingResult {
    pub model: Model,
    pub accuracy: Accuracy,
}

/// Builds the feature tables and selects the best weights on a development set.
///
/// # Examples
///
/// ```
/// use vsmtag::{GridSearchTrainer, TaggedSentence};
///
/// let trn = vec![
///     TaggedSentence::from_pairs([("The", "DT"), ("dog", "NN"), ("barks", "VBZ")]).unwrap(),
/// ];
/// let dev = trn.clone();
///
/// let result = GridSearchTrainer::new().train(&trn, &dev).unwrap();
/// assert_eq!(100.0, result.accuracy.percentage());
/// ```
#[derive(Clone, Debug, Default)]
pub struct GridSearchTrainer {
    #[cfg(feature = "multithreading")]
    n_threads: usize,
}

impl GridSearchTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates weight combinations on `n_threads` threads.
    ///
    /// `0` or `1` runs the search on the calling thread. The selected weights do not depend on
    /// this setting.
    #[cfg(feature = "multithreading")]
    #[cfg_attr(docsrs, doc(cfg(feature = "multithreading")))]
    pub fn n_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    fn evaluate_all(
        tables: &FeatureTables,
        evaluator: &Evaluator,
        grid: &[Weights],
    ) -> Vec<Accuracy> {
        grid.iter()
            .map(|&weights| evaluator.evaluate(&Tagger::new(tables, weights)))
            .collect()
    }

    #[cfg(feature = "multithreading")]
    fn evaluate_grid(
        &self,
        tables: &FeatureTables,
        evaluator: &Evaluator,
        grid: &[Weights],
    ) -> Vec<Accuracy> {
        if self.n_threads <= 1 {
            return Self::evaluate_all(tables, evaluator, grid);
        }
        let chunk_size = grid.len().div_ceil(self.n_threads);
        std::thread::scope(|s| {
            let handles: Vec<_> = grid
                .chunks(chunk_size)
                .map(|chunk| s.spawn(move || Self::evaluate_all(tables, evaluator, chunk)))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }

    #[cfg(not(feature = "multithreading"))]
    fn evaluate_grid(
        &self,
        tables: &FeatureTables,
        evaluator: &Evaluator,
        grid: &[Weights],
    ) -> Vec<Accuracy> {
        Self::evaluate_all(tables, evaluator, grid)
    }

    /// Builds tables from `trn_data` and returns the model whose weights score best on
    /// `dev_data`.
    ///
    /// When several combinations reach the same accuracy, the first one in [`weight_grid`] order
    /// is kept.
    ///
    /// # Errors
    ///
    /// If either data set is empty, an error variant will be returned.
    pub fn train(
        &self,
        trn_data: &[TaggedSentence],
        dev_data: &[TaggedSentence],
    ) -> Result<TrainingResult> {
        if trn_data.is_empty() {
            return Err(VsmtagError::invalid_argument(
                "trn_data",
                "training set is empty",
            ));
        }
        if dev_data.is_empty() {
            return Err(VsmtagError::invalid_argument(
                "dev_data",
                "development set is empty",
            ));
        }

        let mut builder = FeatureModelBuilder::new();
        for sentence in trn_data {
            builder.add_sentence(sentence);
        }
        let n_sentences = builder.n_sentences();
        let tables = builder.build();
        info!(
            sentences = n_sentences,
            words = tables.current_word().len(),
            "Built feature tables"
        );

        let evaluator = Evaluator::new(dev_data);
        let grid: Vec<Weights> = weight_grid().collect();
        let scores = self.evaluate_grid(&tables, &evaluator, &grid);

        let mut best: Option<(Weights, Accuracy)> = None;
        for (weights, accuracy) in grid.into_iter().zip(scores) {
            debug!(
                "{:5.2}% - cw: {:3.1}, pp: {:3.1}, pw: {:3.1}, nw: {:3.1}, pn: {:3.1}",
                accuracy.percentage(),
                weights.current_word,
                weights.prev_tag,
                weights.prev_word,
                weights.next_word,
                weights.prev_tag_next,
            );
            if best.map_or(true, |(_, b)| accuracy.percentage() > b.percentage()) {
                best = Some((weights, accuracy));
            }
        }
        let (weights, accuracy) = best.ok_or_else(|| {
            VsmtagError::invalid_argument("grid", "no weight combination was evaluated")
        })?;
        info!(
            correct = accuracy.n_correct(),
            total = accuracy.n_total(),
            ?weights,
            "Selected weights"
        );

        Ok(TrainingResult {
            model: Model::new(tables, weights),
            accuracy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(pairs: &[(&str, &str)]) -> TaggedSentence {
        TaggedSentence::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn trn() -> Vec<TaggedSentence> {
        vec![
            sentence(&[("I", "PRP"), ("saw", "VBD"), ("a", "DT"), ("saw", "NN")]),
            sentence(&[("the", "DT"), ("saw", "NN"), ("broke", "VBD")]),
            sentence(&[("we", "PRP"), ("saw", "VBD"), ("it", "PRP")]),
            sentence(&[("a", "DT"), ("dog", "NN"), ("runs", "VBZ")]),
        ]
    }

    fn dev() -> Vec<TaggedSentence> {
        vec![
            sentence(&[("they", "PRP"), ("saw", "VBD"), ("the", "DT"), ("dog", "NN")]),
            sentence(&[("a", "DT"), ("saw", "NN"), ("runs", "VBZ")]),
        ]
    }

    #[test]
    fn test_weight_grid() {
        let grid: Vec<_> = weight_grid().collect();

        assert_eq!(81, grid.len());
        assert!(grid.iter().all(|w| w.current_word == 1.0));
        assert_eq!(
            Weights {
                current_word: 1.0,
                prev_tag: 0.1,
                prev_tag_next: 0.1,
                prev_word: 0.1,
                next_word: 0.1,
            },
            grid[0]
        );
        assert_eq!(0.5, grid[1].prev_tag_next);
        assert_eq!(0.5, grid[3].next_word);
        assert_eq!(0.5, grid[9].prev_word);
        assert_eq!(0.5, grid[27].prev_tag);
    }

    #[test]
    fn test_train_selects_strictly_best_first() {
        let trn = trn();
        let dev = dev();
        let result = GridSearchTrainer::new().train(&trn, &dev).unwrap();

        let tables = result.model.tables();
        let evaluator = Evaluator::new(&dev);
        let all: Vec<_> = weight_grid()
            .map(|w| (w, evaluator.evaluate(&Tagger::new(tables, w))))
            .collect();
        let max = all
            .iter()
            .map(|(_, a)| a.percentage())
            .fold(f64::MIN, f64::max);
        let first = all.iter().find(|(_, a)| a.percentage() == max).unwrap();

        assert_eq!(max, result.accuracy.percentage());
        assert_eq!(first.0, result.model.weights());
    }

    #[test]
    fn test_train_is_reproducible() {
        let trn = trn();
        let dev = dev();
        let a = GridSearchTrainer::new().train(&trn, &dev).unwrap();
        let b = GridSearchTrainer::new().train(&trn, &dev).unwrap();

        let mut bytes_a = vec![];
        let mut bytes_b = vec![];
        a.model.write(&mut bytes_a).unwrap();
        b.model.write(&mut bytes_b).unwrap();
        assert_eq!(bytes_a, bytes_b);
        assert_eq!(a.accuracy, b.accuracy);
    }

    #[cfg(feature = "multithreading")]
    #[test]
    fn test_train_multithreading_matches_sequential() {
        let trn = trn();
        let dev = dev();
        let sequential = GridSearchTrainer::new().train(&trn, &dev).unwrap();
        let parallel = GridSearchTrainer::new()
            .n_threads(4)
            .train(&trn, &dev)
            .unwrap();

        assert_eq!(sequential.model, parallel.model);
        assert_eq!(sequential.accuracy, parallel.accuracy);
    }

    #[test]
    fn test_train_empty_dev() {
        let result = GridSearchTrainer::new().train(&trn(), &[]);

        assert!(result.is_err());
        assert_eq!(
            "InvalidArgumentError: dev_data: development set is empty",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_train_empty_trn() {
        assert!(GridSearchTrainer::new().train(&[], &dev()).is_err());
    }
}
