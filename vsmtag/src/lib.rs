#![cfg_attr(docsrs, feature(doc_cfg))]

//! # vsmtag
//!
//! vsmtag is a small text-processing toolkit with two independent parts:
//!
//! * a vector space model that turns documents into TF-IDF vectors and matches every query
//!   document with its most similar reference document, and
//! * a part-of-speech tagger that votes over context-conditioned tag tables with weights tuned
//!   by a grid search on a development set.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{prelude::*, stdin, BufReader};
//!
//! use vsmtag::Model;
//!
//! let mut f = BufReader::new(File::open("model.bin").unwrap());
//! let model = Model::read(&mut f).unwrap();
//! let tagger = model.tagger();
//!
//! for line in stdin().lock().lines() {
//!     let line = line.unwrap();
//!     let words: Vec<_> = line.split_whitespace().collect();
//!     let tagged: Vec<_> = words
//!         .iter()
//!         .zip(tagger.predict(&words))
//!         .map(|(w, p)| format!("{}/{}", w, p.tag()))
//!         .collect();
//!     println!("{}", tagged.join(" "));
//! }
//! ```
//!
//! Weights are selected by [`GridSearchTrainer`]; documents are matched by
//! [`SimilarityMatcher`].

mod utils;

mod document;
mod evaluator;
mod feature;
mod model;
mod predictor;
mod sentence;
mod similarity;
mod tfidf;
mod trainer;

pub mod errors;

pub use document::{document_key, read_documents, Document, DocumentRecord};
pub use evaluator::{Accuracy, Evaluator};
pub use feature::{
    Context, FeatureModelBuilder, FeatureTable, FeatureTables, PairKey, TagProb, TrigramKey,
};
pub use model::{Model, Weights};
pub use predictor::{Prediction, Tagger, FALLBACK_TAG};
pub use sentence::{read_tagged_sentences, TaggedSentence};
pub use similarity::{cosine, euclidean, Match, Metric, SimilarityMatcher};
pub use tfidf::{
    document_frequencies, term_frequencies, TermVector, TfIdfVectorizer, Weighting, DEFAULT_ALPHA,
};
pub use trainer::{weight_grid, GridSearchTrainer, TrainingResult, WEIGHT_GRID};
pub use utils::Counter;
