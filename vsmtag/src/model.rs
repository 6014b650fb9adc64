use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, VsmtagError};
use crate::feature::FeatureTables;
use crate::predictor::Tagger;

/// Weights of the five weighted tables.
///
/// The four compound tables always vote with weight `1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Encode, Decode)]
pub struct Weights {
    pub current_word: f64,
    pub prev_tag: f64,
    /// Weight of the next-tag table, queried with the previous predicted tag.
    pub prev_tag_next: f64,
    pub prev_word: f64,
    pub next_word: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            current_word: 1.0,
            prev_tag: 1.0,
            prev_tag_next: 1.0,
            prev_word: 1.0,
            next_word: 1.0,
        }
    }
}

impl Weights {
    fn validate(&self) -> Result<()> {
        let all = [
            ("current_word", self.current_word),
            ("prev_tag", self.prev_tag),
            ("prev_tag_next", self.prev_tag_next),
            ("prev_word", self.prev_word),
            ("next_word", self.next_word),
        ];
        for (name, w) in all {
            if !w.is_finite() {
                return Err(VsmtagError::invalid_model(format!(
                    "weight `{name}` is not finite: {w}"
                )));
            }
        }
        Ok(())
    }
}

/// Model data: all feature tables together with the selected weights.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct Model {
    pub(crate) tables: FeatureTables,
    pub(crate) weights: Weights,
}

impl Model {
    pub fn new(tables: FeatureTables, weights: Weights) -> Self {
        Self { tables, weights }
    }

    pub fn tables(&self) -> &FeatureTables {
        &self.tables
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    /// Replaces the weights.
    ///
    /// # Errors
    ///
    /// If one of the weights is NaN or infinite, an error variant will be returned.
    pub fn set_weights(&mut self, weights: Weights) -> Result<()> {
        weights.validate()?;
        self.weights = weights;
        Ok(())
    }

    /// Creates a tagger that borrows the tables of this model.
    pub fn tagger(&self) -> Tagger<'_> {
        Tagger::new(&self.tables, self.weights)
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error or the stored weights are not finite, an error variant will
    /// be returned.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let model: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        model.weights.validate()?;
        Ok(model)
    }
}
