use std::io::BufRead;

use crate::errors::{Result, VsmtagError};

/// Sentence annotated with a part-of-speech tag for every word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedSentence {
    pub(crate) words: Vec<String>,
    pub(crate) tags: Vec<String>,
}

impl TaggedSentence {
    /// Creates a new [`TaggedSentence`] from `(word, tag)` pairs.
    ///
    /// # Errors
    ///
    /// If `pairs` is empty, an error variant will be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use vsmtag::TaggedSentence;
    ///
    /// let s = TaggedSentence::from_pairs([("The", "DT"), ("dog", "NN")]).unwrap();
    /// assert_eq!(&["The", "dog"], s.words());
    /// assert_eq!(&["DT", "NN"], s.tags());
    ///
    /// let s = TaggedSentence::from_pairs(Vec::<(&str, &str)>::new());
    /// assert!(s.is_err());
    /// ```
    pub fn from_pairs<I, W, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: Into<String>,
    {
        let (words, tags): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(w, t)| (w.into(), t.into()))
            .unzip();
        if words.is_empty() {
            return Err(VsmtagError::invalid_argument("pairs", "sentence is empty"));
        }
        Ok(Self { words, tags })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns an iterator over `(word, tag)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.words
            .iter()
            .zip(&self.tags)
            .map(|(w, t)| (w.as_str(), t.as_str()))
    }

    /// Generates a string of `word/tag` pairs separated by whitespaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use vsmtag::TaggedSentence;
    ///
    /// let s = TaggedSentence::from_pairs([("The", "DT"), ("dog", "NN")]).unwrap();
    /// assert_eq!("The/DT dog/NN", s.to_tagged_string());
    /// ```
    pub fn to_tagged_string(&self) -> String {
        let mut result = String::new();
        for (i, (word, tag)) in self.iter().enumerate() {
            if i != 0 {
                result.push(' ');
            }
            result.push_str(word);
            result.push('/');
            result.push_str(tag);
        }
        result
    }
}

/// Reads sentences in the two-column format.
///
/// Every non-blank line holds a word and its tag separated by whitespace. A blank line or the
/// end of input closes the current sentence; runs of blank lines do not produce empty sentences.
///
/// # Errors
///
/// Returns an error when `rdr` fails or when a non-blank line has fewer than two fields.
pub fn read_tagged_sentences<R>(rdr: R) -> Result<Vec<TaggedSentence>>
where
    R: BufRead,
{
    let mut data = vec![];
    let mut words = vec![];
    let mut tags = vec![];
    for (i, line) in rdr.lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some(word), Some(tag)) => {
                words.push(word.to_string());
                tags.push(tag.to_string());
            }
            (None, _) => {
                if !words.is_empty() {
                    data.push(TaggedSentence {
                        words: std::mem::take(&mut words),
                        tags: std::mem::take(&mut tags),
                    });
                }
            }
            (Some(_), None) => {
                return Err(VsmtagError::invalid_argument(
                    "rdr",
                    format!("line {} does not contain a tag", i + 1),
                ));
            }
        }
    }
    if !words.is_empty() {
        data.push(TaggedSentence { words, tags });
    }
    Ok(data)
}
