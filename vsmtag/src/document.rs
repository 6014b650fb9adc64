use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Raw corpus record as stored in the JSON input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub source: String,
    pub tokens: String,
}

/// Document with an identifier and its whitespace-separated tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    id: String,
    tokens: Vec<String>,
}

impl Document {
    pub fn new<S, I, T>(id: S, tokens: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            id: id.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a document from a corpus record.
    ///
    /// # Examples
    ///
    /// ```
    /// use vsmtag::{Document, DocumentRecord};
    ///
    /// let record = DocumentRecord {
    ///     source: "aesop&fable&The Fox and the Grapes".into(),
    ///     tokens: "a  hungry fox".into(),
    /// };
    /// let doc = Document::from_record(&record);
    /// assert_eq!("The Fox and the Grapes", doc.id());
    /// assert_eq!(&["a", "hungry", "fox"], doc.tokens());
    /// ```
    pub fn from_record(record: &DocumentRecord) -> Self {
        Self::new(
            document_key(&record.source),
            record.tokens.split_whitespace(),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Extracts the document key: the part of `source` after the last `&`.
///
/// A `source` without `&` is its own key.
pub fn document_key(source: &str) -> &str {
    source.rfind('&').map_or(source, |i| &source[i + 1..])
}

/// Reads a JSON array of [`DocumentRecord`]s.
///
/// # Errors
///
/// Returns an error when `rdr` fails or does not contain a valid array of records.
pub fn read_documents<R>(rdr: R) -> Result<Vec<Document>>
where
    R: Read,
{
    let records: Vec<DocumentRecord> = serde_json::from_reader(rdr)?;
    Ok(records.iter().map(Document::from_record).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key() {
        assert_eq!("c", document_key("a&b&c"));
        assert_eq!("plain", document_key("plain"));
        assert_eq!("", document_key("trailing&"));
    }

    #[test]
    fn test_read_documents() {
        let input = r#"[
            {"source": "x&The Ant", "tokens": "the ant works"},
            {"source": "x&The Fly", "tokens": "the fly\tplays"}
        ]"#;
        let docs = read_documents(input.as_bytes()).unwrap();

        assert_eq!(
            vec![
                Document::new("The Ant", ["the", "ant", "works"]),
                Document::new("The Fly", ["the", "fly", "plays"]),
            ],
            docs
        );
    }

    #[test]
    fn test_read_documents_invalid() {
        let input = r#"[{"source": "x"}]"#;

        assert!(read_documents(input.as_bytes()).is_err());
    }
}
