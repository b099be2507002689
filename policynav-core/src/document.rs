//! Document and page model.
//!
//! A document is an ordered sequence of pages identified by its source
//! path. Pages are immutable once extracted. The built-in loader reads
//! UTF-8 text and splits pages on form feeds; callers with their own
//! extractor (PDF, HTML) hand pre-extracted pages to
//! [`Document::from_pages`].

use crate::error::LoadError;
use std::path::{Path, PathBuf};

/// One unit of original document text with its 1-based page number.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: usize,
    pub text: String,
}

/// An ordered sequence of pages, consumed once by the pipeline.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub pages: Vec<Page>,
}

impl Document {
    /// Build a document from pre-extracted page texts, numbering them
    /// from 1 in the given order.
    ///
    /// Fails with [`LoadError::Empty`] when every page is blank.
    pub fn from_pages(path: impl Into<PathBuf>, page_texts: Vec<String>) -> Result<Self, LoadError> {
        let pages: Vec<Page> = page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page {
                number: i + 1,
                text,
            })
            .collect();

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(LoadError::Empty);
        }

        Ok(Self {
            path: path.into(),
            pages,
        })
    }

    /// Read a UTF-8 text file, splitting pages on form feed (`\x0c`).
    /// A file without form feeds is a single page.
    pub async fn from_file(path: &Path) -> Result<Self, LoadError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let page_texts: Vec<String> = raw.split('\u{0c}').map(str::to_string).collect();
        Self::from_pages(path, page_texts)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pages_from_one() {
        let doc =
            Document::from_pages("policy.txt", vec!["first".into(), "second".into()]).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].number, 1);
        assert_eq!(doc.pages[1].number, 2);
    }

    #[test]
    fn all_blank_pages_is_a_load_error() {
        let err = Document::from_pages("policy.txt", vec!["".into(), "  \n".into()]).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[tokio::test]
    async fn splits_file_on_form_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.txt");
        tokio::fs::write(&path, "page one text\u{0c}page two text")
            .await
            .unwrap();

        let doc = Document::from_file(&path).await.unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[1].text, "page two text");
    }

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let err = Document::from_file(Path::new("/nonexistent/policy.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { .. }));
    }
}
