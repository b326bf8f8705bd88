//! Input documents and the text recovered from them.

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// One invoice PDF, as handed over by a document source.
#[derive(Clone)]
pub struct Document {
    /// External identifier (file id or path).
    pub id: String,
    /// Human-readable name, used in logs and reports.
    pub name: String,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

impl Document {
    /// Create a document from bytes already in memory.
    pub fn new(id: impl Into<String>, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bytes,
        }
    }

    /// Read a document from a local file. The path doubles as the id.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(path.display().to_string(), name, bytes))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Text recovered from a document, page texts joined with `\n`.
///
/// Empty means "no content found"; it is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Join page texts in page order, skipping pages with no text.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for page in pages {
            let page = page.as_ref();
            if page.is_empty() {
                continue;
            }
            text.push_str(page);
            text.push('\n');
        }
        Self(text)
    }

    /// True when nothing but whitespace was recovered.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
