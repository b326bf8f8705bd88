//! Where invoice PDFs come from: a local directory or a Drive folder.

use std::path::{Path, PathBuf};

use glob::glob;
use tempfile::NamedTempFile;
use tracing::debug;

use shiwake_core::models::ShiwakeConfig;
use shiwake_core::{DocumentError, Document};

use crate::drive::{DriveClient, DriveFile};

/// A listed document, not yet fetched.
#[derive(Debug, Clone)]
pub enum Entry {
    Local(PathBuf),
    Drive(DriveFile),
}

impl Entry {
    pub fn name(&self) -> String {
        match self {
            Entry::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Entry::Drive(file) => file.name.clone(),
        }
    }
}

/// A fetched document. Any temporary file backing it lives as long as this
/// value and is removed when it is dropped.
pub struct Fetched {
    pub document: Document,
    _temp: Option<NamedTempFile>,
}

/// A document source.
pub enum Source {
    Local { dir: PathBuf },
    Drive { client: DriveClient, folder_id: String },
}

impl Source {
    /// Pick the source from configuration: a local directory wins over a
    /// Drive folder.
    pub async fn from_config(config: &ShiwakeConfig) -> anyhow::Result<Self> {
        if let Some(dir) = &config.source.local_dir {
            if !dir.is_dir() {
                anyhow::bail!("Input directory not found: {}", dir.display());
            }
            return Ok(Source::Local { dir: dir.clone() });
        }

        let Some(folder_id) = &config.source.folder_id else {
            anyhow::bail!(
                "No document source configured. Pass --dir or --folder-id, or set {}.",
                shiwake_core::models::config::ENV_FOLDER_ID
            );
        };

        let client = DriveClient::connect(&config.source.credentials_path).await?;
        Ok(Source::Drive {
            client,
            folder_id: folder_id.clone(),
        })
    }

    /// Description for logs and the summary.
    pub fn describe(&self) -> String {
        match self {
            Source::Local { dir } => dir.display().to_string(),
            Source::Drive { folder_id, .. } => format!("Drive folder {}", folder_id),
        }
    }

    /// Enumerate documents; this order is the ledger row order.
    pub async fn list(&self) -> anyhow::Result<Vec<Entry>> {
        match self {
            Source::Local { dir } => Ok(list_local(dir)?.into_iter().map(Entry::Local).collect()),
            Source::Drive { client, folder_id } => Ok(client
                .list_pdfs(folder_id)
                .await?
                .into_iter()
                .map(Entry::Drive)
                .collect()),
        }
    }

    /// Retrieve one document's bytes.
    pub async fn fetch(&self, entry: &Entry) -> Result<Fetched, DocumentError> {
        match (self, entry) {
            (_, Entry::Local(path)) => {
                let document = Document::from_path(path).map_err(|e| DocumentError::Fetch {
                    document: entry.name(),
                    reason: e.to_string(),
                })?;
                Ok(Fetched {
                    document,
                    _temp: None,
                })
            }
            (Source::Drive { client, .. }, Entry::Drive(file)) => {
                let fetch_error = |reason: String| DocumentError::Fetch {
                    document: file.name.clone(),
                    reason,
                };
                let temp = client.download(file).await.map_err(|e| fetch_error(e.to_string()))?;
                let bytes = std::fs::read(temp.path()).map_err(|e| fetch_error(e.to_string()))?;
                Ok(Fetched {
                    document: Document::new(file.id.clone(), file.name.clone(), bytes),
                    _temp: Some(temp),
                })
            }
            (Source::Local { .. }, Entry::Drive(file)) => Err(DocumentError::Fetch {
                document: file.name.clone(),
                reason: "Drive entry given to a local source".to_string(),
            }),
        }
    }
}

/// `*.pdf` files (any case) directly inside `dir`, sorted by file name.
pub fn list_local(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} PDFs in {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_local_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf.bak"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let names: Vec<String> = list_local(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_fetch_local() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inv.pdf");
        std::fs::write(&path, b"%PDF-1.5").unwrap();

        let source = Source::Local {
            dir: dir.path().to_path_buf(),
        };
        let fetched = source.fetch(&Entry::Local(path)).await.unwrap();
        assert_eq!(fetched.document.name, "inv.pdf");
        assert_eq!(fetched.document.bytes, b"%PDF-1.5");
    }

    #[tokio::test]
    async fn test_fetch_missing_local_is_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::Local {
            dir: dir.path().to_path_buf(),
        };

        let result = source.fetch(&Entry::Local(dir.path().join("gone.pdf"))).await;
        assert!(matches!(result, Err(DocumentError::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_no_source_configured() {
        let config = ShiwakeConfig::default();
        assert!(Source::from_config(&config).await.is_err());
    }
}
