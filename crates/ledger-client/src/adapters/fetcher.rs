//! Chaincode source fetcher reading from the local filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::{ChaincodeSource, FetchError, SourceFile};
use crate::ports::Fetcher;

/// Where a platform keeps chaincode sources under the root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceLayout {
    /// Go workspace: `<root>/src/<import path>`.
    #[default]
    Golang,
}

impl SourceLayout {
    fn repository_dir(&self, root: &Path, repository: &str) -> PathBuf {
        match self {
            SourceLayout::Golang => root.join("src").join(repository),
        }
    }
}

/// Reads chaincode sources from disk.
#[derive(Clone, Debug)]
pub struct LocalFetcher {
    layout: SourceLayout,
    root: PathBuf,
}

impl LocalFetcher {
    /// Fetcher rooted at the first `GOPATH` entry, or the working directory.
    pub fn new(layout: SourceLayout) -> Self {
        let root = std::env::var_os("GOPATH")
            .and_then(|paths| std::env::split_paths(&paths).next())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_root(layout, root)
    }

    /// Fetcher rooted at `root`.
    pub fn with_root(layout: SourceLayout, root: impl Into<PathBuf>) -> Self {
        Self {
            layout,
            root: root.into(),
        }
    }

    /// Source root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn read_tree(dir: &Path, repository: &str) -> Result<Vec<SourceFile>, FetchError> {
    if !dir.is_dir() {
        return Err(FetchError::NotFound(repository.to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| FetchError::Io {
            path: dir.display().to_string(),
            error: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let content = std::fs::read(entry.path()).map_err(|e| FetchError::Io {
            path: entry.path().display().to_string(),
            error: e.to_string(),
        })?;
        let path = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.push(SourceFile { path, content });
    }
    Ok(files)
}

#[async_trait]
impl Fetcher for LocalFetcher {
    async fn fetch(
        &self,
        ctx: &CancellationToken,
        repository: &str,
        version: &str,
    ) -> Result<ChaincodeSource, FetchError> {
        if ctx.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let dir = self.layout.repository_dir(&self.root, repository);
        let repo = repository.to_string();
        let walk = tokio::task::spawn_blocking(move || read_tree(&dir, &repo));

        let files = tokio::select! {
            _ = ctx.cancelled() => return Err(FetchError::Cancelled),
            joined = walk => joined.map_err(|e| FetchError::Io {
                path: repository.to_string(),
                error: e.to_string(),
            })??,
        };

        debug!(repository, version, files = files.len(), "chaincode source fetched");
        Ok(ChaincodeSource {
            repository: repository.to_string(),
            version: version.to_string(),
            files,
        })
    }
}
