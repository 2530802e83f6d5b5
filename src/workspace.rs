//! Sandboxed markdown workspace.
//!
//! The workspace is a directory on disk. Only directories and `.md` files are
//! visible through the store, and every resolved path must stay under the
//! canonical root, no matter whether the escape is spelled as an absolute
//! path, a `..` segment or a symlink.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;

use crate::error::WorkspaceError;

/// Suffix of the only files the store exposes.
pub const MARKDOWN_SUFFIX: &str = ".md";

/// An entry in a workspace directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceEntry {
    pub name: String,
    /// Path relative to the workspace root, `/`-separated.
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// A file read from the workspace.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceFile {
    pub path: String,
    pub content: String,
}

fn is_markdown(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(MARKDOWN_SUFFIX))
}

fn invalid_path() -> WorkspaceError {
    WorkspaceError::InvalidPath("Invalid path".to_string())
}

/// Check a caller-supplied relative path lexically.
///
/// Absolute paths and `..` segments are refused outright; `.` segments and
/// empty segments are dropped.
fn normalize_relative(relative: &str) -> Result<PathBuf, WorkspaceError> {
    let mut normalized = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid_path());
            }
        }
    }
    Ok(normalized)
}

/// Render a normalized relative path with `/` separators.
fn display_relative(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// File-backed markdown workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    /// Open the workspace at `root`, creating the directory if needed.
    ///
    /// The root is canonicalized once here; every later containment check
    /// compares against that canonical path.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        let root = fs::canonicalize(&root).await?;
        Ok(Self { root })
    }

    /// Canonical workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative workspace path to an absolute path inside the root.
    ///
    /// Walks up to the nearest existing ancestor, canonicalizes it so that
    /// symlinks are followed, re-appends the missing tail and verifies the
    /// result still lives under the root.
    pub async fn resolve(&self, relative: &str) -> Result<PathBuf, WorkspaceError> {
        let normalized = normalize_relative(relative)?;
        let joined = self.root.join(&normalized);

        let mut ancestor = joined.as_path();
        let mut tail: Vec<&std::ffi::OsStr> = Vec::new();
        let resolved = loop {
            // symlink_metadata so a dangling link counts as existing and is
            // rejected by canonicalize below instead of being written through.
            if fs::symlink_metadata(ancestor).await.is_ok() {
                let mut resolved = fs::canonicalize(ancestor)
                    .await
                    .map_err(|_| invalid_path())?;
                for part in tail.into_iter().rev() {
                    resolved.push(part);
                }
                break resolved;
            }
            match (ancestor.file_name(), ancestor.parent()) {
                (Some(name), Some(parent)) => {
                    tail.push(name);
                    ancestor = parent;
                }
                _ => return Err(invalid_path()),
            }
        };

        if !resolved.starts_with(&self.root) {
            tracing::warn!(path = %relative, "Rejected path outside the workspace root");
            return Err(invalid_path());
        }
        Ok(resolved)
    }

    /// List the directories and markdown files directly under `relative`.
    ///
    /// Directories come first, then files; each group is ordered by
    /// case-insensitive name.
    pub async fn list(&self, relative: &str) -> Result<Vec<WorkspaceEntry>, WorkspaceError> {
        let dir = self.resolve(relative).await?;
        let base = normalize_relative(relative)?;

        let metadata = match fs::metadata(&dir).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WorkspaceError::NotFound("Path not found".to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            return Err(WorkspaceError::InvalidPath("Not a directory".to_string()));
        }

        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let relative_path = base.join(&name);
            // Links are only listed when their target stays inside the root.
            let is_symlink = entry.file_type().await.is_ok_and(|t| t.is_symlink());
            if is_symlink
                && self
                    .resolve(&display_relative(&relative_path))
                    .await
                    .is_err()
            {
                continue;
            }
            let Ok(metadata) = fs::metadata(&path).await else {
                continue;
            };
            if !metadata.is_dir() && !(metadata.is_file() && is_markdown(&path)) {
                continue;
            }
            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_default();
            entries.push(WorkspaceEntry {
                path: display_relative(&relative_path),
                name,
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified_at,
            });
        }

        entries.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(entries)
    }

    /// Read a markdown file.
    pub async fn read(&self, relative: &str) -> Result<String, WorkspaceError> {
        let full_path = self.resolve(relative).await?;
        let is_file = fs::metadata(&full_path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file || !is_markdown(&full_path) {
            return Err(WorkspaceError::NotFound("File not found".to_string()));
        }
        Ok(fs::read_to_string(&full_path).await?)
    }

    /// Read a markdown file together with the path it was requested under.
    pub async fn read_file(&self, relative: &str) -> Result<WorkspaceFile, WorkspaceError> {
        let content = self.read(relative).await?;
        Ok(WorkspaceFile {
            path: relative.to_string(),
            content,
        })
    }

    /// Write (overwrite or create) a markdown file. The parent directory must exist.
    pub async fn write(&self, relative: &str, content: &str) -> Result<(), WorkspaceError> {
        let full_path = self.resolve(relative).await?;
        let parent_is_dir = match full_path.parent() {
            Some(parent) => fs::metadata(parent)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            None => false,
        };
        if !parent_is_dir {
            return Err(WorkspaceError::InvalidPath(
                "Parent directory does not exist".to_string(),
            ));
        }
        if !is_markdown(&full_path) {
            return Err(WorkspaceError::InvalidPath(
                "Only .md files are allowed".to_string(),
            ));
        }
        fs::write(&full_path, content).await?;
        tracing::debug!(path = %relative, bytes = content.len(), "Wrote workspace file");
        Ok(())
    }
}
