use std::{
    fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A file or directory directly inside a workspace directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub executable: bool,
}

pub struct Workspace {
    pub root: PathBuf,
    vcs_dir: String,
}

impl Workspace {
    pub fn new(path: PathBuf, vcs_dir: impl Into<String>) -> Self {
        Self {
            root: path,
            vcs_dir: vcs_dir.into(),
        }
    }

    /// Lists `dir` one level deep, skipping the repository's own directory,
    /// in tree order: bytewise by name, directories compared as `name/`.
    pub fn list_dir(&self, dir: &Path) -> Result<Vec<WorkspaceEntry>> {
        let db_path = self.root.join(&self.vcs_dir);

        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !e.path().starts_with(&db_path))
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                Error::Filesystem {
                    path,
                    source: e.into(),
                }
            })?;
            let metadata = entry.metadata().map_err(|e| Error::Filesystem {
                path: entry.path().to_path_buf(),
                source: e.into(),
            })?;

            entries.push(WorkspaceEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                is_dir: metadata.is_dir(),
                executable: is_executable(&metadata),
            });
        }

        entries.sort_by_cached_key(|entry| {
            let mut key = entry.name.clone().into_bytes();
            if entry.is_dir {
                key.push(b'/');
            }
            key
        });
        Ok(entries)
    }

    pub fn read_file(&self, path: &Path) -> Result<String> {
        let path = self.root.join(path);
        fs::read_to_string(&path).map_err(Error::filesystem(path))
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}
