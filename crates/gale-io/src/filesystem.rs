// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{ResourceError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What [`FileSystemAccess::scan_dir`] should list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// Regular files.
    Files,
    /// Directories.
    Directories,
}

/// The file system queries the resource resolver relies on.
///
/// The engine registers the native [`FileSystem`]; tests and embedders can
/// supply their own view.
pub trait FileSystemAccess {
    /// Directory containing the running program. Relative prefix paths are
    /// resolved against it.
    fn program_dir(&self) -> PathBuf;

    /// Returns `true` if `path` names an existing regular file.
    fn file_exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` names an existing directory.
    fn dir_exists(&self, path: &Path) -> bool;

    /// Lists the names of the immediate children of `path` of the given kind,
    /// sorted by name. With `extension` set, only names with that extension
    /// are returned.
    fn scan_dir(&self, path: &Path, kind: ScanKind, extension: Option<&str>)
        -> Result<Vec<String>>;
}

/// Native file system subsystem.
#[derive(Debug, Clone)]
pub struct FileSystem {
    program_dir: PathBuf,
}

impl FileSystem {
    /// Creates the file system view, locating the program directory from the
    /// running executable (falling back to the working directory).
    pub fn new() -> Self {
        let program_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self { program_dir }
    }

    /// Creates a view with an explicit program directory.
    pub fn with_program_dir(program_dir: impl Into<PathBuf>) -> Self {
        Self {
            program_dir: program_dir.into(),
        }
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemAccess for FileSystem {
    fn program_dir(&self) -> PathBuf {
        self.program_dir.clone()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn scan_dir(
        &self,
        path: &Path,
        kind: ScanKind,
        extension: Option<&str>,
    ) -> Result<Vec<String>> {
        let walker = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut names = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|err| ResourceError::Scan {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

            let file_type = entry.file_type();
            let wanted = match kind {
                ScanKind::Files => file_type.is_file(),
                ScanKind::Directories => file_type.is_dir(),
            };
            if !wanted {
                continue;
            }

            if let Some(extension) = extension {
                let matches = entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
                if !matches {
                    continue;
                }
            }

            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            } else {
                log::warn!("Skipping non UTF-8 entry in '{}'", path.display());
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scan_lists_immediate_children_sorted() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("b")).unwrap();
        fs::create_dir(root.path().join("a")).unwrap();
        fs::create_dir_all(root.path().join("a/nested")).unwrap();
        fs::write(root.path().join("z.pak"), b"").unwrap();
        fs::write(root.path().join("notes.txt"), b"").unwrap();

        let fs_view = FileSystem::with_program_dir(root.path());
        let dirs = fs_view
            .scan_dir(root.path(), ScanKind::Directories, None)
            .unwrap();
        assert_eq!(dirs, vec!["a", "b"]);

        let files = fs_view.scan_dir(root.path(), ScanKind::Files, None).unwrap();
        assert_eq!(files, vec!["notes.txt", "z.pak"]);

        let packages = fs_view
            .scan_dir(root.path(), ScanKind::Files, Some("pak"))
            .unwrap();
        assert_eq!(packages, vec!["z.pak"]);
    }

    #[test]
    fn scanning_a_missing_directory_fails() {
        let root = tempdir().unwrap();
        let fs_view = FileSystem::with_program_dir(root.path());
        let result = fs_view.scan_dir(&root.path().join("missing"), ScanKind::Files, None);
        assert!(matches!(result, Err(ResourceError::Scan { .. })));
    }

    #[test]
    fn existence_checks_distinguish_files_and_directories() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("file.bin"), b"x").unwrap();
        let fs_view = FileSystem::with_program_dir(root.path());

        assert!(fs_view.file_exists(&root.path().join("file.bin")));
        assert!(!fs_view.dir_exists(&root.path().join("file.bin")));
        assert!(fs_view.dir_exists(root.path()));
        assert_eq!(fs_view.program_dir(), root.path());
    }
}
