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
use crate::package::{PackageEntry, PackageFile};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// One place resources are looked up in.
#[derive(Debug, Clone)]
pub enum ResourceSource {
    /// A directory on disk.
    Directory(PathBuf),
    /// An opened package archive.
    Package(PackageFile),
}

impl ResourceSource {
    /// Path of the directory or archive.
    pub fn path(&self) -> &Path {
        match self {
            ResourceSource::Directory(path) => path,
            ResourceSource::Package(package) => package.path(),
        }
    }

    fn is_same_source(&self, other: &ResourceSource) -> bool {
        matches!(
            (self, other),
            (ResourceSource::Directory(_), ResourceSource::Directory(_))
                | (ResourceSource::Package(_), ResourceSource::Package(_))
        ) && self.path() == other.path()
    }
}

/// Where [`ResourceCache::find_file`] located a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    /// A loose file at this path.
    File(PathBuf),
    /// An entry of the package at `package`.
    Packaged {
        /// Archive holding the entry.
        package: PathBuf,
        /// Index entry of the resource.
        entry: PackageEntry,
    },
}

/// The ordered set of resource sources.
///
/// Lookups walk the sources front to back and the first source containing a
/// name wins, so earlier sources shadow later ones. Directories and packages
/// share one ordering.
#[derive(Debug, Default)]
pub struct ResourceCache {
    sources: Vec<ResourceSource>,
}

impl ResourceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource directory. Returns `false` if it was already present.
    pub fn add_resource_dir(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(ResourceError::DirectoryNotFound(path.to_path_buf()));
        }
        let added = self.insert_source(self.sources.len(), ResourceSource::Directory(path.to_path_buf()));
        if added {
            log::info!("Added resource path {}", path.display());
        }
        Ok(added)
    }

    /// Appends an opened package. Returns `false` if it was already present.
    pub fn add_package_file(&mut self, package: PackageFile) -> bool {
        let path = package.path().to_path_buf();
        let added = self.insert_source(self.sources.len(), ResourceSource::Package(package));
        if added {
            log::info!("Added resource package {}", path.display());
        }
        added
    }

    /// Inserts a source at `index` (clamped to the end). A source already in
    /// the cache keeps its position and `false` is returned.
    pub fn insert_source(&mut self, index: usize, source: ResourceSource) -> bool {
        if self.sources.iter().any(|existing| existing.is_same_source(&source)) {
            return false;
        }
        let index = index.min(self.sources.len());
        self.sources.insert(index, source);
        true
    }

    /// Removes a resource directory. Returns `true` if it was present.
    pub fn remove_resource_dir(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.remove_where(|source| matches!(source, ResourceSource::Directory(dir) if dir == path))
    }

    /// Removes a package. Returns `true` if it was present.
    pub fn remove_package_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.remove_where(
            |source| matches!(source, ResourceSource::Package(package) if package.path() == path),
        )
    }

    /// Removes every source.
    pub fn remove_all(&mut self) {
        self.sources.clear();
    }

    /// All sources in lookup order.
    pub fn sources(&self) -> &[ResourceSource] {
        &self.sources
    }

    /// Resource directories in lookup order.
    pub fn resource_dirs(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter_map(|source| match source {
                ResourceSource::Directory(path) => Some(path.as_path()),
                ResourceSource::Package(_) => None,
            })
            .collect()
    }

    /// Packages in lookup order.
    pub fn package_files(&self) -> Vec<&PackageFile> {
        self.sources
            .iter()
            .filter_map(|source| match source {
                ResourceSource::Package(package) => Some(package),
                ResourceSource::Directory(_) => None,
            })
            .collect()
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` when the cache has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Finds the first source containing `name`.
    pub fn find_file(&self, name: &str) -> Option<ResourceLocation> {
        let relative = name.replace('\\', "/");
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() || relative.split('/').any(|part| part == "..") {
            log::warn!("Refusing to look up resource '{name}'");
            return None;
        }

        self.sources.iter().find_map(|source| match source {
            ResourceSource::Directory(dir) => {
                let candidate = dir.join(relative);
                candidate.is_file().then_some(ResourceLocation::File(candidate))
            }
            ResourceSource::Package(package) => {
                package.entry(relative).map(|entry| ResourceLocation::Packaged {
                    package: package.path().to_path_buf(),
                    entry: *entry,
                })
            }
        })
    }

    /// Reads the bytes of the first match for `name`.
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        match self.find_file(name) {
            Some(ResourceLocation::File(path)) => Ok(fs::read(path)?),
            Some(ResourceLocation::Packaged { package, .. }) => self
                .package_files()
                .into_iter()
                .find(|candidate| candidate.path() == package)
                .ok_or_else(|| ResourceError::NotFound(name.to_string()))?
                .read(name),
            None => Err(ResourceError::NotFound(name.to_string())),
        }
    }

    /// Human-readable listing of the sources in lookup order.
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        let _ = writeln!(summary, "Resource sources ({}):", self.sources.len());
        for (index, source) in self.sources.iter().enumerate() {
            let _ = match source {
                ResourceSource::Directory(path) => {
                    writeln!(summary, "  {index}: dir  {}", path.display())
                }
                ResourceSource::Package(package) => writeln!(
                    summary,
                    "  {index}: pak  {} ({} files, {} bytes)",
                    package.path().display(),
                    package.num_files(),
                    package.total_size()
                ),
            };
        }
        summary
    }

    fn remove_where(&mut self, predicate: impl Fn(&ResourceSource) -> bool) -> bool {
        let before = self.sources.len();
        self.sources.retain(|source| !predicate(source));
        self.sources.len() != before
    }
}
