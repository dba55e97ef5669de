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

//! Turns configured path specs into resource sources.
//!
//! Resolution has two steps. [`ResourcePathResolver::resolve`] inspects the
//! file system and opens every package it finds, producing a
//! [`ResourcePlan`] without touching any cache. [`ResourcePlan::apply`] then
//! commits the plan, which cannot fail, so an unresolved spec never leaves a
//! cache half-populated.

use crate::cache::{ResourceCache, ResourceSource};
use crate::error::{ResourceError, Result};
use crate::filesystem::{FileSystemAccess, ScanKind};
use crate::package::{PackageFile, PACKAGE_EXTENSION};
use gale_core::EngineParameters;
use std::path::{Path, PathBuf};

/// Resolves prefix paths, resource paths, packages and autoload folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePathResolver {
    prefix_paths: Vec<String>,
    resource_paths: Vec<String>,
    resource_packages: Vec<String>,
    autoload_paths: Vec<String>,
    default_autoload: bool,
}

impl ResourcePathResolver {
    /// Creates a resolver from already split spec lists.
    pub fn new(
        prefix_paths: Vec<String>,
        resource_paths: Vec<String>,
        resource_packages: Vec<String>,
        autoload_paths: Vec<String>,
    ) -> Self {
        Self {
            prefix_paths,
            resource_paths,
            resource_packages,
            autoload_paths,
            default_autoload: false,
        }
    }

    /// Creates a resolver from the engine's typed parameters.
    ///
    /// A missing autoload folder is only reported when the autoload paths
    /// were configured rather than left at their default.
    pub fn from_parameters(parameters: &EngineParameters) -> Self {
        let mut resolver = Self::new(
            parameters.resource_prefix_paths.clone(),
            parameters.resource_paths.clone(),
            parameters.resource_packages.clone(),
            parameters.autoload_paths.clone(),
        );
        resolver.default_autoload = parameters.autoload_is_default();
        resolver
    }

    /// Normalized prefix paths: relative ones are anchored at the program
    /// directory (an empty prefix is the program directory itself).
    pub fn prefix_paths(&self, fs: &dyn FileSystemAccess) -> Vec<PathBuf> {
        let program_dir = fs.program_dir();
        self.prefix_paths
            .iter()
            .map(|prefix| {
                let prefix = Path::new(prefix);
                if prefix.is_absolute() {
                    prefix.to_path_buf()
                } else {
                    program_dir.join(prefix)
                }
            })
            .collect()
    }

    /// Works out every source the specs name.
    ///
    /// Explicit resource paths are evaluated first, then explicit packages,
    /// then autoload folders. The first spec that cannot be satisfied aborts
    /// resolution with an error naming it.
    pub fn resolve(&self, fs: &dyn FileSystemAccess) -> Result<ResourcePlan> {
        let prefixes = self.prefix_paths(fs);
        let mut plan = ResourcePlan::default();

        for spec in &self.resource_paths {
            self.resolve_resource_path(fs, &prefixes, spec, &mut plan)?;
        }

        for spec in &self.resource_packages {
            let found = prefixes
                .iter()
                .map(|prefix| prefix.join(spec))
                .find(|candidate| fs.file_exists(candidate));
            let Some(path) = found else {
                return Err(ResourceError::PackageNotFound(spec.clone()));
            };
            plan.push_explicit(ResourceSource::Package(PackageFile::open(path)?));
        }

        for spec in &self.autoload_paths {
            self.resolve_autoload(fs, &prefixes, spec, &mut plan)?;
        }

        Ok(plan)
    }

    fn resolve_resource_path(
        &self,
        fs: &dyn FileSystemAccess,
        prefixes: &[PathBuf],
        spec: &str,
        plan: &mut ResourcePlan,
    ) -> Result<()> {
        let spec_path = Path::new(spec);
        if spec_path.is_absolute() {
            if fs.dir_exists(spec_path) {
                plan.push_explicit(ResourceSource::Directory(spec_path.to_path_buf()));
            } else {
                log::debug!("Skipped resource path {spec} as it does not exist");
            }
            return Ok(());
        }

        for prefix in prefixes {
            let package = prefix.join(format!("{spec}.{PACKAGE_EXTENSION}"));
            if fs.file_exists(&package) {
                plan.push_explicit(ResourceSource::Package(PackageFile::open(package)?));
                return Ok(());
            }
            let dir = prefix.join(spec);
            if fs.dir_exists(&dir) {
                plan.push_explicit(ResourceSource::Directory(dir));
                return Ok(());
            }
        }

        Err(ResourceError::ResourcePathNotFound(spec.to_string()))
    }

    fn resolve_autoload(
        &self,
        fs: &dyn FileSystemAccess,
        prefixes: &[PathBuf],
        spec: &str,
        plan: &mut ResourcePlan,
    ) -> Result<()> {
        let mut found = false;
        for prefix in prefixes {
            // Joining an absolute spec yields the spec itself.
            let root = prefix.join(spec);
            if !fs.dir_exists(&root) {
                continue;
            }
            found = true;

            for name in fs.scan_dir(&root, ScanKind::Directories, None)? {
                if name.starts_with('.') {
                    continue;
                }
                plan.push_autoload(ResourceSource::Directory(root.join(name)));
            }

            for name in fs.scan_dir(&root, ScanKind::Files, Some(PACKAGE_EXTENSION))? {
                if name.starts_with('.') {
                    continue;
                }
                plan.push_autoload(ResourceSource::Package(PackageFile::open(root.join(name))?));
            }
        }

        if !found {
            if !self.default_autoload {
                log::debug!("Skipped autoload path '{spec}' as it does not exist");
            }
            plan.missing_autoload.push(spec.to_string());
        }
        Ok(())
    }
}

/// The sources a resolution found, ready to be committed to a cache.
#[derive(Debug, Default)]
pub struct ResourcePlan {
    autoload: Vec<ResourceSource>,
    explicit: Vec<ResourceSource>,
    missing_autoload: Vec<String>,
}

impl ResourcePlan {
    /// Sources discovered in autoload folders, in discovery order.
    pub fn autoload_sources(&self) -> &[ResourceSource] {
        &self.autoload
    }

    /// Sources named by explicit resource path and package specs.
    pub fn explicit_sources(&self) -> &[ResourceSource] {
        &self.explicit
    }

    /// Autoload specs that exist under none of the prefix paths.
    pub fn missing_autoload_paths(&self) -> &[String] {
        &self.missing_autoload
    }

    /// Returns `true` if nothing was found.
    pub fn is_empty(&self) -> bool {
        self.autoload.is_empty() && self.explicit.is_empty()
    }

    /// Commits the plan. Autoload sources go to the front of the cache, ahead
    /// of anything already there, and explicit sources go to the back, so
    /// autoloaded content shadows explicitly configured content.
    pub fn apply(self, cache: &mut ResourceCache) {
        let mut position = 0;
        for source in self.autoload {
            log::info!("Added autoload resource {}", source.path().display());
            if cache.insert_source(position, source) {
                position += 1;
            }
        }
        for source in self.explicit {
            log::info!("Added resource {}", source.path().display());
            cache.insert_source(usize::MAX, source);
        }
    }

    fn push_explicit(&mut self, source: ResourceSource) {
        push_unique(&mut self.explicit, source);
    }

    fn push_autoload(&mut self, source: ResourceSource) {
        push_unique(&mut self.autoload, source);
    }
}

fn push_unique(sources: &mut Vec<ResourceSource>, source: ResourceSource) {
    if !sources.iter().any(|existing| existing.path() == source.path()) {
        sources.push(source);
    }
}
