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

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving, opening or reading resource sources.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A relative resource path spec matched nothing under any prefix path.
    #[error("Failed to add resource path '{0}', check the resource prefix paths")]
    ResourcePathNotFound(String),

    /// A package spec matched no file under any prefix path.
    #[error("Failed to add resource package '{0}', check the resource prefix paths")]
    PackageNotFound(String),

    /// A directory handed to the cache does not exist.
    #[error("Resource directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The file is not a package archive or its index is damaged.
    #[error("'{}' is not a valid package file: {reason}", .path.display())]
    InvalidPackage {
        /// Path of the offending archive.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A compressed entry's block stream could not be decoded.
    #[error("Package entry '{name}' is corrupt: {reason}")]
    CorruptEntry {
        /// Entry being read.
        name: String,
        /// What was wrong with its blocks.
        reason: String,
    },

    /// No source contains the requested resource.
    #[error("Resource '{0}' not found")]
    NotFound(String),

    /// Scanning a directory failed.
    #[error("Failed to scan '{}': {reason}", .path.display())]
    Scan {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;
