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

//! Resource sourcing for the engine.
//!
//! This crate owns everything between a list of configured path specs and the
//! bytes of a resource: native file system queries ([`FileSystem`]), the
//! package archive format ([`PackageFile`]), the ordered set of resource sources
//! used for lookups ([`ResourceCache`]) and the algorithm that turns prefix,
//! path, package and autoload specs into that set ([`ResourcePathResolver`]).

#![warn(missing_docs)]

mod cache;
mod error;
mod filesystem;
mod package;
mod resolver;

pub use cache::{ResourceCache, ResourceLocation, ResourceSource};
pub use error::{ResourceError, Result};
pub use filesystem::{FileSystem, FileSystemAccess, ScanKind};
pub use package::{PackageEntry, PackageFile, PACKAGE_EXTENSION};
pub use resolver::{ResourcePathResolver, ResourcePlan};
