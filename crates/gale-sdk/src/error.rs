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

use gale_core::platform::GraphicsError;
use gale_io::ResourceError;
use thiserror::Error;

/// Reasons engine initialization fails.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A configured resource path or package could not be resolved.
    #[error(transparent)]
    Resources(#[from] ResourceError),

    /// The graphics device refused the requested display mode.
    #[error(transparent)]
    DisplayMode(#[from] GraphicsError),

    /// A subsystem initialization depends on has been removed from the registry.
    #[error("Required subsystem {0} is not registered")]
    MissingSubsystem(&'static str),

    /// An earlier initialization attempt failed; the engine cannot be initialized again.
    #[error("Engine initialization failed previously and cannot be retried")]
    InitializationFailed,
}
