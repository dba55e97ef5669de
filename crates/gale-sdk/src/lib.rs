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

//! # Gale SDK
//!
//! The engine facade embedding applications drive. [`Engine`] owns the
//! subsystem registry, the clock and the frame governor; the host calls
//! [`Engine::initialize`] once and then [`Engine::run_frame`] until
//! [`Engine::is_exiting`] reports `true`.

#![warn(missing_docs)]

mod engine;
mod error;
mod null_platform;
mod subsystems;

pub use engine::{Engine, EngineState};
pub use error::EngineError;
pub use null_platform::NullPlatform;
pub use subsystems::{Audio, Graphics, Input, Renderer, Ui};

/// Commonly used engine types.
pub mod prelude {
    pub use crate::{
        Audio, Engine, EngineError, EngineState, Graphics, Input, NullPlatform, Renderer, Ui,
    };
    pub use gale_core::config::{parameters_from_env_args, parse_parameters};
    pub use gale_core::platform::Platform;
    pub use gale_core::{
        FrameEvent, FramePhase, ParameterTable, SubscriptionId, SubsystemRegistry, SystemEvent,
        Variant,
    };
    pub use gale_io::{FileSystem, ResourceCache};
    pub use gale_telemetry::{DebugHud, Profiler};
}
