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

//! # Gale Core
//!
//! Foundational crate containing the subsystem registry, the clock, the
//! engine configuration model and the frame-phase contracts that every other
//! engine crate builds on.

#![warn(missing_docs)]

pub mod config;
pub mod event;
pub mod platform;
pub mod service_registry;
pub mod time;

pub use config::{EngineParameters, ParameterTable, Variant};
pub use event::{FrameEvent, FramePhase, PhaseDispatcher, SubscriptionId, SystemEvent};
pub use service_registry::SubsystemRegistry;
pub use time::{HiresTimer, ManualTicks, SystemTicks, TickSource, Time, TimeStamp, Timer};
