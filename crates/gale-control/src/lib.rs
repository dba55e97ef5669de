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

//! # Gale Control
//!
//! Pacing and background execution: the [`FrameGovernor`] that caps the frame
//! rate and smooths the simulation timestep, and the [`WorkQueue`] worker pool
//! subsystems hand parallel work to.

#![warn(missing_docs)]

mod governor;
mod work_queue;

pub use governor::{
    FrameGovernor, DEFAULT_MAX_FPS, DEFAULT_MAX_INACTIVE_FPS, DEFAULT_MIN_FPS,
    DEFAULT_TIME_STEP_SMOOTHING, MAX_TIME_STEP_SMOOTHING,
};
pub use work_queue::WorkQueue;
