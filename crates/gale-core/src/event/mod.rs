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

//! Frame-lifecycle notifications and host-originated system events.

mod bus;
mod phase;

pub use bus::EventBus;
pub use phase::{PhaseCallback, PhaseDispatcher, SubscriptionId};

/// The named points of a frame at which subscribers are notified.
///
/// Phases are dispatched in declaration order; every subscriber of a phase
/// returns before the first subscriber of the next phase runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// The frame counter has advanced and the timestep is stamped.
    BeginFrame,
    /// Logic update.
    Update,
    /// Logic post-update.
    PostUpdate,
    /// Rendering update.
    RenderUpdate,
    /// Post-render update.
    PostRenderUpdate,
    /// The frame has been rendered and limited.
    EndFrame,
}

impl FramePhase {
    /// Number of phases.
    pub const COUNT: usize = 6;

    /// All phases in dispatch order.
    pub const ALL: [FramePhase; FramePhase::COUNT] = [
        FramePhase::BeginFrame,
        FramePhase::Update,
        FramePhase::PostUpdate,
        FramePhase::RenderUpdate,
        FramePhase::PostRenderUpdate,
        FramePhase::EndFrame,
    ];

    /// The four logic phases run by the engine's update step.
    pub const UPDATE: [FramePhase; 4] = [
        FramePhase::Update,
        FramePhase::PostUpdate,
        FramePhase::RenderUpdate,
        FramePhase::PostRenderUpdate,
    ];

    /// A stable, human-readable name for the phase.
    pub fn name(self) -> &'static str {
        match self {
            FramePhase::BeginFrame => "BeginFrame",
            FramePhase::Update => "Update",
            FramePhase::PostUpdate => "PostUpdate",
            FramePhase::RenderUpdate => "RenderUpdate",
            FramePhase::PostRenderUpdate => "PostRenderUpdate",
            FramePhase::EndFrame => "EndFrame",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Payload delivered with every frame-phase notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
    /// The frame counter; never zero once a frame has begun.
    pub frame_number: u32,
    /// The timestep for this frame in seconds.
    pub time_step: f32,
}

/// Events raised outside the frame loop, typically by the host or windowing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    /// The operating system or user asked the application to close.
    ExitRequested,
}
