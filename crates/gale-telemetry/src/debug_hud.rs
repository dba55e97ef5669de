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

use gale_core::FrameEvent;
use std::collections::VecDeque;
use std::fmt::Write as _;

const FPS_WINDOW: usize = 60;

/// On-demand overlay that tracks frame statistics.
///
/// The engine creates it lazily and feeds it every post-update event; the
/// text it produces is what a renderer draws on top of the frame.
#[derive(Debug, Clone)]
pub struct DebugHud {
    visible: bool,
    frames: u64,
    last_frame_number: u32,
    recent_steps: VecDeque<f32>,
    min_time_step: f32,
    max_time_step: f32,
}

impl DebugHud {
    /// Creates a visible HUD with no statistics.
    pub fn new() -> Self {
        Self {
            visible: true,
            frames: 0,
            last_frame_number: 0,
            recent_steps: VecDeque::with_capacity(FPS_WINDOW),
            min_time_step: f32::INFINITY,
            max_time_step: 0.0,
        }
    }

    /// Records one frame.
    pub fn record(&mut self, event: &FrameEvent) {
        self.frames += 1;
        self.last_frame_number = event.frame_number;

        if event.time_step > 0.0 {
            if self.recent_steps.len() == FPS_WINDOW {
                self.recent_steps.pop_front();
            }
            self.recent_steps.push_back(event.time_step);
            self.min_time_step = self.min_time_step.min(event.time_step);
            self.max_time_step = self.max_time_step.max(event.time_step);
        }
    }

    /// Frames per second averaged over the last 60 recorded frames.
    pub fn average_fps(&self) -> f32 {
        if self.recent_steps.is_empty() {
            return 0.0;
        }
        let total: f32 = self.recent_steps.iter().sum();
        self.recent_steps.len() as f32 / total
    }

    /// Number of frames recorded.
    pub fn frames_recorded(&self) -> u64 {
        self.frames
    }

    /// Frame number of the last recorded frame.
    pub fn last_frame_number(&self) -> u32 {
        self.last_frame_number
    }

    /// Shortest and longest non-zero timestep seen.
    pub fn time_step_range(&self) -> Option<(f32, f32)> {
        (!self.recent_steps.is_empty()).then_some((self.min_time_step, self.max_time_step))
    }

    /// Shows or hides the overlay.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Flips visibility.
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Whether the overlay is drawn.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The overlay text.
    pub fn stats_text(&self) -> String {
        let mut text = String::new();
        let _ = write!(
            text,
            "Frame {}\nFPS {:.1}",
            self.last_frame_number,
            self.average_fps()
        );
        if let Some((min, max)) = self.time_step_range() {
            let _ = write!(
                text,
                "\nTimestep {:.2}..{:.2} ms",
                min * 1000.0,
                max * 1000.0
            );
        }
        text
    }
}

impl Default for DebugHud {
    fn default() -> Self {
        Self::new()
    }
}
