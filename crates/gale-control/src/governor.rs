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

//! Frame rate limiting and timestep smoothing.

use gale_core::{HiresTimer, TickSource};
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of frames the timestep is averaged over.
pub const DEFAULT_TIME_STEP_SMOOTHING: usize = 2;
/// Largest accepted smoothing window.
pub const MAX_TIME_STEP_SMOOTHING: usize = 20;
/// Default lower bound on the simulated frame rate.
pub const DEFAULT_MIN_FPS: u32 = 10;
/// Default frame rate cap.
pub const DEFAULT_MAX_FPS: u32 = 200;
/// Default frame rate cap while the window lacks input focus.
pub const DEFAULT_MAX_INACTIVE_FPS: u32 = 60;

const MICROS_PER_SECOND: u64 = 1_000_000;
const MICROS_PER_MILLI: u64 = 1_000;

/// Paces the main loop and produces the timestep the next frame simulates.
///
/// Once per frame [`apply_frame_limit`](Self::apply_frame_limit) waits until
/// the frame has taken at least `1 / cap` seconds, measures the frame, clamps
/// the measurement to `1 / min_fps` and averages it with the previous few
/// frames. The result is the timestep of the following frame.
pub struct FrameGovernor {
    frame_timer: HiresTimer,
    min_fps: u32,
    max_fps: u32,
    max_inactive_fps: u32,
    time_step_smoothing: usize,
    last_time_steps: VecDeque<f32>,
    time_step: f32,
}

impl FrameGovernor {
    /// Creates a governor with the default limits, timing frames on `ticks`.
    pub fn new(ticks: Arc<dyn TickSource>) -> Self {
        Self {
            frame_timer: HiresTimer::new(ticks),
            min_fps: DEFAULT_MIN_FPS,
            max_fps: DEFAULT_MAX_FPS,
            max_inactive_fps: DEFAULT_MAX_INACTIVE_FPS,
            time_step_smoothing: DEFAULT_TIME_STEP_SMOOTHING,
            last_time_steps: VecDeque::with_capacity(MAX_TIME_STEP_SMOOTHING + 1),
            time_step: 0.0,
        }
    }

    /// The frame rate cap that applies given the window's focus state.
    /// Zero means uncapped.
    pub fn effective_max_fps(&self, has_focus: bool) -> u32 {
        if has_focus {
            self.max_fps
        } else {
            self.max_fps.min(self.max_inactive_fps)
        }
    }

    /// Waits out the rest of the frame, measures it and updates the smoothed
    /// timestep, which is returned.
    ///
    /// While a millisecond or more remains the thread sleeps for the whole
    /// milliseconds left; the final fraction is spent spinning on the clock.
    pub fn apply_frame_limit(&mut self, has_focus: bool) -> f32 {
        let max_fps = self.effective_max_fps(has_focus);

        if max_fps > 0 {
            let target = MICROS_PER_SECOND / u64::from(max_fps);
            loop {
                let elapsed = self.frame_timer.elapsed_micros(false);
                if elapsed >= target {
                    break;
                }
                let remaining = target - elapsed;
                if remaining >= MICROS_PER_MILLI {
                    let millis = u32::try_from(remaining / MICROS_PER_MILLI).unwrap_or(u32::MAX);
                    self.frame_timer.ticks().sleep_millis(millis);
                } else {
                    std::hint::spin_loop();
                }
            }
        }

        let mut elapsed = self.frame_timer.elapsed_micros(true);
        if self.min_fps > 0 {
            elapsed = elapsed.min(MICROS_PER_SECOND / u64::from(self.min_fps));
        }

        self.push_time_step(elapsed as f32 / MICROS_PER_SECOND as f32);
        self.time_step
    }

    fn push_time_step(&mut self, step: f32) {
        self.last_time_steps.push_back(step);
        self.truncate_history();
        let sum: f32 = self.last_time_steps.iter().sum();
        self.time_step = sum / self.last_time_steps.len() as f32;
    }

    fn truncate_history(&mut self) {
        while self.last_time_steps.len() > self.time_step_smoothing {
            self.last_time_steps.pop_front();
        }
    }

    /// Sets how many frames the timestep is averaged over, clamped to `1..=20`.
    /// Older samples beyond the new window are discarded immediately.
    pub fn set_time_step_smoothing(&mut self, frames: usize) {
        self.time_step_smoothing = frames.clamp(1, MAX_TIME_STEP_SMOOTHING);
        self.truncate_history();
    }

    /// Sets the lowest simulated frame rate; zero disables the clamp.
    pub fn set_min_fps(&mut self, fps: u32) {
        self.min_fps = fps;
    }

    /// Sets the frame rate cap; zero means uncapped.
    pub fn set_max_fps(&mut self, fps: u32) {
        self.max_fps = fps;
    }

    /// Sets the cap used while the window lacks input focus.
    pub fn set_max_inactive_fps(&mut self, fps: u32) {
        self.max_inactive_fps = fps;
    }

    /// Overrides the timestep the next frame simulates. Negative values become zero.
    pub fn set_next_time_step(&mut self, seconds: f32) {
        self.time_step = seconds.max(0.0);
    }

    /// Restarts frame timing and forgets the smoothing history.
    pub fn reset(&mut self) {
        self.frame_timer.reset();
        self.last_time_steps.clear();
    }

    /// The smoothed timestep in seconds.
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// The minimum simulated frame rate.
    pub fn min_fps(&self) -> u32 {
        self.min_fps
    }

    /// The frame rate cap.
    pub fn max_fps(&self) -> u32 {
        self.max_fps
    }

    /// The frame rate cap while unfocused.
    pub fn max_inactive_fps(&self) -> u32 {
        self.max_inactive_fps
    }

    /// The smoothing window in frames.
    pub fn time_step_smoothing(&self) -> usize {
        self.time_step_smoothing
    }

    /// Raw (clamped) samples currently in the smoothing window, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.last_time_steps.iter().copied()
    }
}
