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

//! The engine clock: tick sources, timers and the per-frame [`Time`] state.

mod timer;

pub use timer::{HiresTimer, ManualTicks, SystemTicks, TickSource, Timer};

use crate::event::FrameEvent;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 86_400;

/// Calendar breakdown of a wall-clock instant, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStamp {
    /// Four-digit year.
    pub year: i64,
    /// Month of the year, 1 to 12.
    pub month: u32,
    /// Day of the month, 1 to 31.
    pub day: u32,
    /// Hour, 0 to 23.
    pub hour: u32,
    /// Minute, 0 to 59.
    pub minute: u32,
    /// Second, 0 to 59.
    pub second: u32,
    /// Day of the week, 1 (Monday) to 7 (Sunday).
    pub day_of_week: u32,
    /// Day of the year, 1 to 366.
    pub day_of_year: u32,
}

impl TimeStamp {
    /// Breaks down seconds since the Unix epoch.
    pub fn from_unix_secs(secs: u64) -> Self {
        let days = secs / SECONDS_PER_DAY;
        let seconds_of_day = (secs % SECONDS_PER_DAY) as u32;

        // Days since 0000-03-01, so that leap days fall at the end of a year.
        let shifted = days as i64 + 719_468;
        let era = shifted.div_euclid(146_097);
        let day_of_era = shifted - era * 146_097;
        let year_of_era =
            (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
        let day_of_march_year =
            day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
        let month_index = (5 * day_of_march_year + 2) / 153;
        let day = day_of_march_year - (153 * month_index + 2) / 5 + 1;
        let month = if month_index < 10 {
            month_index + 3
        } else {
            month_index - 9
        };
        let year = year_of_era + era * 400 + i64::from(month <= 2);

        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        let day_of_year = if month <= 2 {
            day_of_march_year - 305
        } else {
            day_of_march_year + 60 + i64::from(leap)
        };

        Self {
            year,
            month: month as u32,
            day: day as u32,
            hour: seconds_of_day / 3_600,
            minute: seconds_of_day / 60 % 60,
            second: seconds_of_day % 60,
            // The epoch fell on a Thursday.
            day_of_week: ((days + 3) % 7) as u32 + 1,
            day_of_year: day_of_year as u32,
        }
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Frame counter and timestep holder.
///
/// The frame number is advanced once per frame and skips zero when it wraps,
/// so zero always means "no frame has run yet".
pub struct Time {
    frame_number: u32,
    time_step: f32,
    timer_period_ms: u32,
    elapsed: Timer,
    ticks: Arc<dyn TickSource>,
}

impl Time {
    /// Creates the clock on top of the given tick source.
    pub fn new(ticks: Arc<dyn TickSource>) -> Self {
        Self {
            frame_number: 0,
            time_step: 0.0,
            timer_period_ms: 0,
            elapsed: Timer::new(Arc::clone(&ticks)),
            ticks,
        }
    }

    /// Starts a new frame with the timestep measured for it.
    pub fn begin_frame(&mut self, time_step: f32) -> FrameEvent {
        self.frame_number = self.frame_number.wrapping_add(1);
        if self.frame_number == 0 {
            self.frame_number = 1;
        }
        self.time_step = time_step;
        log::trace!(
            "Begin frame {} (timestep {:.4}s)",
            self.frame_number,
            self.time_step
        );
        self.frame_event()
    }

    /// Ends the current frame.
    pub fn end_frame(&mut self) -> FrameEvent {
        self.frame_event()
    }

    /// Payload describing the current frame.
    pub fn frame_event(&self) -> FrameEvent {
        FrameEvent {
            frame_number: self.frame_number,
            time_step: self.time_step,
        }
    }

    /// Requests a timer resolution for the low-resolution wall clock.
    ///
    /// The period is recorded for diagnostics; the std clocks used by
    /// [`SystemTicks`] already run at their finest resolution.
    pub fn set_timer_period(&mut self, millis: u32) {
        if self.timer_period_ms != millis {
            log::debug!("Timer period set to {millis} ms");
        }
        self.timer_period_ms = millis;
    }

    /// The frame number, zero before the first frame.
    pub fn frame_number(&self) -> u32 {
        self.frame_number
    }

    /// The timestep of the current frame in seconds.
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// The requested timer period in milliseconds.
    pub fn timer_period(&self) -> u32 {
        self.timer_period_ms
    }

    /// Seconds elapsed since the clock was created.
    pub fn elapsed_time(&mut self) -> f32 {
        self.elapsed.elapsed_millis(false) as f32 / 1000.0
    }

    /// Wall-clock milliseconds, truncated to 32 bits.
    pub fn system_time_millis(&self) -> u32 {
        self.ticks.wall_millis()
    }

    /// Seconds since the Unix epoch.
    pub fn system_time_unix() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since_epoch| since_epoch.as_secs())
            .unwrap_or(0)
    }

    /// The current wall-clock date and time in UTC.
    pub fn time_stamp() -> TimeStamp {
        TimeStamp::from_unix_secs(Self::system_time_unix())
    }

    /// The tick source driving this clock.
    pub fn ticks(&self) -> &Arc<dyn TickSource> {
        &self.ticks
    }
}

impl Drop for Time {
    fn drop(&mut self) {
        self.set_timer_period(0);
    }
}
