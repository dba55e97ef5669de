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

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of monotonic and wall-clock ticks.
///
/// Timers never read the OS clock directly; they hold a shared tick source so
/// that hosts and tests can substitute a deterministic one.
pub trait TickSource: Send + Sync {
    /// Monotonic time in microseconds since an arbitrary, fixed origin.
    fn now_micros(&self) -> u64;

    /// Wall-clock time in milliseconds, truncated to 32 bits.
    fn wall_millis(&self) -> u32;

    /// Blocks the calling thread for approximately `millis` milliseconds.
    fn sleep_millis(&self, millis: u32);
}

/// The tick source backed by the operating system clocks.
#[derive(Debug, Clone)]
pub struct SystemTicks {
    origin: Instant,
}

impl SystemTicks {
    /// Creates a tick source whose monotonic origin is "now".
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Creates a shared handle to a new system tick source.
    pub fn shared() -> Arc<dyn TickSource> {
        Arc::new(Self::new())
    }
}

impl Default for SystemTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for SystemTicks {
    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    fn wall_millis(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since_epoch| since_epoch.as_millis() as u32)
            .unwrap_or(0)
    }

    fn sleep_millis(&self, millis: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(millis)));
    }
}

/// A manually driven tick source.
///
/// Sleeping advances the clock instead of blocking, and every monotonic query
/// can optionally advance it by a fixed step so that spin-waits terminate.
#[derive(Debug, Default)]
pub struct ManualTicks {
    micros: AtomicU64,
    step_per_query: AtomicU64,
    slept_millis: AtomicU64,
    sleep_calls: AtomicU64,
}

impl ManualTicks {
    /// Creates a manual tick source starting at zero that only moves when told to.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manual tick source that advances by `step` microseconds on every query.
    pub fn with_step(step: u64) -> Self {
        let ticks = Self::default();
        ticks.step_per_query.store(step, Ordering::SeqCst);
        ticks
    }

    /// Moves the clock forward by `micros` microseconds.
    pub fn advance(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }

    /// Total milliseconds requested through [`TickSource::sleep_millis`].
    pub fn slept_millis(&self) -> u64 {
        self.slept_millis.load(Ordering::SeqCst)
    }

    /// Number of calls to [`TickSource::sleep_millis`].
    pub fn sleep_calls(&self) -> u64 {
        self.sleep_calls.load(Ordering::SeqCst)
    }
}

impl TickSource for ManualTicks {
    fn now_micros(&self) -> u64 {
        let step = self.step_per_query.load(Ordering::SeqCst);
        self.micros.fetch_add(step, Ordering::SeqCst) + step
    }

    fn wall_millis(&self) -> u32 {
        (self.micros.load(Ordering::SeqCst) / 1000) as u32
    }

    fn sleep_millis(&self, millis: u32) {
        self.sleep_calls.fetch_add(1, Ordering::SeqCst);
        self.slept_millis
            .fetch_add(u64::from(millis), Ordering::SeqCst);
        self.advance(u64::from(millis) * 1000);
    }
}

/// A low-resolution timer measuring milliseconds on the wall clock.
///
/// The underlying tick is 32 bits wide; elapsed values are computed with
/// wrapping arithmetic so a tick rollover does not produce garbage.
#[derive(Clone)]
pub struct Timer {
    ticks: Arc<dyn TickSource>,
    start: u32,
}

impl Timer {
    /// Creates a timer started at the current tick.
    pub fn new(ticks: Arc<dyn TickSource>) -> Self {
        let start = ticks.wall_millis();
        Self { ticks, start }
    }

    /// Returns the milliseconds elapsed since the last reset, optionally resetting.
    pub fn elapsed_millis(&mut self, reset: bool) -> u32 {
        let now = self.ticks.wall_millis();
        let elapsed = now.wrapping_sub(self.start);
        if reset {
            self.start = now;
        }
        elapsed
    }

    /// Restarts the timer at the current tick.
    pub fn reset(&mut self) {
        self.start = self.ticks.wall_millis();
    }
}

/// A high-resolution timer measuring microseconds on the monotonic clock.
#[derive(Clone)]
pub struct HiresTimer {
    ticks: Arc<dyn TickSource>,
    start: u64,
}

impl HiresTimer {
    /// Creates a timer started at the current tick.
    pub fn new(ticks: Arc<dyn TickSource>) -> Self {
        let start = ticks.now_micros();
        Self { ticks, start }
    }

    /// Returns the microseconds elapsed since the last reset, optionally resetting.
    ///
    /// A tick source that steps backwards yields zero rather than a negative span.
    pub fn elapsed_micros(&mut self, reset: bool) -> u64 {
        let now = self.ticks.now_micros();
        let elapsed = now.saturating_sub(self.start);
        if reset {
            self.start = now;
        }
        elapsed
    }

    /// Restarts the timer at the current tick.
    pub fn reset(&mut self) {
        self.start = self.ticks.now_micros();
    }

    /// The tick source this timer reads.
    pub fn ticks(&self) -> &Arc<dyn TickSource> {
        &self.ticks
    }
}
