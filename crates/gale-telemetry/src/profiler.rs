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

//! Hierarchical per-frame timing.
//!
//! Every frame is measured as a root block named [`ROOT_BLOCK`]. Blocks opened
//! inside it become its children, and a block name opened under the same
//! parent always maps to the same entry. Timings are kept per frame, per
//! interval (since [`Profiler::begin_interval`]) and in total.

use gale_core::TickSource;
use std::fmt::Write;
use std::sync::Arc;

/// Name of the block measuring a whole frame.
pub const ROOT_BLOCK: &str = "RunFrame";

/// Accumulated timings of one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    /// Times the block was entered.
    pub count: u32,
    /// Time spent in the block, in microseconds.
    pub time_micros: u64,
    /// Longest single visit, in microseconds.
    pub max_micros: u64,
}

impl BlockStats {
    /// Mean time per visit in microseconds, zero when never entered.
    pub fn average_micros(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.time_micros as f64 / f64::from(self.count)
        }
    }

    fn record(&mut self, micros: u64) {
        self.count = self.count.saturating_add(1);
        self.time_micros = self.time_micros.saturating_add(micros);
        self.max_micros = self.max_micros.max(micros);
    }

    fn merge(&mut self, other: &BlockStats) {
        self.count = self.count.saturating_add(other.count);
        self.time_micros = self.time_micros.saturating_add(other.time_micros);
        self.max_micros = self.max_micros.max(other.max_micros);
    }
}

/// One named node of the block tree.
#[derive(Debug, Clone)]
pub struct ProfilerBlock {
    name: &'static str,
    parent: Option<usize>,
    depth: usize,
    frame: BlockStats,
    interval: BlockStats,
    total: BlockStats,
}

impl ProfilerBlock {
    /// The block name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Nesting depth, zero for the frame block.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Timings of the last completed frame.
    pub fn frame(&self) -> &BlockStats {
        &self.frame
    }

    /// Timings since the current interval began.
    pub fn interval(&self) -> &BlockStats {
        &self.interval
    }

    /// Timings since the profiler was created.
    pub fn total(&self) -> &BlockStats {
        &self.total
    }
}

/// Frame profiler driven by the engine's frame loop.
pub struct Profiler {
    ticks: Arc<dyn TickSource>,
    blocks: Vec<ProfilerBlock>,
    open: Vec<(usize, u64)>,
    frames: u64,
    interval_frames: u32,
}

impl Profiler {
    /// Creates a profiler timing blocks with `ticks`.
    pub fn new(ticks: Arc<dyn TickSource>) -> Self {
        Self {
            ticks,
            blocks: Vec::new(),
            open: Vec::new(),
            frames: 0,
            interval_frames: 0,
        }
    }

    /// Starts measuring a frame. A frame still open is ended first.
    pub fn begin_frame(&mut self) {
        if !self.open.is_empty() {
            self.end_frame();
        }
        for block in &mut self.blocks {
            block.frame = BlockStats::default();
        }
        self.begin_block(ROOT_BLOCK);
    }

    /// Ends the frame, closing any block left open, and folds its timings
    /// into the interval and total figures.
    pub fn end_frame(&mut self) {
        if self.open.is_empty() {
            return;
        }
        while !self.open.is_empty() {
            self.end_block();
        }
        for block in &mut self.blocks {
            let frame = block.frame;
            block.interval.merge(&frame);
            block.total.merge(&frame);
        }
        self.frames += 1;
        self.interval_frames = self.interval_frames.saturating_add(1);
    }

    /// Opens a block under the innermost open one. Ignored outside a frame,
    /// except for the frame block itself.
    pub fn begin_block(&mut self, name: &'static str) {
        let parent = self.open.last().map(|&(index, _)| index);
        if parent.is_none() && name != ROOT_BLOCK {
            log::trace!("Ignoring profiler block '{name}' outside of a frame");
            return;
        }

        let index = match self
            .blocks
            .iter()
            .position(|block| block.parent == parent && block.name == name)
        {
            Some(index) => index,
            None => {
                let depth = parent.map_or(0, |parent| self.blocks[parent].depth + 1);
                self.blocks.push(ProfilerBlock {
                    name,
                    parent,
                    depth,
                    frame: BlockStats::default(),
                    interval: BlockStats::default(),
                    total: BlockStats::default(),
                });
                self.blocks.len() - 1
            }
        };
        self.open.push((index, self.ticks.now_micros()));
    }

    /// Closes the innermost open block.
    pub fn end_block(&mut self) {
        let Some((index, start)) = self.open.pop() else {
            return;
        };
        let elapsed = self.ticks.now_micros().saturating_sub(start);
        self.blocks[index].frame.record(elapsed);
    }

    /// Starts a new statistics interval.
    pub fn begin_interval(&mut self) {
        for block in &mut self.blocks {
            block.interval = BlockStats::default();
        }
        self.interval_frames = 0;
    }

    /// Frames completed since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames completed in the current interval.
    pub fn interval_frames(&self) -> u32 {
        self.interval_frames
    }

    /// Whether a frame is being measured.
    pub fn in_frame(&self) -> bool {
        !self.open.is_empty()
    }

    /// All blocks in depth-first order.
    pub fn blocks(&self) -> Vec<&ProfilerBlock> {
        let mut ordered = Vec::with_capacity(self.blocks.len());
        self.collect_children(None, &mut ordered);
        ordered
    }

    /// The first block named `name`, searching depth-first.
    pub fn block(&self, name: &str) -> Option<&ProfilerBlock> {
        self.blocks().into_iter().find(|block| block.name == name)
    }

    /// Renders the block tree as a text table.
    ///
    /// With `show_total` the figures cover the profiler's whole lifetime,
    /// otherwise the current interval. Blocks not entered in that span are
    /// listed only with `show_unused`.
    pub fn print_data(&self, show_unused: bool, show_total: bool) -> String {
        let (span, frames) = if show_total {
            ("total", self.frames)
        } else {
            ("interval", u64::from(self.interval_frames))
        };

        let mut out = format!("Profiler data ({span}, {frames} frames)\n");
        let _ = writeln!(
            out,
            "{:<40} {:>8} {:>10} {:>10} {:>12}",
            "Block", "Count", "Avg ms", "Max ms", "Total ms"
        );
        for block in self.blocks() {
            let stats = if show_total { &block.total } else { &block.interval };
            if stats.count == 0 && !show_unused {
                continue;
            }
            let label = format!("{}{}", "  ".repeat(block.depth), block.name);
            let _ = writeln!(
                out,
                "{:<40} {:>8} {:>10.3} {:>10.3} {:>12.3}",
                label,
                stats.count,
                stats.average_micros() / 1000.0,
                stats.max_micros as f64 / 1000.0,
                stats.time_micros as f64 / 1000.0
            );
        }
        out
    }

    fn collect_children<'a>(&'a self, parent: Option<usize>, ordered: &mut Vec<&'a ProfilerBlock>) {
        for (index, block) in self.blocks.iter().enumerate() {
            if block.parent == parent {
                ordered.push(block);
                self.collect_children(Some(index), ordered);
            }
        }
    }
}
