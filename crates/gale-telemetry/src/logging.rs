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

//! The logging subsystem.

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use gale_core::config::LogSettings;
use log::LevelFilter;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Configures the process logger from the engine's log settings.
///
/// The service is registered at engine construction but only installs a
/// logger when [`open`](Self::open) runs during initialization. An already
/// installed logger (an embedding host, a test harness) is kept; only the
/// maximum level is adjusted.
#[derive(Debug, Default)]
pub struct LogService {
    level: Option<LevelFilter>,
    file: Option<PathBuf>,
    installed: bool,
}

impl LogService {
    /// Creates a service that has not opened a logger yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The level used when none is configured.
    pub fn default_level() -> LevelFilter {
        if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// The level the logger should run at for `settings`. Quiet mode without
    /// a log file only lets errors through.
    pub fn effective_level(settings: &LogSettings) -> LevelFilter {
        let level = settings.level.unwrap_or_else(Self::default_level);
        if settings.quiet && settings.file.is_none() {
            level.min(LevelFilter::Error)
        } else {
            level
        }
    }

    /// Installs the logger. `RUST_LOG` still overrides the configured level.
    pub fn open(&mut self, settings: &LogSettings) -> Result<()> {
        let level = Self::effective_level(settings);
        let mut builder = Builder::from_env(Env::default().default_filter_or(level.as_str()));

        if let Some(path) = &settings.file {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file '{}'", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }

        match builder.try_init() {
            Ok(()) => {
                self.installed = true;
                log::info!("Logging at level {level}");
            }
            Err(_) => {
                log::set_max_level(level);
                log::debug!("A logger is already installed; keeping it at level {level}");
            }
        }

        self.level = Some(level);
        self.file = settings.file.clone();
        Ok(())
    }

    /// Returns `true` once [`open`](Self::open) has run.
    pub fn is_open(&self) -> bool {
        self.level.is_some()
    }

    /// Returns `true` if this service installed the process logger.
    pub fn installed_logger(&self) -> bool {
        self.installed
    }

    /// The level set by [`open`](Self::open).
    pub fn level(&self) -> Option<LevelFilter> {
        self.level
    }

    /// The log file, if output goes to one.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}
