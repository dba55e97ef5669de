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

use super::args::log_level_from_name;
use super::parameters::{ParameterTable, Variant};
use crate::platform::{AudioMode, RenderSettings, TextureFilterMode, WindowMode};
use log::LevelFilter;
use std::path::PathBuf;

/// Resource path used when `ResourcePaths` is not given.
pub const DEFAULT_RESOURCE_PATH: &str = "pfiles";

/// Autoload path used when `AutoloadPaths` is not given.
pub const DEFAULT_AUTOLOAD_PATH: &str = "pfiles/early";

/// Logger configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Maximum level; `None` keeps the logger's own default.
    pub level: Option<LevelFilter>,
    /// Only print errors to the console.
    pub quiet: bool,
    /// File that log output is written to instead of the console.
    pub file: Option<PathBuf>,
}

/// The typed view of a [`ParameterTable`].
///
/// Every recognized parameter has a named field with its default already in
/// place. [`from_table`](Self::from_table) applies the overrides found in a
/// table and reports, rather than silently accepting, names it does not know
/// and values of the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParameters {
    /// Run without window, graphics or renderer.
    pub headless: bool,
    /// Cap the frame rate at the engine's maximum fps.
    pub frame_limiter: bool,
    /// Worker thread count; `None` uses one per core minus the main thread.
    pub worker_threads: Option<usize>,
    /// Directories searched for relative resource specs. Empty entries mean
    /// the program directory.
    pub resource_prefix_paths: Vec<String>,
    /// Resource directories (or same-named `.pak` archives) to add.
    pub resource_paths: Vec<String>,
    /// Package archives to add.
    pub resource_packages: Vec<String>,
    /// Folders whose immediate subfolders and packages are added first.
    pub autoload_paths: Vec<String>,
    /// Display mode.
    pub window: WindowMode,
    /// Renderer options.
    pub render: RenderSettings,
    /// Open audio output.
    pub sound: bool,
    /// Audio output mode.
    pub audio: AudioMode,
    /// Logger configuration.
    pub log: LogSettings,
    /// Time every frame phase as its own profiler block.
    pub event_profiler: bool,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            headless: false,
            frame_limiter: true,
            worker_threads: None,
            resource_prefix_paths: split_list("", true),
            resource_paths: split_list(DEFAULT_RESOURCE_PATH, false),
            resource_packages: Vec::new(),
            autoload_paths: split_list(DEFAULT_AUTOLOAD_PATH, false),
            window: WindowMode::default(),
            render: RenderSettings::default(),
            sound: true,
            audio: AudioMode::default(),
            log: LogSettings::default(),
            event_profiler: true,
        }
    }
}

enum OverrideError {
    Unrecognized,
    TypeMismatch { expected: &'static str },
}

impl EngineParameters {
    /// Builds the typed parameters from a table, applying every recognized override.
    pub fn from_table(table: &ParameterTable) -> Self {
        let mut parameters = Self::default();
        let mut position = (None, None);

        let mut entries: Vec<_> = table.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (name, value) in entries {
            let applied = match name {
                "WindowPositionX" => int_of(value).map(|x| position.0 = Some(x)),
                "WindowPositionY" => int_of(value).map(|y| position.1 = Some(y)),
                _ => parameters.apply(name, value),
            };
            match applied {
                Ok(()) => {}
                Err(OverrideError::Unrecognized) => {
                    log::warn!("Ignoring unrecognized engine parameter '{name}'");
                }
                Err(OverrideError::TypeMismatch { expected }) => {
                    log::warn!(
                        "Ignoring engine parameter '{name}': expected {expected}, got {}",
                        value.type_name()
                    );
                }
            }
        }

        if let (Some(x), Some(y)) = position {
            parameters.window.position = Some((x, y));
        }
        parameters
    }

    /// Returns `true` when the autoload spec is the built-in default.
    pub fn autoload_is_default(&self) -> bool {
        self.autoload_paths.len() == 1 && self.autoload_paths[0] == DEFAULT_AUTOLOAD_PATH
    }

    fn apply(&mut self, name: &str, value: &Variant) -> Result<(), OverrideError> {
        match name {
            "Headless" => self.headless = bool_of(value)?,
            "FrameLimiter" => self.frame_limiter = bool_of(value)?,
            "WorkerThreads" => {
                let count = usize::try_from(int_of(value)?).map_err(|_| OverrideError::TypeMismatch {
                    expected: "non-negative int",
                })?;
                self.worker_threads = Some(count);
            }

            "ResourcePrefixPaths" => self.resource_prefix_paths = split_list(str_of(value)?, true),
            "ResourcePaths" => self.resource_paths = split_list(str_of(value)?, false),
            "ResourcePackages" => self.resource_packages = split_list(str_of(value)?, false),
            "AutoloadPaths" => self.autoload_paths = split_list(str_of(value)?, false),

            "WindowWidth" => self.window.width = int_of(value)?,
            "WindowHeight" => self.window.height = int_of(value)?,
            "FullScreen" => self.window.fullscreen = bool_of(value)?,
            "Borderless" => self.window.borderless = bool_of(value)?,
            "WindowResizable" => self.window.resizable = bool_of(value)?,
            "HighDPI" => self.window.high_dpi = bool_of(value)?,
            "VSync" => self.window.vsync = bool_of(value)?,
            "TripleBuffer" => self.window.triple_buffer = bool_of(value)?,
            "MultiSample" => self.window.multisample = int_of(value)?,
            "Monitor" => self.window.monitor = int_of(value)?,
            "RefreshRate" => self.window.refresh_rate = int_of(value)?,
            "WindowTitle" => self.window.title = str_of(value)?.to_string(),
            "WindowIcon" => self.window.icon = non_empty(str_of(value)?),
            "ExternalWindow" => {
                self.window.external_window = match value {
                    Variant::Handle(handle) => Some(*handle),
                    Variant::Int(handle) => u64::try_from(*handle).ok(),
                    _ => return Err(OverrideError::TypeMismatch { expected: "handle" }),
                }
            }
            "FlushGPU" => self.window.flush_gpu = bool_of(value)?,
            "ForceGL2" => self.window.force_gl2 = Some(bool_of(value)?),
            "Orientations" => self.window.orientations = str_of(value)?.to_string(),

            "Shadows" => self.render.draw_shadows = bool_of(value)?,
            "LowQualityShadows" => self.render.low_quality_shadows = bool_of(value)?,
            "MaterialQuality" => self.render.material_quality = int_of(value)?,
            "TextureQuality" => self.render.texture_quality = int_of(value)?,
            "TextureFilterMode" => {
                let index = value.as_int().ok_or(OverrideError::TypeMismatch { expected: "int" })?;
                self.render.texture_filter_mode = TextureFilterMode::from_index(index).ok_or(
                    OverrideError::TypeMismatch {
                        expected: "texture filter mode 0..=4",
                    },
                )?;
            }
            "TextureAnisotropy" => self.render.texture_anisotropy = int_of(value)?,
            "RenderPath" => self.render.render_path = non_empty(str_of(value)?),
            "ShaderCacheDir" => {
                self.render.shader_cache_dir = non_empty(str_of(value)?).map(PathBuf::from)
            }
            "DumpShaders" => self.render.dump_shaders = non_empty(str_of(value)?),

            "Sound" => self.sound = bool_of(value)?,
            "SoundBuffer" => self.audio.buffer_ms = int_of(value)?,
            "SoundMixRate" => self.audio.mix_rate = int_of(value)?,
            "SoundStereo" => self.audio.stereo = bool_of(value)?,
            "SoundInterpolation" => self.audio.interpolation = bool_of(value)?,

            "LogLevel" => {
                let level = match value {
                    Variant::Int(index) => log_level_from_index(*index),
                    Variant::String(name) => log_level_from_name(name),
                    _ => None,
                };
                self.log.level = Some(level.ok_or(OverrideError::TypeMismatch {
                    expected: "log level 0..=5 or level name",
                })?);
            }
            "LogQuiet" => self.log.quiet = bool_of(value)?,
            "LogName" => self.log.file = non_empty(str_of(value)?).map(PathBuf::from),

            "EventProfiler" => self.event_profiler = bool_of(value)?,

            _ => return Err(OverrideError::Unrecognized),
        }
        Ok(())
    }
}

/// Splits a `;`-separated list. Empty items are kept only when `keep_empty` is set,
/// so an empty prefix list still yields one (empty) prefix.
fn split_list(list: &str, keep_empty: bool) -> Vec<String> {
    list.split(';')
        .filter(|item| keep_empty || !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn log_level_from_index(index: i64) -> Option<LevelFilter> {
    match index {
        0 => Some(LevelFilter::Trace),
        1 => Some(LevelFilter::Debug),
        2 => Some(LevelFilter::Info),
        3 => Some(LevelFilter::Warn),
        4 => Some(LevelFilter::Error),
        5 => Some(LevelFilter::Off),
        _ => None,
    }
}

fn bool_of(value: &Variant) -> Result<bool, OverrideError> {
    value
        .as_bool()
        .ok_or(OverrideError::TypeMismatch { expected: "bool" })
}

fn int_of(value: &Variant) -> Result<i32, OverrideError> {
    value
        .as_int()
        .and_then(|int| i32::try_from(int).ok())
        .ok_or(OverrideError::TypeMismatch { expected: "int" })
}

fn str_of(value: &Variant) -> Result<&str, OverrideError> {
    value
        .as_str()
        .ok_or(OverrideError::TypeMismatch { expected: "string" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let parameters = EngineParameters::default();
        assert!(!parameters.headless);
        assert!(parameters.frame_limiter);
        assert_eq!(parameters.resource_prefix_paths, vec![String::new()]);
        assert_eq!(parameters.resource_paths, vec!["pfiles".to_string()]);
        assert!(parameters.resource_packages.is_empty());
        assert!(parameters.autoload_is_default());
        assert!(parameters.window.fullscreen);
        assert_eq!(parameters.audio.mix_rate, 44100);
        assert!(parameters.event_profiler);
    }

    #[test]
    fn recognized_overrides_are_applied() {
        let table = ParameterTable::new()
            .with("Headless", true)
            .with("ResourcePrefixPaths", "/app/;;rel")
            .with("ResourcePaths", "data;;core")
            .with("ResourcePackages", "extra.pak")
            .with("WindowWidth", 1280)
            .with("WindowPositionX", 10)
            .with("WindowPositionY", 20)
            .with("TextureFilterMode", 3)
            .with("LogLevel", 3)
            .with("LogName", "engine.log")
            .with("EventProfiler", false);
        let parameters = EngineParameters::from_table(&table);

        assert!(parameters.headless);
        assert_eq!(
            parameters.resource_prefix_paths,
            vec!["/app/".to_string(), String::new(), "rel".to_string()]
        );
        assert_eq!(
            parameters.resource_paths,
            vec!["data".to_string(), "core".to_string()]
        );
        assert_eq!(parameters.resource_packages, vec!["extra.pak".to_string()]);
        assert_eq!(parameters.window.width, 1280);
        assert_eq!(parameters.window.position, Some((10, 20)));
        assert_eq!(
            parameters.render.texture_filter_mode,
            TextureFilterMode::Anisotropic
        );
        assert_eq!(parameters.log.level, Some(LevelFilter::Warn));
        assert_eq!(parameters.log.file, Some(PathBuf::from("engine.log")));
        assert!(!parameters.event_profiler);
    }

    #[test]
    fn mismatched_and_unknown_parameters_keep_defaults() {
        let table = ParameterTable::new()
            .with("Headless", "yes")
            .with("WindowWidth", 3.5)
            .with("NoSuchParameter", 1);
        let parameters = EngineParameters::from_table(&table);
        assert_eq!(parameters, EngineParameters::default());
    }

    #[test]
    fn single_window_coordinate_is_ignored() {
        let table = ParameterTable::new().with("WindowPositionX", 10);
        assert_eq!(EngineParameters::from_table(&table).window.position, None);
    }

    #[test]
    fn empty_autoload_spec_disables_autoload() {
        let table = ParameterTable::new().with("AutoloadPaths", "");
        let parameters = EngineParameters::from_table(&table);
        assert!(parameters.autoload_paths.is_empty());
        assert!(!parameters.autoload_is_default());
    }

    #[test]
    fn log_level_accepts_names() {
        let table = ParameterTable::new().with("LogLevel", "debug");
        assert_eq!(
            EngineParameters::from_table(&table).log.level,
            Some(LevelFilter::Debug)
        );
    }
}
