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

//! Contracts between the engine core and its device-dependent backends.
//!
//! Rendering internals, windowing, audio mixing and input polling live
//! outside the core. The engine only needs the small surface defined here to
//! drive them through a frame: open a display mode, begin and end a render
//! frame, start and stop audio, and ask the input layer about window focus.

use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// Display mode requested at initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMode {
    /// Width in pixels; zero lets the backend pick.
    pub width: i32,
    /// Height in pixels; zero lets the backend pick.
    pub height: i32,
    /// Initial window position, if one was requested.
    pub position: Option<(i32, i32)>,
    /// Fullscreen instead of windowed.
    pub fullscreen: bool,
    /// Window without decorations.
    pub borderless: bool,
    /// User-resizable window.
    pub resizable: bool,
    /// Request a high-DPI backbuffer.
    pub high_dpi: bool,
    /// Wait for vertical sync.
    pub vsync: bool,
    /// Use triple buffering.
    pub triple_buffer: bool,
    /// Multisample level.
    pub multisample: i32,
    /// Monitor index.
    pub monitor: i32,
    /// Refresh rate in Hz; zero lets the backend pick.
    pub refresh_rate: i32,
    /// Window title.
    pub title: String,
    /// Resource name of the window icon, if any.
    pub icon: Option<String>,
    /// Opaque handle of a host-owned window to render into.
    pub external_window: Option<u64>,
    /// Flush the GPU command queue at the end of each frame.
    pub flush_gpu: bool,
    /// Force the legacy GL2 code path, when the backend has one.
    pub force_gl2: Option<bool>,
    /// Allowed screen orientations, space separated.
    pub orientations: String,
}

impl Default for WindowMode {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            position: None,
            fullscreen: true,
            borderless: false,
            resizable: false,
            high_dpi: false,
            vsync: false,
            triple_buffer: false,
            multisample: 1,
            monitor: 0,
            refresh_rate: 0,
            title: "Gale".to_string(),
            icon: None,
            external_window: None,
            flush_gpu: false,
            force_gl2: None,
            orientations: "LandscapeLeft LandscapeRight".to_string(),
        }
    }
}

/// Texture sampling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilterMode {
    /// Nearest-neighbour.
    Nearest = 0,
    /// Bilinear.
    Bilinear = 1,
    /// Trilinear.
    Trilinear = 2,
    /// Anisotropic.
    Anisotropic = 3,
    /// Nearest-neighbour with anisotropic mip selection.
    NearestAnisotropic = 4,
}

impl TextureFilterMode {
    /// Converts the numeric form used by configuration, if it is in range.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Nearest),
            1 => Some(Self::Bilinear),
            2 => Some(Self::Trilinear),
            3 => Some(Self::Anisotropic),
            4 => Some(Self::NearestAnisotropic),
            _ => None,
        }
    }
}

/// Quality level for materials and textures.
pub const QUALITY_HIGH: i32 = 2;

/// Renderer options applied at initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Draw shadows.
    pub draw_shadows: bool,
    /// Use the cheap 16-bit shadow path.
    pub low_quality_shadows: bool,
    /// Material quality level.
    pub material_quality: i32,
    /// Texture quality level.
    pub texture_quality: i32,
    /// Default texture filtering.
    pub texture_filter_mode: TextureFilterMode,
    /// Anisotropy level used by anisotropic filtering.
    pub texture_anisotropy: i32,
    /// Resource name of the default render path description.
    pub render_path: Option<String>,
    /// Directory for compiled shaders.
    pub shader_cache_dir: Option<PathBuf>,
    /// File that shader variations are dumped to, if any.
    pub dump_shaders: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            draw_shadows: true,
            low_quality_shadows: false,
            material_quality: QUALITY_HIGH,
            texture_quality: QUALITY_HIGH,
            texture_filter_mode: TextureFilterMode::Trilinear,
            texture_anisotropy: 4,
            render_path: None,
            shader_cache_dir: None,
            dump_shaders: None,
        }
    }
}

/// Audio output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioMode {
    /// Buffer length in milliseconds.
    pub buffer_ms: i32,
    /// Mixing rate in Hz.
    pub mix_rate: i32,
    /// Stereo output.
    pub stereo: bool,
    /// Interpolated mixing.
    pub interpolation: bool,
}

impl Default for AudioMode {
    fn default() -> Self {
        Self {
            buffer_ms: 100,
            mix_rate: 44100,
            stereo: true,
            interpolation: true,
        }
    }
}

/// An error raised by a graphics backend.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsError {
    /// The requested display mode could not be set.
    ModeSetFailed {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
        /// Backend-specific reason.
        reason: String,
    },
    /// No usable device or window system was found.
    DeviceUnavailable(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::ModeSetFailed {
                width,
                height,
                reason,
            } => write!(f, "Could not set display mode {width}x{height}: {reason}"),
            GraphicsError::DeviceUnavailable(reason) => {
                write!(f, "Graphics device unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for GraphicsError {}

/// The window and render device.
pub trait GraphicsBackend {
    /// Opens the window (or adopts the external one) in the requested mode.
    fn set_mode(&mut self, mode: &WindowMode) -> Result<(), GraphicsError>;

    /// Returns `true` while a display surface is open.
    fn is_initialized(&self) -> bool;

    /// Starts a render frame. Returns `false` when the device cannot render
    /// right now (lost device, minimized window); the caller skips the frame.
    fn begin_frame(&mut self) -> bool;

    /// Presents the frame started by [`begin_frame`](Self::begin_frame).
    fn end_frame(&mut self);

    /// Closes the window and releases the surface.
    fn close(&mut self);
}

/// Draws the scene views.
pub trait SceneRenderer {
    /// Applies renderer options.
    fn apply_settings(&mut self, settings: &RenderSettings);

    /// Renders every active view into the current frame.
    fn render(&mut self);
}

/// Draws the user interface on top of the scene.
pub trait UiRenderer {
    /// Renders the UI into the current frame.
    fn render(&mut self);
}

/// The audio output device.
pub trait AudioBackend {
    /// Opens the output stream in the given mode.
    fn set_mode(&mut self, mode: &AudioMode) -> Result<()>;

    /// Returns `true` while output is running.
    fn is_playing(&self) -> bool;

    /// Resumes output. Returns `false` if the stream could not be started.
    fn play(&mut self) -> bool;

    /// Pauses output.
    fn stop(&mut self);
}

/// Window focus state reported by the input layer.
pub trait InputBackend {
    /// Returns `true` if the application window has input focus.
    fn has_focus(&self) -> bool;

    /// Returns `true` if the application window is minimized.
    fn is_minimized(&self) -> bool;
}

/// Factory for the device-dependent backends an engine drives.
///
/// A platform is handed to the engine at construction; input, audio and UI
/// backends are created right away, graphics and renderer only when the
/// engine initializes in windowed mode.
pub trait Platform {
    /// A short name for logging.
    fn name(&self) -> &str;

    /// Creates the window and render device.
    fn create_graphics(&mut self) -> Box<dyn GraphicsBackend>;

    /// Creates the scene renderer.
    fn create_renderer(&mut self) -> Box<dyn SceneRenderer>;

    /// Creates the UI renderer.
    fn create_ui(&mut self) -> Box<dyn UiRenderer>;

    /// Creates the audio output device.
    fn create_audio(&mut self) -> Box<dyn AudioBackend>;

    /// Creates the input layer.
    fn create_input(&mut self) -> Box<dyn InputBackend>;
}
