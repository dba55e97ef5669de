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

//! Registered subsystems wrapping the platform's device backends.
//!
//! Each wrapper is what the registry stores and what phase callbacks look
//! up; the backend behind it comes from the engine's [`Platform`].
//!
//! [`Platform`]: gale_core::platform::Platform

use gale_core::platform::{
    AudioBackend, AudioMode, GraphicsBackend, GraphicsError, InputBackend, RenderSettings,
    SceneRenderer, UiRenderer, WindowMode,
};

/// The graphics device and its window.
pub struct Graphics {
    backend: Box<dyn GraphicsBackend>,
    mode: Option<WindowMode>,
}

impl Graphics {
    /// Wraps a graphics backend. No window exists until [`set_mode`](Self::set_mode).
    pub fn new(backend: Box<dyn GraphicsBackend>) -> Self {
        Self {
            backend,
            mode: None,
        }
    }

    /// Opens or changes the window and device.
    pub fn set_mode(&mut self, mode: &WindowMode) -> Result<(), GraphicsError> {
        self.backend.set_mode(mode)?;
        log::info!(
            "Set display mode {}x{} ({})",
            mode.width,
            mode.height,
            if mode.fullscreen { "fullscreen" } else { "windowed" }
        );
        self.mode = Some(mode.clone());
        Ok(())
    }

    /// Returns `true` while the window and device are usable.
    pub fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }

    /// Starts a render frame; `false` means the device cannot render now.
    pub fn begin_frame(&mut self) -> bool {
        self.backend.begin_frame()
    }

    /// Presents the frame.
    pub fn end_frame(&mut self) {
        self.backend.end_frame();
    }

    /// Closes the window.
    pub fn close(&mut self) {
        self.backend.close();
    }

    /// The last mode applied successfully.
    pub fn mode(&self) -> Option<&WindowMode> {
        self.mode.as_ref()
    }
}

/// Scene rendering.
pub struct Renderer {
    backend: Box<dyn SceneRenderer>,
    settings: RenderSettings,
}

impl Renderer {
    /// Wraps a scene renderer backend.
    pub fn new(backend: Box<dyn SceneRenderer>) -> Self {
        Self {
            backend,
            settings: RenderSettings::default(),
        }
    }

    /// Applies quality and pipeline settings.
    pub fn apply_settings(&mut self, settings: &RenderSettings) {
        self.backend.apply_settings(settings);
        self.settings = settings.clone();
    }

    /// Draws the scene.
    pub fn render(&mut self) {
        self.backend.render();
    }

    /// The settings in effect.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }
}

/// User interface rendering.
pub struct Ui {
    backend: Box<dyn UiRenderer>,
}

impl Ui {
    /// Wraps a UI backend.
    pub fn new(backend: Box<dyn UiRenderer>) -> Self {
        Self { backend }
    }

    /// Draws the UI over the scene.
    pub fn render(&mut self) {
        self.backend.render();
    }
}

/// Audio output.
pub struct Audio {
    backend: Box<dyn AudioBackend>,
    mode: Option<AudioMode>,
}

impl Audio {
    /// Wraps an audio backend.
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            mode: None,
        }
    }

    /// Opens the output device and starts playback.
    pub fn set_mode(&mut self, mode: &AudioMode) -> anyhow::Result<()> {
        self.backend.set_mode(mode)?;
        self.mode = Some(*mode);
        Ok(())
    }

    /// Whether sound is being output.
    pub fn is_playing(&self) -> bool {
        self.backend.is_playing()
    }

    /// Resumes output. Returns `false` if the device refused.
    pub fn play(&mut self) -> bool {
        self.backend.play()
    }

    /// Pauses output.
    pub fn stop(&mut self) {
        self.backend.stop();
    }

    /// The output mode, once opened.
    pub fn mode(&self) -> Option<&AudioMode> {
        self.mode.as_ref()
    }
}

/// Window focus and minimization state.
pub struct Input {
    backend: Box<dyn InputBackend>,
}

impl Input {
    /// Wraps an input backend.
    pub fn new(backend: Box<dyn InputBackend>) -> Self {
        Self { backend }
    }

    /// Whether the window has input focus.
    pub fn has_focus(&self) -> bool {
        self.backend.has_focus()
    }

    /// Whether the window is minimized.
    pub fn is_minimized(&self) -> bool {
        self.backend.is_minimized()
    }
}
