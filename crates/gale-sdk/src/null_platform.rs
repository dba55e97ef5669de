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

use gale_core::platform::{
    AudioBackend, AudioMode, GraphicsBackend, GraphicsError, InputBackend, Platform,
    RenderSettings, SceneRenderer, UiRenderer, WindowMode,
};

/// A platform without devices.
///
/// Graphics "opens" a window that is never shown, rendering does nothing,
/// audio plays silence and the window always has focus. Used for dedicated
/// servers, offscreen runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlatform;

impl NullPlatform {
    /// Creates the platform.
    pub fn new() -> Self {
        Self
    }
}

impl Platform for NullPlatform {
    fn name(&self) -> &str {
        "null"
    }

    fn create_graphics(&mut self) -> Box<dyn GraphicsBackend> {
        Box::new(NullGraphics::default())
    }

    fn create_renderer(&mut self) -> Box<dyn SceneRenderer> {
        Box::new(NullRenderer)
    }

    fn create_ui(&mut self) -> Box<dyn UiRenderer> {
        Box::new(NullUi)
    }

    fn create_audio(&mut self) -> Box<dyn AudioBackend> {
        Box::new(NullAudio::default())
    }

    fn create_input(&mut self) -> Box<dyn InputBackend> {
        Box::new(NullInput)
    }
}

#[derive(Default)]
struct NullGraphics {
    open: bool,
}

impl GraphicsBackend for NullGraphics {
    fn set_mode(&mut self, mode: &WindowMode) -> Result<(), GraphicsError> {
        if mode.width < 0 || mode.height < 0 {
            return Err(GraphicsError::ModeSetFailed {
                width: mode.width,
                height: mode.height,
                reason: "negative window size".to_string(),
            });
        }
        self.open = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.open
    }

    fn begin_frame(&mut self) -> bool {
        self.open
    }

    fn end_frame(&mut self) {}

    fn close(&mut self) {
        self.open = false;
    }
}

struct NullRenderer;

impl SceneRenderer for NullRenderer {
    fn apply_settings(&mut self, _settings: &RenderSettings) {}

    fn render(&mut self) {}
}

struct NullUi;

impl UiRenderer for NullUi {
    fn render(&mut self) {}
}

#[derive(Default)]
struct NullAudio {
    playing: bool,
}

impl AudioBackend for NullAudio {
    fn set_mode(&mut self, _mode: &AudioMode) -> anyhow::Result<()> {
        self.playing = true;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) -> bool {
        self.playing = true;
        true
    }

    fn stop(&mut self) {
        self.playing = false;
    }
}

struct NullInput;

impl InputBackend for NullInput {
    fn has_focus(&self) -> bool {
        true
    }

    fn is_minimized(&self) -> bool {
        false
    }
}
