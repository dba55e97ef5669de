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

use anyhow::Result;
use gale_core::platform::{
    AudioBackend, AudioMode, GraphicsBackend, GraphicsError, InputBackend, Platform,
    RenderSettings, SceneRenderer, UiRenderer, WindowMode,
};
use gale_core::{FramePhase, ManualTicks, ParameterTable, SystemEvent, TickSource};
use gale_io::{ResourceCache, ResourceError};
use gale_sdk::{Engine, EngineError, EngineState, NullPlatform};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use tempfile::tempdir;

// --- Test Setup: a platform whose devices are driven by a shared script ---

struct Script {
    has_focus: bool,
    minimized: bool,
    window_open: bool,
    refuse_frames: bool,
    fail_set_mode: bool,
    audio_playing: bool,
    calls: Vec<&'static str>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            has_focus: true,
            minimized: false,
            window_open: false,
            refuse_frames: false,
            fail_set_mode: false,
            audio_playing: false,
            calls: Vec::new(),
        }
    }
}

type Shared = Rc<RefCell<Script>>;

struct ScriptedPlatform(Shared);

impl Platform for ScriptedPlatform {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create_graphics(&mut self) -> Box<dyn GraphicsBackend> {
        Box::new(ScriptedDevice(Rc::clone(&self.0)))
    }

    fn create_renderer(&mut self) -> Box<dyn SceneRenderer> {
        Box::new(ScriptedDevice(Rc::clone(&self.0)))
    }

    fn create_ui(&mut self) -> Box<dyn UiRenderer> {
        Box::new(ScriptedDevice(Rc::clone(&self.0)))
    }

    fn create_audio(&mut self) -> Box<dyn AudioBackend> {
        Box::new(ScriptedDevice(Rc::clone(&self.0)))
    }

    fn create_input(&mut self) -> Box<dyn InputBackend> {
        Box::new(ScriptedDevice(Rc::clone(&self.0)))
    }
}

struct ScriptedDevice(Shared);

impl GraphicsBackend for ScriptedDevice {
    fn set_mode(&mut self, mode: &WindowMode) -> Result<(), GraphicsError> {
        let mut script = self.0.borrow_mut();
        if script.fail_set_mode {
            return Err(GraphicsError::DeviceUnavailable("no display".to_string()));
        }
        script.window_open = true;
        script.calls.push(if mode.fullscreen { "mode.fullscreen" } else { "mode.windowed" });
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.0.borrow().window_open
    }

    fn begin_frame(&mut self) -> bool {
        let script = self.0.borrow();
        script.window_open && !script.refuse_frames
    }

    fn end_frame(&mut self) {
        self.0.borrow_mut().calls.push("present");
    }

    fn close(&mut self) {
        let mut script = self.0.borrow_mut();
        script.window_open = false;
        script.calls.push("close");
    }
}

impl SceneRenderer for ScriptedDevice {
    fn apply_settings(&mut self, _settings: &RenderSettings) {
        self.0.borrow_mut().calls.push("settings");
    }

    fn render(&mut self) {
        self.0.borrow_mut().calls.push("render");
    }
}

impl UiRenderer for ScriptedDevice {
    fn render(&mut self) {
        self.0.borrow_mut().calls.push("ui");
    }
}

impl AudioBackend for ScriptedDevice {
    fn set_mode(&mut self, _mode: &AudioMode) -> anyhow::Result<()> {
        self.0.borrow_mut().audio_playing = true;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.0.borrow().audio_playing
    }

    fn play(&mut self) -> bool {
        let mut script = self.0.borrow_mut();
        script.audio_playing = true;
        script.calls.push("audio.play");
        true
    }

    fn stop(&mut self) {
        let mut script = self.0.borrow_mut();
        script.audio_playing = false;
        script.calls.push("audio.stop");
    }
}

impl InputBackend for ScriptedDevice {
    fn has_focus(&self) -> bool {
        self.0.borrow().has_focus
    }

    fn is_minimized(&self) -> bool {
        self.0.borrow().minimized
    }
}

fn scripted_engine() -> (Engine, Shared) {
    let script = Shared::default();
    let engine = Engine::with_tick_source(
        Box::new(ScriptedPlatform(Rc::clone(&script))),
        Arc::new(ManualTicks::new()),
    );
    (engine, script)
}

fn headless_engine() -> Engine {
    Engine::with_tick_source(Box::new(NullPlatform::new()), Arc::new(ManualTicks::new()))
}

/// Parameters that resolve no resources, run unthrottled and keep work inline.
fn base_parameters(prefix: &Path) -> ParameterTable {
    ParameterTable::new()
        .with("ResourcePrefixPaths", format!("{}/", prefix.display()))
        .with("ResourcePaths", "")
        .with("FrameLimiter", false)
        .with("WorkerThreads", 0)
}

/// Records the phase name of every notification.
fn record_phases(engine: &mut Engine) -> Rc<RefCell<Vec<&'static str>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    for phase in FramePhase::ALL {
        let seen = Rc::clone(&seen);
        engine.subscribe(phase, move |_, _| seen.borrow_mut().push(phase.name()));
    }
    seen
}

// --- Frame pump ---

#[test]
fn test_frame_counter_increases_and_skips_zero() -> Result<()> {
    let root = tempdir()?;
    let mut engine = headless_engine();
    engine.initialize(&base_parameters(root.path()).with("Headless", true))?;

    let numbers = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&numbers);
    engine.subscribe(FramePhase::BeginFrame, move |event, _| {
        sink.borrow_mut().push(event.frame_number)
    });

    for _ in 0..50 {
        engine.run_frame();
    }

    let numbers = numbers.borrow();
    assert_eq!(numbers.len(), 50);
    assert!(numbers.iter().all(|&n| n != 0));
    assert!(numbers.windows(2).all(|pair| pair[1] > pair[0]));
    assert_eq!(engine.time().frame_number(), 50);
    Ok(())
}

#[test]
fn test_phases_run_in_fixed_order() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()))?;
    let seen = record_phases(&mut engine);

    engine.run_frame();

    assert_eq!(
        *seen.borrow(),
        vec![
            "BeginFrame",
            "Update",
            "PostUpdate",
            "RenderUpdate",
            "PostRenderUpdate",
            "EndFrame"
        ]
    );
    let calls = &script.borrow().calls;
    let tail: Vec<_> = calls.iter().rev().take(3).rev().copied().collect();
    assert_eq!(tail, vec!["render", "ui", "present"]);
    Ok(())
}

#[test]
fn test_subscribers_of_a_phase_run_in_subscription_order() -> Result<()> {
    let root = tempdir()?;
    let mut engine = headless_engine();
    engine.initialize(&base_parameters(root.path()).with("Headless", true))?;

    let order = Rc::new(RefCell::new(Vec::new()));
    for (phase, label) in [
        (FramePhase::PostUpdate, "post-a"),
        (FramePhase::Update, "update-a"),
        (FramePhase::PostUpdate, "post-b"),
        (FramePhase::Update, "update-b"),
    ] {
        let order = Rc::clone(&order);
        engine.subscribe(phase, move |_, _| order.borrow_mut().push(label));
    }

    engine.run_frame();
    assert_eq!(*order.borrow(), vec!["update-a", "update-b", "post-a", "post-b"]);
    Ok(())
}

#[test]
fn test_callbacks_reach_subsystems_through_the_registry() -> Result<()> {
    let root = tempdir()?;
    let mut engine = headless_engine();
    engine.initialize(&base_parameters(root.path()).with("Headless", true))?;

    struct Counter(u32);
    engine.registry_mut().register(Counter(0));
    engine.subscribe(FramePhase::Update, |_, registry| {
        if let Some(counter) = registry.get_mut::<Counter>() {
            counter.0 += 1;
        }
    });

    engine.run_frame();
    engine.run_frame();
    assert_eq!(engine.subsystem::<Counter>().map(|c| c.0), Some(2));
    Ok(())
}

#[test]
fn test_unsubscribed_callback_is_not_notified() -> Result<()> {
    let root = tempdir()?;
    let mut engine = headless_engine();
    engine.initialize(&base_parameters(root.path()).with("Headless", true))?;

    let hits = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&hits);
    let id = engine.subscribe(FramePhase::Update, move |_, _| *sink.borrow_mut() += 1);
    engine.run_frame();
    assert!(engine.unsubscribe(id));
    assert!(!engine.unsubscribe(id));
    engine.run_frame();
    assert_eq!(*hits.borrow(), 1);
    Ok(())
}

// --- Exiting ---

#[test]
fn test_frames_are_no_ops_once_exiting() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()))?;
    let seen = record_phases(&mut engine);

    engine.exit();
    assert!(engine.is_exiting());
    assert!(!script.borrow().window_open);

    // The window coming back does not revive the engine.
    script.borrow_mut().window_open = true;
    for _ in 0..3 {
        engine.run_frame();
    }
    assert!(seen.borrow().is_empty());
    assert_eq!(engine.state(), EngineState::Exiting);
    Ok(())
}

#[test]
fn test_lost_window_triggers_exit() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()))?;
    let seen = record_phases(&mut engine);

    engine.run_frame();
    assert_eq!(seen.borrow().len(), 6);

    script.borrow_mut().window_open = false;
    engine.run_frame();
    assert!(engine.is_exiting());
    assert_eq!(seen.borrow().len(), 6);
    Ok(())
}

#[test]
fn test_exit_request_honours_auto_exit() -> Result<()> {
    let root = tempdir()?;
    let mut engine = headless_engine();
    engine.initialize(&base_parameters(root.path()).with("Headless", true))?;
    let sender = engine.system_event_sender();

    engine.set_auto_exit(false);
    sender.send(SystemEvent::ExitRequested).unwrap();
    engine.run_frame();
    assert!(!engine.is_exiting());

    engine.set_auto_exit(true);
    sender.send(SystemEvent::ExitRequested).unwrap();
    engine.run_frame();
    assert!(engine.is_exiting());
    Ok(())
}

// --- Rendering and pausing ---

#[test]
fn test_refused_render_frame_skips_drawing_only() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()))?;
    let seen = record_phases(&mut engine);

    script.borrow_mut().refuse_frames = true;
    script.borrow_mut().calls.clear();
    engine.run_frame();

    assert!(script.borrow().calls.is_empty());
    assert_eq!(seen.borrow().len(), 6);
    assert!(!engine.is_exiting());
    Ok(())
}

#[test]
fn test_headless_never_touches_graphics() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()).with("Headless", true))?;
    engine.run_frame();

    assert!(engine.is_headless());
    assert!(engine.subsystem::<gale_sdk::Graphics>().is_none());
    assert!(engine.subsystem::<gale_sdk::Renderer>().is_none());
    assert!(!script.borrow().calls.iter().any(|call| *call == "render"));
    assert!(engine.create_debug_hud().is_none());
    Ok(())
}

#[test]
fn test_headless_does_not_open_audio() -> Result<()> {
    let root = tempdir()?;
    let mut engine = headless_engine();
    engine.initialize(&base_parameters(root.path()).with("Headless", true))?;

    let audio = engine.subsystem::<gale_sdk::Audio>().expect("audio subsystem");
    assert!(audio.mode().is_none());
    assert!(!audio.is_playing());
    Ok(())
}

#[test]
fn test_minimized_window_pauses_updates_and_audio() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()))?;
    engine.set_pause_minimized(true);
    let seen = record_phases(&mut engine);
    assert!(script.borrow().audio_playing);

    script.borrow_mut().minimized = true;
    engine.run_frame();
    assert_eq!(*seen.borrow(), vec!["BeginFrame", "EndFrame"]);
    assert!(!script.borrow().audio_playing);

    // Still minimized: audio is not stopped twice.
    engine.run_frame();
    let stops = script
        .borrow()
        .calls
        .iter()
        .filter(|call| **call == "audio.stop")
        .count();
    assert_eq!(stops, 1);

    seen.borrow_mut().clear();
    script.borrow_mut().minimized = false;
    engine.run_frame();
    assert_eq!(seen.borrow().len(), 6);
    assert!(script.borrow().audio_playing);
    assert!(script.borrow().calls.contains(&"audio.play"));
    Ok(())
}

#[test]
fn test_user_stopped_audio_is_not_resumed() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()))?;
    engine.set_pause_minimized(true);

    engine
        .subsystem_mut::<gale_sdk::Audio>()
        .expect("audio subsystem")
        .stop();
    script.borrow_mut().minimized = true;
    engine.run_frame();
    script.borrow_mut().minimized = false;
    engine.run_frame();

    assert!(!script.borrow().audio_playing);
    assert!(!script.borrow().calls.contains(&"audio.play"));
    Ok(())
}

#[test]
fn test_minimized_window_keeps_updating_without_pause_policy() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()))?;
    let seen = record_phases(&mut engine);

    script.borrow_mut().minimized = true;
    engine.run_frame();
    assert_eq!(seen.borrow().len(), 6);
    assert!(script.borrow().audio_playing);
    Ok(())
}

// --- Frame limiting ---

#[test]
fn test_unfocused_window_is_limited_to_inactive_fps() -> Result<()> {
    let root = tempdir()?;
    let script = Shared::default();
    let ticks = Arc::new(ManualTicks::with_step(1));
    let mut engine = Engine::with_tick_source(
        Box::new(ScriptedPlatform(Rc::clone(&script))),
        Arc::clone(&ticks) as Arc<dyn TickSource>,
    );
    engine.initialize(&base_parameters(root.path()).with("FrameLimiter", true))?;
    engine.set_max_fps(60);
    engine.set_max_inactive_fps(10);
    script.borrow_mut().has_focus = false;

    let start = ticks.now_micros();
    engine.run_frame();
    assert!(ticks.now_micros() - start >= 100_000);
    assert!(ticks.slept_millis() >= 99);

    // The measured frame becomes the next frame's timestep.
    let steps = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&steps);
    engine.subscribe(FramePhase::Update, move |event, _| {
        sink.borrow_mut().push(event.time_step)
    });
    engine.set_time_step_smoothing(1);
    engine.run_frame();
    approx::assert_relative_eq!(steps.borrow()[0], 0.1, epsilon = 1e-4);
    Ok(())
}

#[test]
fn test_frame_limit_is_ignored_before_initialization() {
    let ticks = Arc::new(ManualTicks::new());
    let mut engine = Engine::with_tick_source(
        Box::new(NullPlatform::new()),
        Arc::clone(&ticks) as Arc<dyn TickSource>,
    );
    engine.apply_frame_limit();
    assert_eq!(ticks.sleep_calls(), 0);
    assert_eq!(engine.state(), EngineState::Constructed);
}

// --- Initialization ---

#[test]
fn test_second_initialize_is_a_no_op() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()))?;
    engine.initialize(&base_parameters(root.path()))?;

    let mode_sets = script
        .borrow()
        .calls
        .iter()
        .filter(|call| call.starts_with("mode."))
        .count();
    assert_eq!(mode_sets, 1);
    assert_eq!(engine.state(), EngineState::Running);
    Ok(())
}

#[test]
fn test_display_mode_failure_is_fatal_and_final() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    script.borrow_mut().fail_set_mode = true;

    let err = engine.initialize(&base_parameters(root.path())).unwrap_err();
    assert!(matches!(err, EngineError::DisplayMode(_)));
    assert!(!engine.is_initialized());

    script.borrow_mut().fail_set_mode = false;
    assert!(matches!(
        engine.initialize(&base_parameters(root.path())),
        Err(EngineError::InitializationFailed)
    ));
    assert_eq!(engine.state(), EngineState::Initializing);
    Ok(())
}

#[test]
fn test_windowed_initialization_registers_devices_after_leaf_subsystems() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, script) = scripted_engine();
    engine.initialize(&base_parameters(root.path()).with("FullScreen", false))?;

    let names: Vec<_> = engine
        .registry()
        .type_names()
        .map(|name| name.rsplit("::").next().unwrap_or(name))
        .collect();
    assert_eq!(
        names,
        vec![
            "WorkQueue",
            "Profiler",
            "FileSystem",
            "LogService",
            "ResourceCache",
            "Input",
            "Audio",
            "Ui",
            "Graphics",
            "Renderer"
        ]
    );
    assert!(script.borrow().calls.contains(&"mode.windowed"));
    assert!(script.borrow().calls.contains(&"settings"));
    Ok(())
}

#[test]
fn test_existing_resource_directory_is_registered() -> Result<()> {
    let app = tempdir()?;
    fs::create_dir_all(app.path().join("data"))?;

    let mut engine = headless_engine();
    engine.initialize(
        &base_parameters(app.path())
            .with("Headless", true)
            .with("ResourcePaths", "data"),
    )?;

    let cache = engine.subsystem::<ResourceCache>().expect("resource cache");
    assert_eq!(cache.resource_dirs(), vec![app.path().join("data").as_path()]);
    Ok(())
}

#[test]
fn test_missing_resource_directory_fails_initialization() -> Result<()> {
    let app = tempdir()?;
    let mut engine = headless_engine();

    let err = engine
        .initialize(
            &base_parameters(app.path())
                .with("Headless", true)
                .with("ResourcePaths", "data"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Resources(ResourceError::ResourcePathNotFound(ref spec)) if spec == "data"
    ));
    assert!(engine
        .subsystem::<ResourceCache>()
        .expect("resource cache")
        .resource_dirs()
        .is_empty());
    Ok(())
}

#[test]
fn test_resource_cache_reinitialization() -> Result<()> {
    let app = tempdir()?;
    fs::create_dir_all(app.path().join("data"))?;
    fs::create_dir_all(app.path().join("extra"))?;
    fs::create_dir_all(app.path().join("mods/Patch"))?;

    let mut engine = headless_engine();
    engine.initialize(
        &base_parameters(app.path())
            .with("Headless", true)
            .with("ResourcePaths", "data"),
    )?;

    let reload = ParameterTable::new()
        .with("ResourcePrefixPaths", format!("{}/", app.path().display()))
        .with("ResourcePaths", "extra")
        .with("AutoloadPaths", "mods");
    engine.initialize_resource_cache(&reload, false)?;
    {
        let cache = engine.subsystem::<ResourceCache>().expect("resource cache");
        assert_eq!(
            cache.resource_dirs(),
            vec![
                app.path().join("mods/Patch").as_path(),
                app.path().join("data").as_path(),
                app.path().join("extra").as_path(),
            ]
        );
    }

    engine.initialize_resource_cache(&reload, true)?;
    let cache = engine.subsystem::<ResourceCache>().expect("resource cache");
    assert_eq!(cache.len(), 2);
    engine.dump_resources();
    Ok(())
}

#[test]
fn test_debug_hud_tracks_frames() -> Result<()> {
    let root = tempdir()?;
    let (mut engine, _script) = scripted_engine();
    assert!(engine.create_debug_hud().is_none());
    engine.initialize(&base_parameters(root.path()))?;

    engine.create_debug_hud().expect("debug hud");
    engine.create_debug_hud().expect("debug hud");
    for _ in 0..3 {
        engine.run_frame();
    }

    let hud = engine
        .subsystem::<gale_telemetry::DebugHud>()
        .expect("registered hud");
    assert_eq!(hud.frames_recorded(), 3);
    assert_eq!(hud.last_frame_number(), 3);
    Ok(())
}

// --- Profiling ---

#[test]
fn test_profiler_times_frames_and_phases() -> Result<()> {
    let root = tempdir()?;
    let ticks = Arc::new(ManualTicks::new());
    let mut engine = Engine::with_tick_source(Box::new(NullPlatform::new()), ticks.clone());
    engine.initialize(&base_parameters(root.path()).with("Headless", true))?;

    let update_ticks = Arc::clone(&ticks);
    engine.subscribe(FramePhase::Update, move |_, _| update_ticks.advance(2_000));
    engine.run_frame();
    engine.run_frame();

    let profiler = engine
        .subsystem::<gale_telemetry::Profiler>()
        .expect("registered profiler");
    assert_eq!(profiler.frames(), 2);
    assert!(!profiler.in_frame());

    let frame = profiler.block(gale_telemetry::ROOT_BLOCK).expect("frame block");
    assert_eq!(frame.total().count, 2);
    assert_eq!(frame.total().time_micros, 4_000);

    let update = profiler.block("Update").expect("update block");
    assert_eq!(update.depth(), 1);
    assert_eq!(update.total().time_micros, 4_000);
    for name in ["BeginFrame", "PostUpdate", "Render", "ApplyFrameLimit", "EndFrame"] {
        assert_eq!(profiler.block(name).map(|block| block.total().count), Some(2));
    }
    engine.dump_profiler();
    Ok(())
}

#[test]
fn test_phase_blocks_follow_event_profiler_parameter() -> Result<()> {
    let root = tempdir()?;
    let mut engine = headless_engine();
    engine.initialize(
        &base_parameters(root.path())
            .with("Headless", true)
            .with("EventProfiler", false),
    )?;
    engine.run_frame();

    let profiler = engine
        .subsystem::<gale_telemetry::Profiler>()
        .expect("registered profiler");
    assert_eq!(profiler.frames(), 1);
    assert!(profiler.block("Update").is_none());
    assert!(profiler.block("Render").is_some());
    Ok(())
}
