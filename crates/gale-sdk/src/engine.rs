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

//! The engine orchestrator.

use crate::error::EngineError;
use crate::subsystems::{Audio, Graphics, Input, Renderer, Ui};
use gale_control::{FrameGovernor, WorkQueue};
use gale_core::event::EventBus;
use gale_core::platform::Platform;
use gale_core::{
    EngineParameters, FrameEvent, FramePhase, ParameterTable, PhaseDispatcher, SubscriptionId,
    SubsystemRegistry, SystemEvent, SystemTicks, TickSource, Time,
};
use gale_io::{FileSystem, ResourceCache, ResourcePathResolver};
use gale_telemetry::{DebugHud, LogService, Profiler};
use std::sync::Arc;

/// Lifecycle stage of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Subsystems registered, nothing initialized.
    Constructed,
    /// Initialization has started but not succeeded. An engine whose
    /// initialization failed stays here.
    Initializing,
    /// Frames can be run.
    Running,
    /// Shutting down; frames no longer run.
    Exiting,
}

/// Owns the subsystems and runs the frame loop.
///
/// Construction registers the leaf subsystems (worker queue, profiler, file
/// system, logging, resource cache, input, audio, UI). [`initialize`](Self::initialize)
/// adds the graphics device and renderer unless running headless, resolves
/// resource paths and opens the devices. After that the host calls
/// [`run_frame`](Self::run_frame) in a loop until [`is_exiting`](Self::is_exiting).
///
/// Every frame is announced to subscribers through the frame phases, in
/// order: begin frame, the four update phases, then end frame.
pub struct Engine {
    platform: Box<dyn Platform>,
    registry: SubsystemRegistry,
    dispatcher: PhaseDispatcher,
    time: Time,
    governor: FrameGovernor,
    system_events: EventBus<SystemEvent>,
    debug_hud_subscription: Option<SubscriptionId>,
    initialization_attempted: bool,
    initialized: bool,
    exiting: bool,
    headless: bool,
    audio_paused: bool,
    profile_phases: bool,
    pause_minimized: bool,
    auto_exit: bool,
}

impl Engine {
    /// Creates an engine using the system clock.
    pub fn new(platform: Box<dyn Platform>) -> Self {
        Self::with_tick_source(platform, SystemTicks::shared())
    }

    /// Creates an engine whose clock and frame limiter read `ticks`.
    pub fn with_tick_source(mut platform: Box<dyn Platform>, ticks: Arc<dyn TickSource>) -> Self {
        let mut registry = SubsystemRegistry::new();
        registry.register(WorkQueue::new());
        registry.register(Profiler::new(Arc::clone(&ticks)));
        registry.register(FileSystem::new());
        registry.register(LogService::new());
        registry.register(ResourceCache::new());
        registry.register(Input::new(platform.create_input()));
        registry.register(Audio::new(platform.create_audio()));
        registry.register(Ui::new(platform.create_ui()));

        log::debug!("Created engine on the {} platform", platform.name());

        Self {
            platform,
            registry,
            dispatcher: PhaseDispatcher::new(),
            time: Time::new(Arc::clone(&ticks)),
            governor: FrameGovernor::new(ticks),
            system_events: EventBus::new(),
            debug_hud_subscription: None,
            initialization_attempted: false,
            initialized: false,
            exiting: false,
            headless: false,
            audio_paused: false,
            profile_phases: false,
            pause_minimized: false,
            auto_exit: true,
        }
    }

    /// Initializes the engine from a parameter table.
    ///
    /// Succeeds immediately if already initialized. Any failure is final:
    /// later calls return [`EngineError::InitializationFailed`].
    pub fn initialize(&mut self, parameters: &ParameterTable) -> Result<(), EngineError> {
        if self.initialized {
            return Ok(());
        }
        if self.initialization_attempted {
            return Err(EngineError::InitializationFailed);
        }
        self.initialization_attempted = true;

        match self.try_initialize(parameters) {
            Ok(()) => {
                self.initialized = true;
                log::info!("Initialized engine");
                Ok(())
            }
            Err(err) => {
                log::error!("Engine initialization failed: {err}");
                Err(err)
            }
        }
    }

    fn try_initialize(&mut self, parameters: &ParameterTable) -> Result<(), EngineError> {
        let parameters = EngineParameters::from_table(parameters);
        self.headless = parameters.headless;
        self.profile_phases = parameters.event_profiler;

        if let Some(log_service) = self.registry.get_mut::<LogService>() {
            if let Err(err) = log_service.open(&parameters.log) {
                log::warn!("Logging to the console instead: {err:#}");
            }
        }
        log::info!(
            "Initializing engine on the {} platform{}",
            self.platform.name(),
            if self.headless { " (headless)" } else { "" }
        );

        if !self.headless {
            let graphics = Graphics::new(self.platform.create_graphics());
            let renderer = Renderer::new(self.platform.create_renderer());
            self.registry.register(graphics);
            self.registry.register(renderer);
        }

        self.time.set_timer_period(1);
        if !parameters.frame_limiter {
            self.governor.set_max_fps(0);
        }

        let threads = parameters
            .worker_threads
            .unwrap_or_else(default_worker_threads);
        if threads > 0 {
            if let Some(queue) = self.registry.get_mut::<WorkQueue>() {
                queue.create_threads(threads);
            }
        }

        self.load_resources(&parameters, false)?;

        if !self.headless {
            let graphics = self
                .registry
                .get_mut::<Graphics>()
                .ok_or(EngineError::MissingSubsystem("Graphics"))?;
            graphics.set_mode(&parameters.window)?;
            if let Some(renderer) = self.registry.get_mut::<Renderer>() {
                renderer.apply_settings(&parameters.render);
            }

            if parameters.sound {
                if let Some(audio) = self.registry.get_mut::<Audio>() {
                    if let Err(err) = audio.set_mode(&parameters.audio) {
                        log::warn!("Continuing without sound: {err:#}");
                    }
                }
            }
        }

        self.governor.reset();
        Ok(())
    }

    /// Re-resolves the resource paths in `parameters` into the resource cache,
    /// optionally removing every existing source first.
    ///
    /// Autoloaded sources are put ahead of everything already in the cache;
    /// explicit paths and packages go after it.
    pub fn initialize_resource_cache(
        &mut self,
        parameters: &ParameterTable,
        remove_old: bool,
    ) -> Result<(), EngineError> {
        let parameters = EngineParameters::from_table(parameters);
        self.load_resources(&parameters, remove_old)
            .inspect_err(|err| log::error!("{err}"))
    }

    fn load_resources(
        &mut self,
        parameters: &EngineParameters,
        remove_old: bool,
    ) -> Result<(), EngineError> {
        let resolver = ResourcePathResolver::from_parameters(parameters);
        let plan = {
            let file_system = self
                .registry
                .get::<FileSystem>()
                .ok_or(EngineError::MissingSubsystem("FileSystem"))?;
            resolver.resolve(file_system)?
        };

        let cache = self
            .registry
            .get_mut::<ResourceCache>()
            .ok_or(EngineError::MissingSubsystem("ResourceCache"))?;
        if remove_old {
            cache.remove_all();
        }
        plan.apply(cache);
        Ok(())
    }

    /// Runs one frame.
    ///
    /// Must only be called after a successful [`initialize`](Self::initialize).
    /// Does nothing once the engine is exiting.
    pub fn run_frame(&mut self) {
        debug_assert!(self.initialized, "run_frame called before initialize");
        if !self.initialized {
            return;
        }

        for event in self.system_events.drain() {
            match event {
                SystemEvent::ExitRequested if self.auto_exit => {
                    log::info!("Exit requested");
                    self.do_exit();
                }
                SystemEvent::ExitRequested => {
                    log::debug!("Exit requested, but auto exit is disabled");
                }
            }
        }

        if !self.headless && !self.graphics_alive() {
            log::info!("Display surface lost, exiting");
            self.exiting = true;
        }
        if self.exiting {
            return;
        }

        let event = self.time.begin_frame(self.governor.time_step());
        self.with_profiler(Profiler::begin_frame);
        self.dispatch(FramePhase::BeginFrame, &event);

        if self.pause_minimized && self.is_minimized() {
            if let Some(audio) = self.registry.get_mut::<Audio>() {
                if audio.is_playing() {
                    audio.stop();
                    self.audio_paused = true;
                }
            }
        } else {
            if self.audio_paused {
                if let Some(audio) = self.registry.get_mut::<Audio>() {
                    audio.play();
                }
                self.audio_paused = false;
            }
            for phase in FramePhase::UPDATE {
                self.dispatch(phase, &event);
            }
        }

        self.with_profiler(|profiler| profiler.begin_block("Render"));
        self.render();
        self.with_profiler(Profiler::end_block);

        self.with_profiler(|profiler| profiler.begin_block("ApplyFrameLimit"));
        self.apply_frame_limit();
        self.with_profiler(Profiler::end_block);

        let event = self.time.end_frame();
        self.dispatch(FramePhase::EndFrame, &event);
        self.with_profiler(Profiler::end_frame);
    }

    fn dispatch(&mut self, phase: FramePhase, event: &FrameEvent) {
        if self.profile_phases {
            self.with_profiler(|profiler| profiler.begin_block(phase.name()));
        }
        self.dispatcher.dispatch(phase, event, &mut self.registry);
        if self.profile_phases {
            self.with_profiler(Profiler::end_block);
        }
    }

    fn with_profiler(&mut self, f: impl FnOnce(&mut Profiler)) {
        if let Some(profiler) = self.registry.get_mut::<Profiler>() {
            f(profiler);
        }
    }

    fn render(&mut self) {
        if self.headless {
            return;
        }
        let Some(graphics) = self.registry.get_mut::<Graphics>() else {
            return;
        };
        if !graphics.begin_frame() {
            return;
        }

        if let Some(renderer) = self.registry.get_mut::<Renderer>() {
            renderer.render();
        }
        if let Some(ui) = self.registry.get_mut::<Ui>() {
            ui.render();
        }
        if let Some(graphics) = self.registry.get_mut::<Graphics>() {
            graphics.end_frame();
        }
    }

    /// Waits out the rest of the frame and updates the timestep of the next
    /// one. Runs automatically at the end of every frame; does nothing
    /// before initialization.
    pub fn apply_frame_limit(&mut self) {
        if !self.initialized {
            return;
        }
        let has_focus = self.registry.get::<Input>().is_none_or(Input::has_focus);
        self.governor.apply_frame_limit(has_focus);
    }

    /// Closes the window and starts exiting.
    pub fn exit(&mut self) {
        self.do_exit();
    }

    fn do_exit(&mut self) {
        if let Some(graphics) = self.registry.get_mut::<Graphics>() {
            graphics.close();
        }
        self.exiting = true;
    }

    fn graphics_alive(&self) -> bool {
        self.registry
            .get::<Graphics>()
            .is_some_and(Graphics::is_initialized)
    }

    fn is_minimized(&self) -> bool {
        self.registry.get::<Input>().is_some_and(Input::is_minimized)
    }

    /// Creates the debug HUD on first use and returns it.
    ///
    /// Returns `None` when headless or not initialized.
    pub fn create_debug_hud(&mut self) -> Option<&mut DebugHud> {
        if self.headless || !self.initialized {
            return None;
        }

        if !self.registry.contains::<DebugHud>() {
            self.registry.register(DebugHud::new());
            log::debug!("Created debug HUD");
        }
        if self.debug_hud_subscription.is_none() {
            let id = self
                .dispatcher
                .subscribe(FramePhase::PostUpdate, |event, registry| {
                    if let Some(hud) = registry.get_mut::<DebugHud>() {
                        hud.record(event);
                    }
                });
            self.debug_hud_subscription = Some(id);
        }
        self.registry.get_mut::<DebugHud>()
    }

    /// Logs the resource cache's sources.
    pub fn dump_resources(&self) {
        match self.registry.get::<ResourceCache>() {
            Some(cache) => {
                for line in cache.summary().lines() {
                    log::info!("{line}");
                }
            }
            None => log::warn!("No resource cache registered"),
        }
    }

    /// Logs the profiler's timings since the engine started.
    pub fn dump_profiler(&self) {
        match self.registry.get::<Profiler>() {
            Some(profiler) => {
                for line in profiler.print_data(true, true).lines() {
                    log::info!("{line}");
                }
            }
            None => log::warn!("No profiler registered"),
        }
    }

    /// Subscribes a callback to a frame phase. Callbacks of one phase run in
    /// subscription order.
    pub fn subscribe<F>(&mut self, phase: FramePhase, callback: F) -> SubscriptionId
    where
        F: FnMut(&FrameEvent, &mut SubsystemRegistry) + 'static,
    {
        self.dispatcher.subscribe(phase, callback)
    }

    /// Removes a subscription. Returns `false` if it did not exist.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.debug_hud_subscription == Some(id) {
            self.debug_hud_subscription = None;
        }
        self.dispatcher.unsubscribe(id)
    }

    /// Sender hosts use to deliver [`SystemEvent`]s, from any thread.
    pub fn system_event_sender(&self) -> flume::Sender<SystemEvent> {
        self.system_events.sender()
    }

    /// Looks up a subsystem.
    pub fn subsystem<T: 'static>(&self) -> Option<&T> {
        self.registry.get::<T>()
    }

    /// Looks up a subsystem mutably.
    pub fn subsystem_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.registry.get_mut::<T>()
    }

    /// The subsystem registry.
    pub fn registry(&self) -> &SubsystemRegistry {
        &self.registry
    }

    /// The subsystem registry, for registering application subsystems.
    pub fn registry_mut(&mut self) -> &mut SubsystemRegistry {
        &mut self.registry
    }

    /// Current lifecycle stage.
    pub fn state(&self) -> EngineState {
        if self.exiting {
            EngineState::Exiting
        } else if self.initialized {
            EngineState::Running
        } else if self.initialization_attempted {
            EngineState::Initializing
        } else {
            EngineState::Constructed
        }
    }

    /// Whether initialization succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the engine is exiting.
    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Whether the engine runs without graphics.
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// The frame clock.
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// The frame governor.
    pub fn governor(&self) -> &FrameGovernor {
        &self.governor
    }

    /// Pause updates and audio while the window is minimized.
    pub fn set_pause_minimized(&mut self, enable: bool) {
        self.pause_minimized = enable;
    }

    /// Whether updates pause while minimized.
    pub fn pause_minimized(&self) -> bool {
        self.pause_minimized
    }

    /// Exit when the host delivers [`SystemEvent::ExitRequested`].
    pub fn set_auto_exit(&mut self, enable: bool) {
        self.auto_exit = enable;
    }

    /// Whether exit requests are honoured.
    pub fn auto_exit(&self) -> bool {
        self.auto_exit
    }

    /// See [`FrameGovernor::set_min_fps`].
    pub fn set_min_fps(&mut self, fps: u32) {
        self.governor.set_min_fps(fps);
    }

    /// See [`FrameGovernor::set_max_fps`].
    pub fn set_max_fps(&mut self, fps: u32) {
        self.governor.set_max_fps(fps);
    }

    /// See [`FrameGovernor::set_max_inactive_fps`].
    pub fn set_max_inactive_fps(&mut self, fps: u32) {
        self.governor.set_max_inactive_fps(fps);
    }

    /// See [`FrameGovernor::set_time_step_smoothing`].
    pub fn set_time_step_smoothing(&mut self, frames: usize) {
        self.governor.set_time_step_smoothing(frames);
    }

    /// See [`FrameGovernor::set_next_time_step`].
    pub fn set_next_time_step(&mut self, seconds: f32) {
        self.governor.set_next_time_step(seconds);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        log::info!("Shutting down engine");
        self.registry.teardown();
    }
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|cores| cores.get().saturating_sub(1))
        .unwrap_or(0)
}
