// Copyright 2025 John Brosnihan
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
//! Frame orchestration
//!
//! Every frame walks the same states:
//!
//! - `BeginFrame`: check the run budget, read the clock, capture a position
//!   snapshot
//! - `Dispatch`: integrate the live store and render the snapshot on the two
//!   workers
//! - `Join`: collect both results; a render failure aborts the run, a user
//!   quit ends it after this frame
//! - `EndFrame`: advance the previous-frame marker and the frame counter
//!
//! The integrator owns the live store for the whole dispatch and the
//! renderer only sees the snapshot, so the two tasks share nothing mutable.

mod clock;
mod dispatch;
mod snapshot;
mod stats;

pub use clock::{AppClock, Clocks, MonotonicClock, SteppedClock, Stopwatch, TimeSource};
pub use dispatch::Dispatcher;
pub use snapshot::FrameSnapshot;
pub use stats::RunStats;

use std::time::Duration;

use crate::error::{RenderError, SimError};
use crate::integration::MotionStep;
use crate::render::FrameRender;
use crate::store::EntityStore;

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Budget check, delta time and snapshot
    BeginFrame,
    /// Both tasks in flight
    Dispatch,
    /// Both tasks finished; results pending inspection
    Join,
    /// Frame bookkeeping
    EndFrame,
    /// Run is over and the renderer has been shut down
    Finished,
}

/// Limits that end a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunBudget {
    /// App-clock time after which no new frame starts
    pub duration: Duration,
    /// Optional cap on completed frames
    pub frame_limit: Option<u64>,
}

impl RunBudget {
    /// Budget bounded by time only
    pub fn new(duration: Duration) -> Self {
        RunBudget {
            duration,
            frame_limit: None,
        }
    }

    /// Also stop after `frames` frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    fn exhausted(&self, elapsed: Duration, frames: u64) -> bool {
        elapsed >= self.duration || self.frame_limit.is_some_and(|limit| frames >= limit)
    }
}

/// Drives the integrate/render loop
pub struct FrameOrchestrator<I, R, T>
where
    I: MotionStep,
    R: FrameRender,
    T: TimeSource,
{
    store: EntityStore,
    integrator: I,
    renderer: R,
    clocks: Clocks<T>,
    budget: RunBudget,
    snapshot: FrameSnapshot,
    dispatcher: Dispatcher,
    state: FrameState,
    frames: u64,
    interrupted: bool,
}

impl<I, R, T> FrameOrchestrator<I, R, T>
where
    I: MotionStep,
    R: FrameRender,
    T: TimeSource,
{
    /// Create an orchestrator; the app clock starts now
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Workers`] if the worker pool cannot be started.
    pub fn new(
        store: EntityStore,
        integrator: I,
        renderer: R,
        time: T,
        budget: RunBudget,
    ) -> Result<Self, SimError> {
        let dispatcher = Dispatcher::new()?;
        let snapshot = FrameSnapshot::with_capacity(store.len());
        Ok(FrameOrchestrator {
            store,
            integrator,
            renderer,
            clocks: Clocks::start(time),
            budget,
            snapshot,
            dispatcher,
            state: FrameState::BeginFrame,
            frames: 0,
            interrupted: false,
        })
    }

    /// Run frames until the budget is exhausted or the user quits
    ///
    /// The renderer is shut down before this returns, whether the run
    /// finished or aborted.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Render`] if a frame fails to render or the
    /// display cannot be restored, or if the run already finished.
    pub fn run(&mut self) -> Result<RunStats, SimError> {
        if self.state == FrameState::Finished {
            return Err(RenderError::Unavailable("run already finished").into());
        }

        log::info!(
            "starting run: {} entities, budget {:?}, frame limit {:?}",
            self.store.len(),
            self.budget.duration,
            self.budget.frame_limit
        );

        let mut dt = 0.0;
        let mut rendered: Result<(), RenderError> = Ok(());
        loop {
            self.state = match self.state {
                FrameState::BeginFrame => {
                    if self.budget_exhausted() {
                        FrameState::Finished
                    } else {
                        dt = self.begin_frame();
                        FrameState::Dispatch
                    }
                }
                FrameState::Dispatch => {
                    rendered = self.dispatch(dt);
                    FrameState::Join
                }
                FrameState::Join => match std::mem::replace(&mut rendered, Ok(())) {
                    Ok(()) => FrameState::EndFrame,
                    Err(RenderError::Interrupted) => {
                        log::info!("run interrupted by the user at frame {}", self.frames);
                        self.interrupted = true;
                        FrameState::EndFrame
                    }
                    Err(e) => {
                        log::error!("frame {} failed to render: {}", self.frames, e);
                        self.state = FrameState::Finished;
                        if let Err(shutdown) = self.renderer.shutdown() {
                            log::warn!("display shutdown after failed frame: {}", shutdown);
                        }
                        return Err(e.into());
                    }
                },
                FrameState::EndFrame => {
                    self.end_frame();
                    FrameState::BeginFrame
                }
                FrameState::Finished => break,
            };
        }

        self.renderer.shutdown()?;
        let stats = self.stats();
        log::info!(
            "run finished: {} frames in {:?}",
            stats.frames,
            stats.elapsed
        );
        Ok(stats)
    }

    fn budget_exhausted(&self) -> bool {
        self.interrupted
            || self
                .budget
                .exhausted(self.clocks.app.elapsed_since_app_start(), self.frames)
    }

    fn begin_frame(&mut self) -> f32 {
        self.clocks.update();
        self.snapshot.capture(self.store.positions(), self.frames);
        self.clocks.app.delta_since_previous_frame().as_secs_f32()
    }

    fn dispatch(&mut self, dt: f32) -> Result<(), RenderError> {
        let store = &mut self.store;
        let integrator = &mut self.integrator;
        let renderer = &mut self.renderer;
        let snapshot = &self.snapshot;
        let simulation_watch = &mut self.clocks.simulation;
        let render_watch = &mut self.clocks.render;

        let ((), rendered) = self.dispatcher.join(
            move || {
                simulation_watch.start();
                integrator.integrate_store(store, dt);
                simulation_watch.pause();
            },
            move || {
                render_watch.start();
                let rendered = renderer.render(snapshot);
                render_watch.pause();
                rendered
            },
        );
        rendered
    }

    fn end_frame(&mut self) {
        log::trace!(
            "frame {} done: dt {:?}",
            self.frames,
            self.clocks.app.delta_since_previous_frame()
        );
        self.clocks.app.save_previous_frame();
        self.frames += 1;
    }

    /// Statistics for the frames completed so far
    pub fn stats(&self) -> RunStats {
        RunStats {
            frames: self.frames,
            elapsed: self.clocks.app.elapsed_since_app_start(),
            simulation: self.clocks.simulation.total(),
            render: self.clocks.render.total(),
        }
    }

    /// Completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Check if the user ended the run early
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// Current state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// The live store
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The integrator
    pub fn integrator(&self) -> &I {
        &self.integrator
    }

    /// Timing context
    pub fn clocks(&self) -> &Clocks<T> {
        &self.clocks
    }

    /// Snapshot taken at the start of the most recent frame
    pub fn snapshot(&self) -> &FrameSnapshot {
        &self.snapshot
    }
}
