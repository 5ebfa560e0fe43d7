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
//! Frame timing
//!
//! The app clock drives delta time and the run budget. The stage
//! stopwatches are observational only and always read the real clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of monotonic time for the app clock
pub trait TimeSource: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl TimeSource for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic time source for replays and tests
///
/// The first reading returns the base instant; each later reading is one
/// `step` further along.
#[derive(Debug)]
pub struct SteppedClock {
    base: Instant,
    step: Duration,
    readings: AtomicU64,
}

impl SteppedClock {
    /// Create a clock that advances `step` per reading
    pub fn new(step: Duration) -> Self {
        SteppedClock {
            base: Instant::now(),
            step,
            readings: AtomicU64::new(0),
        }
    }

    /// Number of readings taken so far
    pub fn readings(&self) -> u64 {
        self.readings.load(Ordering::Relaxed)
    }

    /// Offset of reading `n` from the base, saturating at `u64::MAX` ns
    fn offset(&self, n: u64) -> Duration {
        let nanos = self.step.as_nanos().saturating_mul(u128::from(n));
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl TimeSource for SteppedClock {
    fn now(&self) -> Instant {
        let n = self.readings.fetch_add(1, Ordering::Relaxed);
        self.base + self.offset(n)
    }
}

/// App clock: run start, current frame and previous frame markers
#[derive(Debug, Clone, Copy)]
pub struct AppClock {
    start: Instant,
    current_frame: Instant,
    previous_frame: Instant,
}

impl AppClock {
    /// Start the app clock at `now`
    ///
    /// The previous-frame marker starts at `now` as well, so the first
    /// frame's delta is the time since start.
    pub fn start(now: Instant) -> Self {
        AppClock {
            start: now,
            current_frame: now,
            previous_frame: now,
        }
    }

    /// Mark the beginning of a frame
    pub fn update(&mut self, now: Instant) {
        self.current_frame = now;
    }

    /// Time between the previous frame marker and the current frame
    pub fn delta_since_previous_frame(&self) -> Duration {
        self.current_frame.saturating_duration_since(self.previous_frame)
    }

    /// Time from app start to the current frame
    pub fn elapsed_since_app_start(&self) -> Duration {
        self.current_frame.saturating_duration_since(self.start)
    }

    /// Make the current frame the previous one
    pub fn save_previous_frame(&mut self) {
        self.previous_frame = self.current_frame;
    }
}

/// Accumulating stopwatch for one named stage
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    started: Option<Instant>,
    total: Duration,
    laps: u64,
}

impl Stopwatch {
    /// Create a stopped stopwatch
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing a lap
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop the running lap and add it to the total
    ///
    /// Pausing a stopped stopwatch does nothing.
    pub fn pause(&mut self) {
        if let Some(started) = self.started.take() {
            self.total += started.elapsed();
            self.laps += 1;
        }
    }

    /// Accumulated time over all finished laps
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of finished laps
    pub fn laps(&self) -> u64 {
        self.laps
    }

    /// Mean lap time
    pub fn average(&self) -> Duration {
        if self.laps == 0 {
            Duration::ZERO
        } else {
            self.total / self.laps as u32
        }
    }

    /// Check if a lap is in progress
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }
}

/// Timing context owned by the orchestrator
#[derive(Debug)]
pub struct Clocks<T: TimeSource> {
    source: T,
    /// Run start, frame and delta markers
    pub app: AppClock,
    /// Time spent integrating
    pub simulation: Stopwatch,
    /// Time spent rendering
    pub render: Stopwatch,
}

impl<T: TimeSource> Clocks<T> {
    /// Start the app clock from `source`
    pub fn start(source: T) -> Self {
        let app = AppClock::start(source.now());
        Clocks {
            source,
            app,
            simulation: Stopwatch::new(),
            render: Stopwatch::new(),
        }
    }

    /// Read the time source into the app clock
    pub fn update(&mut self) {
        let now = self.source.now();
        self.app.update(now);
    }

    /// The time source
    pub fn source(&self) -> &T {
        &self.source
    }
}
