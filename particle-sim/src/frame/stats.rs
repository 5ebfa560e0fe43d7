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
//! End-of-run statistics

use std::fmt;
use std::time::Duration;

/// Aggregate timing for a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    /// Frames completed
    pub frames: u64,
    /// App-clock time from start to the last frame
    pub elapsed: Duration,
    /// Total time inside the integrator
    pub simulation: Duration,
    /// Total time inside the renderer
    pub render: Duration,
}

impl RunStats {
    /// Frames per second over the whole run
    pub fn average_fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }

    /// Mean frame time
    pub fn average_frame_time(&self) -> Duration {
        self.per_frame(self.elapsed)
    }

    /// Mean integrator time per frame
    pub fn average_simulation_time(&self) -> Duration {
        self.per_frame(self.simulation)
    }

    /// Mean renderer time per frame
    pub fn average_render_time(&self) -> Duration {
        self.per_frame(self.render)
    }

    fn per_frame(&self, total: Duration) -> Duration {
        if self.frames == 0 {
            Duration::ZERO
        } else {
            total.div_f64(self.frames as f64)
        }
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Num frames: {}, Average FPS: {:.1}", self.frames, self.average_fps())?;
        writeln!(f, "Average frame time: {:.3} ms", millis(self.average_frame_time()))?;
        writeln!(f, "Average sim time: {:.3} ms", millis(self.average_simulation_time()))?;
        write!(f, "Average render time: {:.3} ms", millis(self.average_render_time()))
    }
}
