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
//! Per-frame position snapshot

use crate::store::Position;

/// Copy of the position column taken at the start of a frame
///
/// The renderer reads this while the integrator writes the live column.
/// The buffer is reused across frames, so capturing does not allocate once
/// the first frame has run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    positions: Vec<Position>,
    frame: u64,
}

impl FrameSnapshot {
    /// Empty snapshot with room for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        FrameSnapshot {
            positions: Vec::with_capacity(capacity),
            frame: 0,
        }
    }

    /// Snapshot of `live` for `frame`
    pub fn of(live: &[Position], frame: u64) -> Self {
        let mut snapshot = Self::with_capacity(live.len());
        snapshot.capture(live, frame);
        snapshot
    }

    /// Overwrite the snapshot with `live`
    pub fn capture(&mut self, live: &[Position], frame: u64) {
        self.positions.clear();
        self.positions.extend_from_slice(live);
        self.frame = frame;
    }

    /// Captured positions
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Frame the snapshot was taken for
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_reuses_buffer() {
        let live = vec![Position::new(1.0, 2.0); 64];
        let mut snapshot = FrameSnapshot::with_capacity(64);
        snapshot.capture(&live, 3);
        let ptr = snapshot.positions().as_ptr();

        let moved = vec![Position::new(-1.0, 0.0); 64];
        snapshot.capture(&moved, 4);

        assert_eq!(snapshot.positions().as_ptr(), ptr);
        assert_eq!(snapshot.positions(), moved.as_slice());
        assert_eq!(snapshot.frame(), 4);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut live = vec![Position::origin(); 2];
        let snapshot = FrameSnapshot::of(&live, 0);
        live[0] = Position::new(9.0, 9.0);
        assert_eq!(snapshot.positions()[0], Position::origin());
    }
}
