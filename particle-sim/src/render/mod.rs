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
//! Double-buffered ASCII renderer
//!
//! Each frame the renderer:
//!
//! 1. presents the back buffer written last frame,
//! 2. resets the back buffer from a pre-rendered clear template holding the
//!    border and axes,
//! 3. writes one glyph per entity from the frame's position snapshot,
//! 4. re-stamps the border so entities that left the world are hidden.
//!
//! Entities outside the world are pinned onto the border cells rather than
//! skipped, and step 4 paints over them. With hundreds of thousands of
//! entities this keeps the write loop free of visibility branches.
//!
//! The renderer reads velocities only at construction. During a frame it
//! touches nothing but the snapshot and its own buffers, so it can run
//! beside the integrator without locks.

mod glyph;
mod grid;
mod sink;

pub use glyph::{DrawProperties, Heading};
pub use grid::{
    CharGrid, GridConfig, BLANK, BORDER, HORIZONTAL_SCALE, MAX_AXIS_CELLS, MIN_AXIS_CELLS, ORIGIN,
    X_AXIS, Y_AXIS,
};
pub use sink::{DisplaySink, MemorySink, TerminalSink};

use crate::error::{RenderError, SimError};
use crate::frame::FrameSnapshot;
use crate::store::{Position, Velocity};

/// Unit of work that draws one frame from a position snapshot
///
/// The frame orchestrator drives this seam on one worker while the
/// integrator runs on the other.
pub trait FrameRender: Send {
    /// Draw the frame described by `snapshot`
    fn render(&mut self, snapshot: &FrameSnapshot) -> Result<(), RenderError>;

    /// Tear down the display
    fn shutdown(&mut self) -> Result<(), RenderError>;
}

/// Renderer with a clear template, a back buffer and cached glyphs
pub struct FrameRenderer<S: DisplaySink> {
    grid: GridConfig,
    clear: CharGrid,
    back: CharGrid,
    draw_properties: Vec<DrawProperties>,
    sink: S,
}

impl<S: DisplaySink> FrameRenderer<S> {
    /// Create a renderer and initialise its sink
    ///
    /// Glyphs are derived from `velocities` here and never again.
    pub fn new(velocities: &[Velocity], grid: GridConfig, mut sink: S) -> Result<Self, SimError> {
        grid.validate()?;
        sink.initialize()?;

        let draw_properties = velocities.iter().map(DrawProperties::from_velocity).collect();
        let clear = build_clear_template(&grid);
        let back = clear.clone();

        log::debug!(
            "renderer ready: {}x{} console cells, {} entities",
            grid.console_width(),
            grid.console_height(),
            velocities.len()
        );

        Ok(FrameRenderer {
            grid,
            clear,
            back,
            draw_properties,
            sink,
        })
    }

    /// Grid geometry
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Buffer that the next `render` call will present
    pub fn back_buffer(&self) -> &CharGrid {
        &self.back
    }

    /// Pre-rendered static geometry
    pub fn clear_template(&self) -> &CharGrid {
        &self.clear
    }

    /// Cached glyph per entity
    pub fn draw_properties(&self) -> &[DrawProperties] {
        &self.draw_properties
    }

    /// The display sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Present last frame and draw `positions` into the back buffer
    pub fn render_positions(&mut self, positions: &[Position]) -> Result<(), RenderError> {
        debug_assert_eq!(positions.len(), self.draw_properties.len());

        self.sink.present(&self.back)?;
        self.back.copy_from(&self.clear);
        self.write_entities(positions);
        stamp_border(&mut self.back);
        Ok(())
    }

    fn write_entities(&mut self, positions: &[Position]) {
        for (position, props) in positions.iter().zip(&self.draw_properties) {
            let (column, row) = self.grid.cell_for(position.pos);
            self.back.set(column, row, props.glyph);
        }
    }
}

impl<S: DisplaySink> FrameRender for FrameRenderer<S> {
    fn render(&mut self, snapshot: &FrameSnapshot) -> Result<(), RenderError> {
        self.render_positions(snapshot.positions())
    }

    fn shutdown(&mut self) -> Result<(), RenderError> {
        self.sink.shutdown()
    }
}

fn build_clear_template(grid: &GridConfig) -> CharGrid {
    let mut template = CharGrid::for_config(grid);
    let (center_column, center_row) = grid.center_cell();

    template.fill_row(center_row, X_AXIS);
    template.fill_column(center_column, Y_AXIS);
    template.set(center_column, center_row, ORIGIN);
    stamp_border(&mut template);
    template
}

fn stamp_border(buffer: &mut CharGrid) {
    let last_row = buffer.height() - 1;
    let last_column = buffer.width() - 1;
    buffer.fill_row(0, BORDER);
    buffer.fill_row(last_row, BORDER);
    buffer.fill_column(0, BORDER);
    buffer.fill_column(last_column, BORDER);
}
