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
//! Console grid geometry and character buffers

use std::fmt;

use crate::error::ConfigError;
use crate::store::Vec2;

/// Console columns per world column
///
/// Terminal cells are roughly twice as tall as they are wide, so every
/// world column is drawn as a glyph followed by a blank.
pub const HORIZONTAL_SCALE: usize = 2;

/// Smallest grid that still fits a border around the axes
pub const MIN_AXIS_CELLS: usize = 3;

/// Largest grid axis accepted; terminals address cells with `u16`
pub const MAX_AXIS_CELLS: usize = 4096;

/// Border glyph
pub const BORDER: u8 = b'X';
/// Horizontal axis glyph
pub const X_AXIS: u8 = b'-';
/// Vertical axis glyph
pub const Y_AXIS: u8 = b'|';
/// Origin marker glyph
pub const ORIGIN: u8 = b'O';
/// Empty cell
pub const BLANK: u8 = b' ';

/// Size of the simulated world as seen on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    /// World columns; the console is [`HORIZONTAL_SCALE`] times wider
    pub world_width: usize,
    /// World rows, one console row each
    pub world_height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            world_width: 83,
            world_height: 39,
        }
    }
}

impl GridConfig {
    /// Create a grid configuration
    pub fn new(world_width: usize, world_height: usize) -> Self {
        GridConfig {
            world_width,
            world_height,
        }
    }

    /// Check that both axes can hold a border and an axis line
    pub fn validate(&self) -> Result<(), ConfigError> {
        let axis_ok = |n: usize| (MIN_AXIS_CELLS..=MAX_AXIS_CELLS).contains(&n);
        if !axis_ok(self.world_width) || !axis_ok(self.world_height) {
            return Err(ConfigError::Grid {
                width: self.world_width,
                height: self.world_height,
                min: MIN_AXIS_CELLS,
            });
        }
        Ok(())
    }

    /// Console columns
    pub fn console_width(&self) -> usize {
        self.world_width * HORIZONTAL_SCALE
    }

    /// Console rows
    pub fn console_height(&self) -> usize {
        self.world_height
    }

    /// Cell holding the world origin, `(column, row)`
    pub fn center_cell(&self) -> (usize, usize) {
        (center_of(self.console_width()), center_of(self.console_height()))
    }

    /// Unclamped console cell for a world position
    ///
    /// `column = floor(x * 2) + cx`, `row = floor(-y) + cy`. World y points
    /// up, console rows count down.
    pub fn project(&self, position: Vec2) -> (i64, i64) {
        let (cx, cy) = self.center_cell();
        // `as` saturates, so far-away and infinite positions stay in range
        let column = ((position.x * HORIZONTAL_SCALE as f32).floor() as i64).saturating_add(cx as i64);
        let row = ((-position.y).floor() as i64).saturating_add(cy as i64);
        (column, row)
    }

    /// Console cell for a world position, pinned onto the grid
    ///
    /// Positions outside the world land on the border, which the renderer
    /// re-stamps after writing entities.
    pub fn cell_for(&self, position: Vec2) -> (usize, usize) {
        let (column, row) = self.project(position);
        let max_column = self.console_width() as i64 - 1;
        let max_row = self.console_height() as i64 - 1;
        (column.clamp(0, max_column) as usize, row.clamp(0, max_row) as usize)
    }

    /// Check if a world position falls strictly inside the border
    pub fn is_interior(&self, position: Vec2) -> bool {
        let (column, row) = self.project(position);
        column > 0
            && row > 0
            && column < self.console_width() as i64 - 1
            && row < self.console_height() as i64 - 1
    }
}

fn center_of(axis: usize) -> usize {
    axis / 2 - 1
}

/// Fixed-size grid of ASCII cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl CharGrid {
    /// Create a grid filled with `fill`
    pub fn new(width: usize, height: usize, fill: u8) -> Self {
        CharGrid {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    /// Blank grid sized for `config`
    pub fn for_config(config: &GridConfig) -> Self {
        Self::new(config.console_width(), config.console_height(), BLANK)
    }

    /// Columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at `(column, row)`
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the grid.
    pub fn get(&self, column: usize, row: usize) -> u8 {
        self.cells[self.index(column, row)]
    }

    /// Write the cell at `(column, row)`
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the grid.
    #[inline]
    pub fn set(&mut self, column: usize, row: usize, glyph: u8) {
        let index = self.index(column, row);
        self.cells[index] = glyph;
    }

    /// One row of cells
    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.width;
        &self.cells[start..start + self.width]
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Overwrite this grid with `other`
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, other: &CharGrid) {
        assert!(
            self.width == other.width && self.height == other.height,
            "Grid dimensions must match"
        );
        self.cells.copy_from_slice(&other.cells);
    }

    /// Fill a whole row
    pub fn fill_row(&mut self, row: usize, glyph: u8) {
        let start = row * self.width;
        self.cells[start..start + self.width].fill(glyph);
    }

    /// Fill a whole column
    pub fn fill_column(&mut self, column: usize, glyph: u8) {
        for row in 0..self.height {
            self.set(column, row, glyph);
        }
    }

    /// Count cells holding `glyph`
    pub fn count(&self, glyph: u8) -> usize {
        self.cells.iter().filter(|&&c| c == glyph).count()
    }

    #[inline]
    fn index(&self, column: usize, row: usize) -> usize {
        assert!(column < self.width && row < self.height, "Cell ({}, {}) outside grid", column, row);
        row * self.width + column
    }
}

impl fmt::Display for CharGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for &cell in self.row(row) {
                write!(f, "{}", cell as char)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
