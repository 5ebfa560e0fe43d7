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
//! Display sinks
//!
//! A sink receives finished character grids. The renderer only needs
//! `initialize`, `present` and `shutdown`; everything else about the
//! terminal is the sink's business.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::tty::IsTty;
use crossterm::{cursor, execute, queue, style::Print, terminal};

use super::CharGrid;
use crate::error::RenderError;

/// Destination for rendered frames
pub trait DisplaySink: Send {
    /// Prepare the display; called once before the first frame
    fn initialize(&mut self) -> Result<(), RenderError>;

    /// Show a finished grid
    ///
    /// Returns [`RenderError::Interrupted`] after showing the grid if the
    /// user asked to quit.
    fn present(&mut self, grid: &CharGrid) -> Result<(), RenderError>;

    /// Restore the display; called once after the last frame
    fn shutdown(&mut self) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Idle,
    Active,
    Closed,
}

impl SinkState {
    fn require_active(self) -> Result<(), RenderError> {
        match self {
            SinkState::Active => Ok(()),
            SinkState::Idle => Err(RenderError::Unavailable("sink not initialized")),
            SinkState::Closed => Err(RenderError::Unavailable("sink already shut down")),
        }
    }
}

/// Terminal sink, drawing to stdout by default
///
/// Switches to the alternate screen, hides the cursor and enables raw mode
/// for the duration of the run, so typed keys are not echoed over the grid.
/// Ctrl-C, `q` and Esc end the run. Dropping an active sink restores the
/// terminal.
pub struct TerminalSink<W: Write + IsTty = Stdout> {
    out: W,
    line: String,
    state: SinkState,
}

impl TerminalSink<Stdout> {
    /// Create a sink on stdout; nothing is written until `initialize`
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for TerminalSink<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + IsTty> TerminalSink<W> {
    /// Create a sink on `out`, which must be a terminal by `initialize`
    pub fn with_output(out: W) -> Self {
        TerminalSink {
            out,
            line: String::new(),
            state: SinkState::Idle,
        }
    }

    fn restore(&mut self) -> io::Result<()> {
        self.state = SinkState::Closed;
        let shown = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        terminal::disable_raw_mode()?;
        shown
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}

fn quit_requested() -> io::Result<bool> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if is_quit_key(&key) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

impl<W: Write + IsTty + Send> DisplaySink for TerminalSink<W> {
    fn initialize(&mut self) -> Result<(), RenderError> {
        if !self.out.is_tty() {
            return Err(RenderError::Unavailable("output is not a terminal"));
        }
        terminal::enable_raw_mode()?;
        // Mark active first so a failure below still restores raw mode
        self.state = SinkState::Active;
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        Ok(())
    }

    fn present(&mut self, grid: &CharGrid) -> Result<(), RenderError> {
        self.state.require_active()?;
        let out = &mut self.out;
        let line = &mut self.line;
        for row in 0..grid.height() {
            line.clear();
            line.extend(grid.row(row).iter().map(|&cell| cell as char));
            queue!(out, cursor::MoveTo(0, row as u16), Print(line.as_str()))?;
        }
        out.flush()?;

        if quit_requested()? {
            return Err(RenderError::Interrupted);
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), RenderError> {
        if self.state != SinkState::Active {
            return Ok(());
        }
        self.restore()?;
        Ok(())
    }
}

impl<W: Write + IsTty> Drop for TerminalSink<W> {
    fn drop(&mut self) {
        if self.state == SinkState::Active {
            let _ = self.restore();
        }
    }
}

/// Headless sink that keeps frames in memory
///
/// Used for benchmarking without a terminal and for inspecting output in
/// tests.
#[derive(Debug, Clone)]
pub struct MemorySink {
    state: SinkState,
    presented: u64,
    last: Option<CharGrid>,
    fail_at: Option<u64>,
    quit_after: Option<u64>,
}

impl MemorySink {
    /// Create an idle memory sink
    pub fn new() -> Self {
        MemorySink {
            state: SinkState::Idle,
            presented: 0,
            last: None,
            fail_at: None,
            quit_after: None,
        }
    }

    /// Sink whose present fails once `presents` frames have been shown
    pub fn failing_after(presents: u64) -> Self {
        MemorySink {
            fail_at: Some(presents),
            ..Self::new()
        }
    }

    /// Sink that reports a user quit once `presents` frames have been shown
    pub fn quitting_after(presents: u64) -> Self {
        MemorySink {
            quit_after: Some(presents),
            ..Self::new()
        }
    }

    /// Number of frames presented
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Most recently presented grid
    pub fn last_frame(&self) -> Option<&CharGrid> {
        self.last.as_ref()
    }

    /// Check if `initialize` has run and `shutdown` has not
    pub fn is_active(&self) -> bool {
        self.state == SinkState::Active
    }

    /// Check if `shutdown` has run
    pub fn is_shut_down(&self) -> bool {
        self.state == SinkState::Closed
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for MemorySink {
    fn initialize(&mut self) -> Result<(), RenderError> {
        self.state = SinkState::Active;
        Ok(())
    }

    fn present(&mut self, grid: &CharGrid) -> Result<(), RenderError> {
        self.state.require_active()?;
        if self.fail_at == Some(self.presented) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "display went away").into());
        }
        match &mut self.last {
            Some(last) if last.width() == grid.width() && last.height() == grid.height() => {
                last.copy_from(grid)
            }
            slot => *slot = Some(grid.clone()),
        }
        self.presented += 1;
        if self.quit_after == Some(self.presented) {
            return Err(RenderError::Interrupted);
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), RenderError> {
        self.state = SinkState::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_lifecycle() {
        let mut sink = MemorySink::new();
        let grid = CharGrid::new(2, 2, b'#');

        assert!(matches!(sink.present(&grid), Err(RenderError::Unavailable(_))));

        sink.initialize().unwrap();
        assert!(sink.is_active());
        sink.present(&grid).unwrap();
        sink.present(&grid).unwrap();
        assert_eq!(sink.presented(), 2);
        assert_eq!(sink.last_frame(), Some(&grid));

        sink.shutdown().unwrap();
        assert!(sink.is_shut_down());
        assert!(sink.present(&grid).is_err());
    }

    #[test]
    fn test_memory_sink_failure() {
        let mut sink = MemorySink::failing_after(1);
        let grid = CharGrid::new(1, 1, b'x');
        sink.initialize().unwrap();
        sink.present(&grid).unwrap();
        assert!(matches!(sink.present(&grid), Err(RenderError::Io(_))));
        assert_eq!(sink.presented(), 1);
    }

    #[test]
    fn test_memory_sink_quit() {
        let mut sink = MemorySink::quitting_after(2);
        let grid = CharGrid::new(1, 1, b'x');
        sink.initialize().unwrap();
        sink.present(&grid).unwrap();
        assert!(matches!(sink.present(&grid), Err(RenderError::Interrupted)));
        assert_eq!(sink.presented(), 2);
    }

    #[test]
    fn test_terminal_sink_rejects_non_terminal() {
        let path = std::env::temp_dir().join(format!("particle-sim-sink-{}.out", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        let mut sink = TerminalSink::with_output(file);

        assert!(matches!(sink.initialize(), Err(RenderError::Unavailable(_))));
        assert!(matches!(
            sink.present(&CharGrid::new(1, 1, b'x')),
            Err(RenderError::Unavailable(_))
        ));
        assert!(sink.shutdown().is_ok());
        drop(sink);

        // Nothing, not even the alternate-screen switch, reached the file
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_quit_keys() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);
        assert!(is_quit_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(is_quit_key(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&press(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(!is_quit_key(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&press(KeyCode::Char('x'), KeyModifiers::NONE)));
        let release = KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert!(!is_quit_key(&release));
    }

    #[test]
    fn test_terminal_sink_requires_initialize() {
        let mut sink = TerminalSink::new();
        let grid = CharGrid::new(1, 1, b'x');
        assert!(matches!(sink.present(&grid), Err(RenderError::Unavailable(_))));
        // Shutting down an idle sink is a no-op.
        assert!(sink.shutdown().is_ok());
    }
}
