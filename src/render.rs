//! Frame output for simulation runs.
//!
//! The engine hands every generation to a [`FrameSink`] as a read-only grid
//! plus its generation number. `TerminalSink` animates frames in place on an
//! alternate screen; `TextSink` streams them to any writer.

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::bandlife::Grid;

pub const EXIT_PROMPT: &str = "Press any key to end the program.";

/// Consumer of per-generation snapshots.
pub trait FrameSink {
    fn present(&mut self, frame: &Grid, generation: u64) -> io::Result<()>;
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &Grid, _generation: u64) -> io::Result<()> {
        Ok(())
    }
}

/// Writes each frame as `@`/`.` rows followed by a `Time Step: N` line.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TextSink<W> {
    fn present(&mut self, frame: &Grid, generation: u64) -> io::Result<()> {
        write!(self.out, "{frame}\nTime Step: {generation}\n\n")?;
        self.out.flush()
    }
}

/// Redraws frames in place on the terminal's alternate screen.
///
/// The terminal is restored when the sink is closed or dropped.
pub struct TerminalSink<W: Write> {
    out: W,
    active: bool,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> io::Result<Self> {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        Ok(Self { out, active: true })
    }

    /// Show [`EXIT_PROMPT`] on the last terminal line and block until a key
    /// is pressed.
    pub fn pause_for_key(&mut self) -> io::Result<()> {
        let (_, rows) = terminal::size()?;
        queue!(
            self.out,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            Print(EXIT_PROMPT)
        )?;
        self.out.flush()?;

        terminal::enable_raw_mode()?;
        let waited = wait_for_key_press();
        terminal::disable_raw_mode()?;
        waited
    }

    pub fn close(mut self) -> io::Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            execute!(self.out, cursor::Show, LeaveAlternateScreen)?;
        }
        Ok(())
    }
}

impl<W: Write> FrameSink for TerminalSink<W> {
    fn present(&mut self, frame: &Grid, generation: u64) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All))?;
        let mut line = String::with_capacity(frame.width());
        for (row, cells) in frame.cells().chunks(frame.width()).enumerate() {
            line.clear();
            line.extend(cells.iter().map(|&alive| if alive { '@' } else { '.' }));
            queue!(self.out, cursor::MoveTo(0, clamp_u16(row)), Print(&line))?;
        }
        queue!(
            self.out,
            cursor::MoveTo(0, clamp_u16(frame.height() + 1)),
            Print(format!("Time Step: {generation}"))
        )?;
        self.out.flush()
    }
}

impl<W: Write> Drop for TerminalSink<W> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn wait_for_key_press() -> io::Result<()> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

#[inline]
fn clamp_u16(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}
