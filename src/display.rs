//! Where live figures are shown.
//!
//! [`TerminalDisplay`] draws into the terminal's alternate screen with
//! half-block pixels and rewrites only the lines covering each update's
//! damaged area. [`HeadlessDisplay`] discards frames and is used for
//! benchmarking, profiling and tests.

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use crate::input::{Action, InputHandler};
use crate::output::TerminalEncoder;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{queue, ExecutableCommand};
use std::io::{self, Stdout, Write};
use std::time::Duration;

/// A surface the live loops push figures to.
pub trait Display {
    /// Show `fb`; only the part inside `damage` changed since the last call.
    fn present(&mut self, fb: &Framebuffer, damage: Rect) -> Result<()>;

    /// Replace the one-line status text below the figure.
    fn set_status(&mut self, status: &str) -> Result<()>;

    /// Next pending user action, without blocking.
    fn poll(&mut self) -> Result<Action>;
}

/// Live view in the terminal.
pub struct TerminalDisplay<W: Write = Stdout> {
    out: W,
    encoder: Option<TerminalEncoder>,
    size: (u16, u16),
    figure_lines: u32,
    interactive: bool,
    input: InputHandler,
}

impl TerminalDisplay<Stdout> {
    /// Take over the terminal: raw mode, alternate screen, hidden cursor.
    ///
    /// The terminal is restored when the display is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched.
    pub fn open() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        out.execute(EnterAlternateScreen)?;
        out.execute(Hide)?;
        out.execute(Clear(ClearType::All))?;

        let size = terminal::size()?;
        log::debug!("terminal display {}x{}", size.0, size.1);

        Ok(Self {
            out,
            encoder: None,
            size,
            figure_lines: 0,
            interactive: true,
            input: InputHandler,
        })
    }
}

impl<W: Write> TerminalDisplay<W> {
    /// Draw into any writer as if it were a `cols` x `lines` terminal,
    /// without touching terminal modes or reading keys.
    #[must_use]
    pub fn with_writer(out: W, cols: u16, lines: u16) -> Self {
        Self {
            out,
            encoder: None,
            size: (cols, lines),
            figure_lines: 0,
            interactive: false,
            input: InputHandler,
        }
    }

    /// The underlying writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn write_lines(&mut self, lines: Vec<(u32, String)>) -> Result<()> {
        for (line, text) in lines {
            queue!(self.out, MoveTo(0, line as u16), Print(text))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn present(&mut self, fb: &Framebuffer, damage: Rect) -> Result<()> {
        let encoder = match &self.encoder {
            Some(encoder) => encoder.clone(),
            None => {
                // Keep the last line for the status text
                let (cols, lines) = self.size;
                let encoder = TerminalEncoder::new().fit(
                    fb,
                    u32::from(cols),
                    u32::from(lines.saturating_sub(1)),
                );
                self.figure_lines = encoder.dimensions(fb).1;
                self.encoder = Some(encoder.clone());

                // First frame: everything is new
                let all = encoder.render_range(fb, 0..self.figure_lines);
                return self.write_lines(all);
            }
        };

        let lines = encoder.lines_covering(fb, damage);
        let rendered = encoder.render_range(fb, lines);
        self.write_lines(rendered)
    }

    fn set_status(&mut self, status: &str) -> Result<()> {
        let row = self.figure_lines.min(u32::from(self.size.1.saturating_sub(1))) as u16;
        queue!(self.out, MoveTo(0, row), Clear(ClearType::CurrentLine), Print(status))?;
        self.out.flush()?;
        Ok(())
    }

    fn poll(&mut self) -> Result<Action> {
        if !self.interactive {
            return Ok(Action::None);
        }

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let action = self.input.handle_key(key);
                    if action != Action::None {
                        return Ok(action);
                    }
                }
            }
        }
        Ok(Action::None)
    }
}

impl<W: Write> Drop for TerminalDisplay<W> {
    fn drop(&mut self) {
        if self.interactive {
            // Best effort: nothing sensible to do if restoring fails
            let _ = self.out.execute(Show);
            let _ = self.out.execute(LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Display that only counts what it is shown.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    frames: u64,
    last_damage: Option<Rect>,
    status: String,
    scripted: Vec<(u64, Action)>,
}

impl HeadlessDisplay {
    /// A display that never reports user input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `action` from [`Display::poll`] once `after_frames` frames were
    /// presented.
    #[must_use]
    pub fn with_action(mut self, after_frames: u64, action: Action) -> Self {
        self.scripted.push((after_frames, action));
        self
    }

    /// Frames presented so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Damage of the most recent frame.
    #[must_use]
    pub const fn last_damage(&self) -> Option<Rect> {
        self.last_damage
    }

    /// Most recent status text.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }
}

impl Display for HeadlessDisplay {
    fn present(&mut self, _fb: &Framebuffer, damage: Rect) -> Result<()> {
        self.frames += 1;
        self.last_damage = Some(damage);
        Ok(())
    }

    fn set_status(&mut self, status: &str) -> Result<()> {
        status.clone_into(&mut self.status);
        Ok(())
    }

    fn poll(&mut self) -> Result<Action> {
        let frames = self.frames;
        if let Some(i) = self.scripted.iter().position(|(after, _)| frames >= *after) {
            return Ok(self.scripted.remove(i).1);
        }
        Ok(Action::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn test_first_present_draws_every_line() {
        let mut fb = Framebuffer::new(40, 20).unwrap();
        fb.clear(Rgba::RED);
        let mut display = TerminalDisplay::with_writer(Vec::new(), 40, 11);

        display.present(&fb, Rect::new(0, 0, 1, 1)).unwrap();

        let text = String::from_utf8(display.writer().clone()).unwrap();
        // 40x20 pixels in 40 columns is 10 lines
        assert_eq!(text.matches("\x1b[0m").count(), 10);
    }

    #[test]
    fn test_later_presents_only_redraw_damaged_lines() {
        let fb = Framebuffer::new(40, 20).unwrap();
        let mut display = TerminalDisplay::with_writer(Vec::new(), 40, 11);
        display.present(&fb, fb.bounds()).unwrap();
        let before = display.writer().len();

        // Pixel rows 4..8 are terminal lines 2 and 3
        display.present(&fb, Rect::new(0, 4, 40, 4)).unwrap();

        let text = String::from_utf8(display.writer()[before..].to_vec()).unwrap();
        assert_eq!(text.matches("\x1b[0m").count(), 2);
    }

    #[test]
    fn test_status_goes_below_figure() {
        let fb = Framebuffer::new(40, 20).unwrap();
        let mut display = TerminalDisplay::with_writer(Vec::new(), 40, 11);
        display.present(&fb, fb.bounds()).unwrap();
        let before = display.writer().len();

        display.set_status("Frame Rate: 8.0fps").unwrap();

        let text = String::from_utf8(display.writer()[before..].to_vec()).unwrap();
        // MoveTo is 1-based on the wire: line 10 -> row 11
        assert!(text.starts_with("\x1b[11;1H"));
        assert!(text.ends_with("Frame Rate: 8.0fps"));
    }

    #[test]
    fn test_non_interactive_poll() {
        let mut display = TerminalDisplay::with_writer(Vec::new(), 10, 10);
        assert_eq!(display.poll().unwrap(), Action::None);
    }

    #[test]
    fn test_headless_counts_frames() {
        let fb = Framebuffer::new(4, 4).unwrap();
        let mut display = HeadlessDisplay::new();
        display.present(&fb, Rect::new(1, 1, 2, 2)).unwrap();
        display.present(&fb, Rect::new(0, 0, 4, 4)).unwrap();
        display.set_status("Sample Rate: 2.0fps").unwrap();

        assert_eq!(display.frames(), 2);
        assert_eq!(display.last_damage(), Some(Rect::new(0, 0, 4, 4)));
        assert_eq!(display.status(), "Sample Rate: 2.0fps");
    }

    #[test]
    fn test_headless_scripted_action() {
        let fb = Framebuffer::new(4, 4).unwrap();
        let mut display = HeadlessDisplay::new().with_action(2, Action::Quit);

        display.present(&fb, fb.bounds()).unwrap();
        assert_eq!(display.poll().unwrap(), Action::None);
        display.present(&fb, fb.bounds()).unwrap();
        assert_eq!(display.poll().unwrap(), Action::Quit);
        assert_eq!(display.poll().unwrap(), Action::None);
    }
}
