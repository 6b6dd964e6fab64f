//! Matrix-styled console output.

mod handler;
mod screens;

pub use handler::{LogHandler, MatrixConsole, sanitize};

use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{self, Write};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Text colors of the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    BrightGreen,
    DarkGreen,
    Cyan,
    Red,
    Yellow,
    Dim,
}

fn set_tone<W: Write>(w: &mut W, tone: Tone) -> io::Result<()> {
    match tone {
        Tone::Green => queue!(w, SetForegroundColor(Color::Green)),
        Tone::BrightGreen => queue!(
            w,
            SetForegroundColor(Color::DarkGreen),
            SetAttribute(Attribute::Bold)
        ),
        Tone::DarkGreen => queue!(w, SetForegroundColor(Color::DarkGreen)),
        Tone::Cyan => queue!(w, SetForegroundColor(Color::Cyan)),
        Tone::Red => queue!(w, SetForegroundColor(Color::Red)),
        Tone::Yellow => queue!(w, SetForegroundColor(Color::Yellow)),
        Tone::Dim => queue!(w, SetAttribute(Attribute::Dim)),
    }
}

/// Write `text` in `tone`, then reset styling.
pub fn paint<W: Write>(w: &mut W, tone: Tone, text: &str) -> io::Result<()> {
    set_tone(w, tone)?;
    queue!(w, Print(text), SetAttribute(Attribute::Reset), ResetColor)
}

/// [`paint`] followed by a newline.
pub fn paint_line<W: Write>(w: &mut W, tone: Tone, text: &str) -> io::Result<()> {
    paint(w, tone, text)?;
    writeln!(w)
}

/// Spaces needed to pad `text` to `width` terminal columns.
#[must_use]
pub fn padding(text: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(text.width()))
}

/// Animation speed of startup and shutdown screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Character-by-character typing with pauses between steps.
    Animated,
    /// Everything printed at once.
    Instant,
}

// Screens are drawn while no session task is running, so the sleeps below
// block the runtime thread on purpose.
impl Pace {
    fn wait(self, duration: Duration) {
        if self == Pace::Animated {
            std::thread::sleep(duration);
        }
    }
}

/// Writer for the themed screens.
pub struct Console<W: Write> {
    out: W,
    pace: Pace,
}

impl Console<io::Stdout> {
    pub fn stdout(pace: Pace) -> Self {
        Self::new(io::stdout(), pace)
    }
}

impl Console<io::Stderr> {
    pub fn stderr(pace: Pace) -> Self {
        Self::new(io::stderr(), pace)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, pace: Pace) -> Self {
        Self { out, pace }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print `text` one character at a time.
    pub fn type_line(&mut self, text: &str, tone: Tone, char_delay: Duration) -> io::Result<()> {
        if self.pace == Pace::Instant {
            paint_line(&mut self.out, tone, text)?;
            return self.out.flush();
        }

        let mut buf = [0u8; 4];
        for ch in text.chars() {
            paint(&mut self.out, tone, ch.encode_utf8(&mut buf))?;
            self.out.flush()?;
            std::thread::sleep(char_delay);
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    fn pause(&mut self, duration: Duration) -> io::Result<()> {
        self.out.flush()?;
        self.pace.wait(duration);
        Ok(())
    }
}

/// Visible text of styled output, with CSI sequences removed.
#[cfg(test)]
pub(crate) fn strip_ansi(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
