//! Conversation handlers: themed console output and plain structured logs.

use super::{Tone, paint, paint_line};
use crate::convai::ConversationHandler;
use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::Mutex;

const RESPONSE_TOP: &str = "┌─ MATRIX-AI RESPONSE ─────────────────────────────────────┐";
const RESPONSE_BOTTOM: &str = "└──────────────────────────────────────────────────────────┘";

/// Replace control characters (other than newline and tab) so transcript text
/// cannot move the cursor or restyle the terminal.
#[must_use]
pub fn sanitize(text: &str) -> Cow<'_, str> {
    let is_unsafe = |c: char| c.is_control() && c != '\n' && c != '\t';
    if !text.chars().any(is_unsafe) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_unsafe(c) { '\u{fffd}' } else { c })
            .collect(),
    )
}

/// Prints conversation events in the Matrix theme.
pub struct MatrixConsole<W: Write + Send> {
    out: Mutex<W>,
}

impl MatrixConsole<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> MatrixConsole<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run `draw` against the writer. Write errors are dropped.
    fn render(&self, draw: impl FnOnce(&mut W) -> io::Result<()>) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = draw(&mut *out).and_then(|()| out.flush()) {
            tracing::debug!("Console write failed: {e}");
        }
    }
}

impl<W: Write + Send> ConversationHandler for MatrixConsole<W> {
    fn on_agent_response(&self, text: &str) {
        let text = sanitize(text);
        self.render(|w| {
            writeln!(w)?;
            paint_line(w, Tone::Cyan, RESPONSE_TOP)?;
            for line in text.lines() {
                paint_line(w, Tone::BrightGreen, &format!("│ {line}"))?;
            }
            if text.is_empty() {
                paint_line(w, Tone::BrightGreen, "│ ")?;
            }
            paint_line(w, Tone::Cyan, RESPONSE_BOTTOM)?;
            writeln!(w)
        });
    }

    fn on_agent_response_correction(&self, original: &str, corrected: &str) {
        let original = sanitize(original);
        let corrected = sanitize(corrected);
        self.render(|w| {
            paint_line(
                w,
                Tone::Yellow,
                "⚠ Agent transmission interrupted - signal corrected",
            )?;
            paint_line(w, Tone::Dim, &format!("Original: {original}"))?;
            paint_line(w, Tone::BrightGreen, &format!("Corrected: {corrected}"))
        });
    }

    fn on_user_transcript(&self, text: &str) {
        let text = sanitize(text);
        self.render(|w| {
            paint(w, Tone::Green, &format!("► Neo: {text}"))?;
            writeln!(w)
        });
    }
}

/// Emits conversation events as `tracing` records instead of ANSI art.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

impl ConversationHandler for LogHandler {
    fn on_agent_response(&self, text: &str) {
        tracing::info!(role = "agent", text = %sanitize(text), "Agent response");
    }

    fn on_agent_response_correction(&self, original: &str, corrected: &str) {
        tracing::info!(
            role = "agent",
            original = %sanitize(original),
            corrected = %sanitize(corrected),
            "Agent response corrected"
        );
    }

    fn on_user_transcript(&self, text: &str) {
        tracing::info!(role = "user", text = %sanitize(text), "User transcript");
    }
}
