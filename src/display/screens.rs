//! Startup and shutdown screens.

use super::{Console, Tone, paint, paint_line, padding};
use std::io::{self, Write};
use std::time::Duration;

/// Inner width of the double-lined boxes.
const BOX_WIDTH: usize = 67;

const BANNER: &[&str] = &[
    "████████████████████████████████████████████████████████████████",
    "██                                                            ██",
    "██  ███    ███  █████  ████████ ██████  ██ ██   ██            ██",
    "██  ████  ████ ██   ██    ██    ██   ██ ██  ██ ██             ██",
    "██  ██ ████ ██ ███████    ██    ██████  ██   ███   █████      ██",
    "██  ██  ██  ██ ██   ██    ██    ██   ██ ██  ██ ██             ██",
    "██  ██      ██ ██   ██    ██    ██   ██ ██ ██   ██            ██",
    "██                                                            ██",
    "██              █████  ██                                     ██",
    "██             ██   ██ ██                                     ██",
    "██             ███████ ██                                     ██",
    "██             ██   ██ ██                                     ██",
    "██             ██   ██ ██                                     ██",
    "██                                                            ██",
    "████████████████████████████████████████████████████████████████",
];

const BOOT_SEQUENCE: &[&str] = &[
    "Establishing connection to the mainframe...",
    "Bypassing security protocols...",
    "Loading neural network patterns...",
    "Synchronizing with agent consciousness...",
    "Calibrating audio matrix interface...",
];

/// One row of a box: tone and text, or `None` for a blank row.
type Row<'a> = Option<(Tone, &'a str)>;

const WELCOME: &[Row<'static>] = &[
    None,
    Some((Tone::BrightGreen, "Wake up, Neo...")),
    Some((Tone::BrightGreen, "The Matrix has you...")),
    Some((Tone::BrightGreen, "Follow the white rabbit.")),
    None,
    Some((Tone::Cyan, "MATRIX-AI is now online and ready to assist.")),
    Some((
        Tone::Dim,
        "Speak naturally - your voice will be processed in real-time.",
    )),
    None,
    Some((Tone::Yellow, "[Ctrl+C] to disconnect from the Matrix")),
    None,
];

const FAREWELL: &[Row<'static>] = &[
    Some((Tone::Yellow, "Disconnecting from the Matrix...")),
    Some((Tone::Green, "Until we meet again, Neo.")),
    Some((Tone::Dim, "\"There is no spoon.\"")),
];

fn framed_box<W: Write>(w: &mut W, border: Tone, rows: &[Row<'_>]) -> io::Result<()> {
    paint_line(w, border, &format!("╔{}╗", "═".repeat(BOX_WIDTH)))?;
    for row in rows {
        paint(w, border, "║")?;
        match row {
            Some((tone, text)) => {
                let body = format!("  {text}");
                write!(w, "  ")?;
                paint(w, *tone, text)?;
                write!(w, "{}", padding(&body, BOX_WIDTH))?;
            }
            None => write!(w, "{}", " ".repeat(BOX_WIDTH))?,
        }
        paint_line(w, border, "║")?;
    }
    paint_line(w, border, &format!("╚{}╝", "═".repeat(BOX_WIDTH)))
}

impl<W: Write> Console<W> {
    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        for line in BANNER {
            paint_line(&mut self.out, Tone::BrightGreen, &format!("    {line}"))?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    /// The `[SYSTEM INITIALIZATION]` boot lines.
    pub fn boot_sequence(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        paint_line(&mut self.out, Tone::Green, "[SYSTEM INITIALIZATION]")?;
        self.pause(Duration::from_millis(500))?;

        for step in BOOT_SEQUENCE {
            self.type_line(
                &format!("    ▓▓▓▓▓▓▓▓▓▓ {step}"),
                Tone::DarkGreen,
                Duration::from_millis(20),
            )?;
            self.pause(Duration::from_millis(800))?;
        }

        writeln!(self.out)?;
        paint_line(&mut self.out, Tone::BrightGreen, "[MATRIX-AI ONLINE]")?;
        self.pause(Duration::from_millis(500))
    }

    pub fn welcome(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        framed_box(&mut self.out, Tone::Green, WELCOME)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Device status lines and the listening prompt.
    pub fn voice_status(&mut self, audio_live: bool) -> io::Result<()> {
        self.type_line(
            "Initiating voice interface...",
            Tone::BrightGreen,
            Duration::from_millis(50),
        )?;

        let (audio, speakers) = if audio_live {
            ((Tone::BrightGreen, "ACTIVE"), (Tone::BrightGreen, "READY"))
        } else {
            ((Tone::Yellow, "OFFLINE"), (Tone::Yellow, "OFFLINE"))
        };
        for (label, (tone, state)) in [
            ("🎤 Audio systems: ", audio),
            ("🔊 Speakers: ", speakers),
            ("🧠 Neural network: ", (Tone::BrightGreen, "SYNCHRONIZED")),
        ] {
            paint(&mut self.out, Tone::Green, label)?;
            paint_line(&mut self.out, tone, state)?;
        }

        writeln!(self.out)?;
        paint_line(&mut self.out, Tone::Cyan, "Listening for your commands, Neo...")?;
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Shown when the session ends or the user disconnects.
    pub fn farewell(&mut self) -> io::Result<()> {
        write!(self.out, "\n\n")?;
        framed_box(&mut self.out, Tone::Red, FAREWELL)?;
        self.out.flush()
    }

    /// Shown when the session fails.
    pub fn anomaly(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out)?;
        paint_line(
            &mut self.out,
            Tone::Red,
            &format!("⚠ Matrix anomaly detected: {message}"),
        )?;
        paint_line(
            &mut self.out,
            Tone::Yellow,
            "The Matrix has encountered an unexpected glitch.",
        )?;
        self.out.flush()
    }

    /// Shown when startup configuration is invalid.
    pub fn config_error(&mut self, message: &str) -> io::Result<()> {
        paint_line(
            &mut self.out,
            Tone::Red,
            &format!("⚠ Configuration error: {message}"),
        )?;
        self.out.flush()
    }
}
