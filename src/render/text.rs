use std::io::Write;

use color_eyre::Result;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};

use super::{MetricFrame, Renderer};
use crate::system::snapshot::Snapshot;

const HEADING: &str = "Hardware Status:";
const UPDATED_MARKER: &str = " (updated)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Appends an `(updated)` marker; no escape codes.
    Marker,
    /// White on red.
    Ansi,
}

/// Line-oriented renderer that rewrites the whole screen every tick.
pub struct TextRenderer<W: Write> {
    out: W,
    highlight: Highlight,
    clear_screen: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, highlight: Highlight, clear_screen: bool) -> Self {
        TextRenderer {
            out,
            highlight,
            clear_screen,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&self, buf: &mut Vec<u8>, frame: &MetricFrame) -> std::io::Result<()> {
        if self.clear_screen {
            queue!(buf, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        writeln!(buf, "{HEADING}")?;
        for row in &frame.rows {
            for (i, (text, changed)) in row.segments().into_iter().enumerate() {
                if i > 0 {
                    buf.write_all(b", ")?;
                }
                match (changed, self.highlight) {
                    (false, _) => write!(buf, "{text}")?,
                    (true, Highlight::Marker) => write!(buf, "{text}{UPDATED_MARKER}")?,
                    (true, Highlight::Ansi) => write!(buf, "{}", text.as_str().white().on_red())?,
                }
            }
            buf.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, current: &Snapshot, previous: Option<&Snapshot>) -> Result<()> {
        let frame = MetricFrame::build(current, previous);
        // One write per frame keeps a slow terminal from showing half a frame.
        let mut buf = Vec::with_capacity(256 + frame.rows.len() * 64);
        self.write_frame(&mut buf, &frame)?;
        self.out.write_all(&buf)?;
        self.out.flush()?;
        Ok(())
    }
}
