/// Single-line percentage display for a running conversion
use std::io::{self, Write};

/// Redraws `Decoding... NN%` only when the whole percentage changes
#[derive(Debug, Default)]
pub struct ProgressLine {
    last_percent: Option<u32>,
}

impl ProgressLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole percentage for a progress fraction; never reports 100 early
    pub fn percent(fraction: f32) -> u32 {
        (fraction.clamp(0.0, 1.0) * 100.0).floor() as u32
    }

    /// Render `fraction` if it moves the displayed percentage
    ///
    /// Returns whether anything was written.
    pub fn update<W: Write>(&mut self, out: &mut W, fraction: f32) -> io::Result<bool> {
        let percent = Self::percent(fraction);
        if self.last_percent == Some(percent) {
            return Ok(false);
        }
        self.last_percent = Some(percent);
        write!(out, "\rDecoding... {:>3}%", percent)?;
        out.flush()?;
        Ok(true)
    }

    /// End the line if anything was drawn
    pub fn finish<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.last_percent.is_some() {
            writeln!(out)?;
        }
        Ok(())
    }
}
