//! Terminal rendering for radar grids.
//!
//! Grids are drawn with ANSI cursor positioning and SGR colors. The
//! [`Painter`] remembers the attributes it last emitted and only writes a
//! color change when a glyph needs different ones.

use std::io::{self, Write};

use crate::radar::{Cell, Grid, Side};

/// One entry of the glyph palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub bold: bool,
    /// ANSI color index (0-7)
    pub fg: u8,
}

/// Highest class a population count can reach.
pub const MAX_COUNT_CLASS: usize = 5;

/// Class used for left frustum markers.
pub const LEFT_BORDER_CLASS: usize = 6;

/// Class used for right frustum markers.
pub const RIGHT_BORDER_CLASS: usize = 7;

/// Background color for every cell (black).
pub const BACKGROUND: u8 = 0;

/// Glyph per class: five population levels, blank, and the two borders.
pub const PALETTE: [Glyph; 8] = [
    Glyph { ch: ' ', bold: true, fg: 0 },
    Glyph { ch: '.', bold: true, fg: 0 },
    Glyph { ch: '-', bold: false, fg: 7 },
    Glyph { ch: '+', bold: false, fg: 7 },
    Glyph { ch: '%', bold: true, fg: 7 },
    Glyph { ch: '8', bold: true, fg: 7 },
    Glyph { ch: '/', bold: false, fg: 2 },
    Glyph { ch: '\\', bold: false, fg: 2 },
];

/// Palette class for a cell at the given popmax scale.
///
/// Counts scale by `count * 20 / scale`, saturating at class 5, so only
/// the top fifth of the range shows the densest glyph.
pub fn glyph_class(cell: Cell, scale: u32) -> usize {
    match cell {
        Cell::Count(n) => {
            let class = n as u64 * 20 / scale.max(1) as u64;
            class.min(MAX_COUNT_CLASS as u64) as usize
        }
        Cell::Border(Side::Left) => LEFT_BORDER_CLASS,
        Cell::Border(Side::Right) => RIGHT_BORDER_CLASS,
    }
}

/// Attributes the terminal currently has, as far as the painter knows.
///
/// `None` means unknown, which forces the next change to be emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderState {
    pub bold: Option<bool>,
    pub fg: Option<u8>,
    pub bg: Option<u8>,
}

/// Where a grid is drawn. Zero-based; `None` keeps the cursor's current
/// row or column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Origin {
    pub col: Option<u16>,
    pub row: Option<u16>,
}

impl Origin {
    pub fn at(col: Option<u16>, row: Option<u16>) -> Self {
        Self { col, row }
    }
}

/// Grid painter over any output stream.
pub struct Painter<W: Write> {
    out: W,
    state: RenderState,
}

impl<W: Write> Painter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: RenderState::default(),
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn set_bold(&mut self, bold: bool) -> io::Result<()> {
        if self.state.bold != Some(bold) {
            if bold {
                self.out.write_all(b"\x1b[1m")?;
            } else {
                self.out.write_all(b"\x1b[22m")?;
            }
            self.state.bold = Some(bold);
        }
        Ok(())
    }

    fn set_fg(&mut self, fg: u8) -> io::Result<()> {
        let fg = fg % 8;
        if self.state.fg != Some(fg) {
            write!(self.out, "\x1b[{}m", 30 + fg)?;
            self.state.fg = Some(fg);
        }
        Ok(())
    }

    fn set_bg(&mut self, bg: u8) -> io::Result<()> {
        let bg = bg % 8;
        if self.state.bg != Some(bg) {
            write!(self.out, "\x1b[{}m", 40 + bg)?;
            self.state.bg = Some(bg);
        }
        Ok(())
    }

    /// Switch attributes, emitting only what changed.
    ///
    /// A non-bold glyph whose color matches the background would be
    /// invisible, so it is drawn white on black and black otherwise.
    pub fn set_color(&mut self, bold: bool, fg: u8, bg: u8) -> io::Result<()> {
        let mut fg = fg;
        if !bold && fg % 8 == bg % 8 {
            fg = if bg % 8 == 0 { 7 } else { 0 };
        }
        self.set_bold(bold)?;
        self.set_fg(fg)?;
        self.set_bg(bg)
    }

    /// Reset to the status text colors (bold black on the default background).
    pub fn reset_colors(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x1b[0;1;30m")?;
        self.state = RenderState {
            bold: Some(true),
            fg: Some(0),
            bg: None,
        };
        Ok(())
    }

    /// Draw one palette glyph.
    ///
    /// A class outside the palette draws the blank glyph.
    pub fn put_glyph(&mut self, class: usize) -> io::Result<()> {
        let glyph = PALETTE.get(class).copied().unwrap_or(PALETTE[0]);
        self.set_color(glyph.bold, glyph.fg, BACKGROUND)?;
        write!(self.out, "{}", glyph.ch)
    }

    fn put_cell(&mut self, cell: Cell, scale: u32) -> io::Result<()> {
        // An empty frame has no population to scale against
        let class = match cell {
            Cell::Count(_) if scale == 0 => 0,
            _ => glyph_class(cell, scale),
        };
        self.put_glyph(class)
    }

    /// Draw a grid, one line per depth row (or per lateral column when
    /// `transpose` is set).
    pub fn render_grid(
        &mut self,
        grid: &Grid,
        scale: u32,
        origin: Origin,
        transpose: bool,
        clear_to_eol: bool,
    ) -> io::Result<()> {
        if let Some(row) = origin.row {
            write!(self.out, "\x1b[{}H", row as u32 + 1)?;
        }
        let prefix = origin.col.map(|col| format!("\x1b[{}G", col as u32 + 1));
        let suffix = if clear_to_eol { "\x1b[K" } else { "" };

        let (lines, per_line) = if transpose {
            (grid.cols(), grid.rows())
        } else {
            (grid.rows(), grid.cols())
        };

        for line in 0..lines {
            if let Some(ref prefix) = prefix {
                self.out.write_all(prefix.as_bytes())?;
            }
            for i in 0..per_line {
                let (v, u) = if transpose { (i, line) } else { (line, i) };
                let cell = grid.get(v, u).unwrap_or(Cell::EMPTY);
                self.put_cell(cell, scale)?;
            }
            writeln!(self.out, "{}", suffix)?;
        }

        Ok(())
    }

    /// Move the cursor to the top-left corner.
    pub fn home(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x1b[H")
    }

    /// Clear the whole screen and home the cursor.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x1b[H\x1b[2J")
    }

    /// Write one status line, clearing whatever the previous frame left on it.
    pub fn status_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "\x1b[K{}", text)
    }

    /// Restore default attributes, clear the rest of the line and flush.
    ///
    /// The terminal's attributes are the defaults afterwards, which the
    /// cache does not model, so it is invalidated.
    pub fn finish_frame(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x1b[m\x1b[K")?;
        self.state = RenderState::default();
        self.out.flush()
    }

    /// Restore default attributes on exit.
    pub fn restore(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x1b[m")?;
        self.state = RenderState::default();
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::GridSpec;

    fn output(painter: Painter<Vec<u8>>) -> String {
        String::from_utf8(painter.into_inner()).unwrap()
    }

    #[test]
    fn test_palette_matches_classes() {
        let chars: String = PALETTE.iter().map(|g| g.ch).collect();
        assert_eq!(chars, " .-+%8/\\");
    }

    #[test]
    fn test_first_color_is_emitted_in_full() {
        let mut painter = Painter::new(Vec::new());
        painter.set_color(true, 7, 0).unwrap();
        assert_eq!(output(painter), "\x1b[1m\x1b[37m\x1b[40m");
    }

    #[test]
    fn test_repeated_color_is_silent() {
        let mut painter = Painter::new(Vec::new());
        painter.set_color(false, 2, 0).unwrap();
        let len = painter.get_ref().len();
        painter.set_color(false, 2, 0).unwrap();
        assert_eq!(painter.get_ref().len(), len);
    }

    #[test]
    fn test_only_changed_attribute_is_emitted() {
        let mut painter = Painter::new(Vec::new());
        painter.set_color(true, 7, 0).unwrap();
        painter.get_mut().clear();
        painter.set_color(false, 7, 0).unwrap();
        assert_eq!(output(painter), "\x1b[22m");
    }

    #[test]
    fn test_invisible_color_is_swapped() {
        let mut painter = Painter::new(Vec::new());
        painter.set_color(false, 0, 0).unwrap();
        assert_eq!(painter.state().fg, Some(7));

        painter.set_color(false, 3, 3).unwrap();
        assert_eq!(painter.state().fg, Some(0));

        // Bold black on black shows as dark gray
        painter.set_color(true, 0, 0).unwrap();
        assert_eq!(painter.state().fg, Some(0));
    }

    #[test]
    fn test_unknown_class_draws_blank() {
        let mut painter = Painter::new(Vec::new());
        painter.put_glyph(PALETTE.len()).unwrap();
        painter.put_glyph(usize::MAX).unwrap();
        let text = output(painter);
        assert!(text.ends_with("  "));
        assert!(!text.contains('\\'));
    }

    #[test]
    fn test_reset_colors_updates_cache() {
        let mut painter = Painter::new(Vec::new());
        painter.set_color(false, 7, 0).unwrap();
        painter.reset_colors().unwrap();
        painter.get_mut().clear();

        // Terminal is now bold black on the default background
        painter.set_color(true, 0, 0).unwrap();
        assert_eq!(output(painter), "\x1b[40m");
    }

    #[test]
    fn test_finish_frame_invalidates_cache() {
        let mut painter = Painter::new(Vec::new());
        painter.set_color(true, 7, 0).unwrap();
        painter.finish_frame().unwrap();
        assert_eq!(painter.state(), RenderState::default());
    }

    #[test]
    fn test_render_grid_positions_and_clears() {
        let grid = Grid::new(GridSpec::new(2, 1, 0.0, 1.0, 1.0).unwrap());
        let mut painter = Painter::new(Vec::new());
        painter
            .render_grid(&grid, 1, Origin::at(Some(4), Some(2)), false, true)
            .unwrap();
        let text = output(painter);
        assert!(text.starts_with("\x1b[3H\x1b[5G"));
        assert!(text.ends_with("  \x1b[K\n"));
    }
}
