use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

/// Display is used by the host loop to show the guest framebuffer. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw data based on internal resolution of display
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;

    /// how big the display data should be
    fn get_display_size_bytes(&mut self) -> usize;
}

/// two pixel rows per terminal cell: fg paints the top half, bg the bottom
const HALF_BLOCK: &str = "▀";

// width, height, bytes per pixel
struct Resolution(usize, usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn byte_count(&self) -> usize {
        self.pixel_count() * self.2
    }

    /// packed R,G,B at (x, y)
    fn pixel(&self, data: &[u8], x: usize, y: usize) -> Color {
        let i = (y * self.0 + x) * self.2;
        Color::Rgb(data[i], data[i + 1], data[i + 2])
    }

    /// terminal lines needed; an odd last row gets a black lower half
    fn cell_rows(&self) -> usize {
        (self.1 + 1) / 2
    }

    fn lines_from_data(&self, data: &[u8]) -> Vec<Spans<'static>> {
        (0..self.cell_rows())
            .map(|row| {
                let top = row * 2;
                let bottom = top + 1;
                Spans::from(
                    (0..self.0)
                        .map(|x| {
                            let fg = self.pixel(data, x, top);
                            let bg = if bottom < self.1 {
                                self.pixel(data, x, bottom)
                            } else {
                                Color::Black
                            };
                            Span::styled(HALF_BLOCK, Style::default().fg(fg).bg(bg))
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }
}

/// 24-bit colour display in a terminal, rendered using TUI and crossterm
pub struct ColourTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl ColourTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<ColourTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(ColourTermDisplay {
            terminal,
            resolution: Resolution(x, y, 3),
        })
    }
}

impl Display for ColourTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            data.len(),
            self.resolution.byte_count(),
            "ColourTermDisplay must have correct-sized data to draw"
        );

        let lines = self.resolution.lines_from_data(data);
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.cell_rows() as u16,
        );
        self.terminal.draw(|f| {
            let screen = Paragraph::new(lines).block(
                Block::default()
                    .title("INS8070")
                    .borders(Borders::ALL)
                    .style(Style::default().bg(Color::Black)),
            );
            f.render_widget(screen, size);
        })?;
        Ok(())
    }

    /// how big the display data should be
    fn get_display_size_bytes(&mut self) -> usize {
        self.resolution.byte_count()
    }
}

/// useful for testing non-display routines, and for headless runs
pub struct DummyDisplay {
    frames: usize,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay { frames: 0 }
    }

    /// frames drawn so far
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _data: &[u8]) -> Result<(), io::Error> {
        self.frames += 1;
        Ok(())
    }

    fn get_display_size_bytes(&mut self) -> usize {
        crate::memory::FRAMEBUFFER_BYTES
    }
}
