use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

// 3x5 bitmap font for the score digits, row-major.
const DIGIT_FONT: [[[u8; 3]; 5]; 10] = [
    [[1, 1, 1], [1, 0, 1], [1, 0, 1], [1, 0, 1], [1, 1, 1]],
    [[0, 1, 0], [1, 1, 0], [0, 1, 0], [0, 1, 0], [1, 1, 1]],
    [[1, 1, 1], [0, 0, 1], [1, 1, 1], [1, 0, 0], [1, 1, 1]],
    [[1, 1, 1], [0, 0, 1], [1, 1, 1], [0, 0, 1], [1, 1, 1]],
    [[1, 0, 1], [1, 0, 1], [1, 1, 1], [0, 0, 1], [0, 0, 1]],
    [[1, 1, 1], [1, 0, 0], [1, 1, 1], [0, 0, 1], [1, 1, 1]],
    [[1, 1, 1], [1, 0, 0], [1, 1, 1], [1, 0, 1], [1, 1, 1]],
    [[1, 1, 1], [0, 0, 1], [0, 1, 0], [1, 0, 0], [1, 0, 0]],
    [[1, 1, 1], [1, 0, 1], [1, 1, 1], [1, 0, 1], [1, 1, 1]],
    [[1, 1, 1], [1, 0, 1], [1, 1, 1], [0, 0, 1], [1, 1, 1]],
];

const LUMINANCE_RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

// --- FrameBuffer: packed ARGB pixels, row-major ---
pub struct FrameBuffer {
    pub pixels: Vec<u32>,
    pub width: u32,
    pub height: u32,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        FrameBuffer {
            pixels: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    #[cfg(test)]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Filled circle. A non-positive radius draws nothing.
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        if radius <= 0 {
            return;
        }
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    pub fn draw_square(&mut self, cx: i32, cy: i32, half_size: i32, color: u32) {
        for dy in -half_size..=half_size {
            for dx in -half_size..=half_size {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    pub fn draw_digit(&mut self, x: i32, y: i32, digit: u8, scale: i32, color: u32) {
        let Some(glyph) = DIGIT_FONT.get(digit as usize) else {
            return;
        };
        for (row, bits) in glyph.iter().enumerate() {
            for (col, &bit) in bits.iter().enumerate() {
                if bit == 1 {
                    self.draw_square(x + col as i32 * scale, y + row as i32 * scale, scale / 2, color);
                }
            }
        }
    }

    /// Only digits are drawn; every character still advances the pen.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: u32) {
        let mut pen_x = x;
        for c in text.chars() {
            if let Some(digit) = c.to_digit(10) {
                self.draw_digit(pen_x, y, digit as u8, scale, color);
            }
            pen_x += 4 * scale;
        }
    }

    /// Nearest-neighbour sample of the buffer onto a `cols` x `rows` grid.
    fn sample(&self, col: u32, row: u32, cols: u32, rows: u32) -> u32 {
        let x = (col as u64 * self.width as u64 / cols.max(1) as u64) as usize;
        let y = (row as u64 * self.height as u64 / rows.max(1) as u64) as usize;
        let x = x.min(self.width as usize - 1);
        let y = y.min(self.height as usize - 1);
        self.pixels[y * self.width as usize + x]
    }
}

fn argb_to_color(argb: u32) -> Color {
    Color::Rgb {
        r: (argb >> 16) as u8,
        g: (argb >> 8) as u8,
        b: argb as u8,
    }
}

fn luminance_char(argb: u32) -> char {
    let r = ((argb >> 16) & 0xFF) as f64;
    let g = ((argb >> 8) & 0xFF) as f64;
    let b = (argb & 0xFF) as f64;
    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
    let index = (luma / 256.0 * LUMINANCE_RAMP.len() as f64) as usize;
    LUMINANCE_RAMP[index.min(LUMINANCE_RAMP.len() - 1)]
}

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.buffer[y as usize][x as usize] = c;
        }
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    /// Presents `frame` on a `cols` x `rows` character grid.
    pub fn present(&mut self, frame: &FrameBuffer, cols: u16, rows: u16) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(out) => present_half_blocks(out, frame, cols, rows),
            OutputTarget::ScreenBuffer(sb) => {
                let (cols, rows) = (sb.width, sb.height);
                for row in 0..rows {
                    for col in 0..cols {
                        let argb = frame.sample(col as u32, row as u32, cols as u32, rows as u32);
                        sb.set_char(col, row, luminance_char(argb));
                    }
                }
                sb.print_to_log();
                Ok(())
            }
        }
    }
}

// Each cell shows two pixel rows: upper half as foreground, lower half as background.
fn present_half_blocks(out: &mut io::Stdout, frame: &FrameBuffer, cols: u16, rows: u16) -> io::Result<()> {
    let sample_rows = rows as u32 * 2;
    let mut last_colors: Option<(u32, u32)> = None;
    for row in 0..rows {
        queue!(out, MoveTo(0, row))?;
        for col in 0..cols {
            let top = frame.sample(col as u32, row as u32 * 2, cols as u32, sample_rows);
            let bottom = frame.sample(col as u32, row as u32 * 2 + 1, cols as u32, sample_rows);
            if last_colors != Some((top, bottom)) {
                queue!(out, SetForegroundColor(argb_to_color(top)), SetBackgroundColor(argb_to_color(bottom)))?;
                last_colors = Some((top, bottom));
            }
            queue!(out, Print('\u{2580}'))?;
        }
    }
    queue!(out, ResetColor)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pixel_out_of_bounds_is_ignored() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.set_pixel(-1, 0, 7);
        fb.set_pixel(0, 4, 7);
        fb.set_pixel(4, 0, 7);
        assert!(fb.pixels.iter().all(|&p| p == 0));
        fb.set_pixel(3, 3, 7);
        assert_eq!(fb.get_pixel(3, 3), Some(7));
        assert_eq!(fb.get_pixel(4, 3), None);
    }

    #[test]
    fn test_circle_clips_at_edges() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_circle(0, 0, 3, 1);
        assert_eq!(fb.get_pixel(0, 0), Some(1));
        assert_eq!(fb.get_pixel(3, 0), Some(1));
        assert_eq!(fb.get_pixel(3, 3), Some(0));
    }

    #[test]
    fn test_non_positive_radius_draws_nothing() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_circle(5, 5, 0, 1);
        fb.draw_circle(5, 5, -2, 1);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_square_extent() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_square(5, 5, 1, 1);
        assert_eq!(fb.pixels.iter().filter(|&&p| p == 1).count(), 9);
    }

    #[test]
    fn test_draw_text_skips_non_digits() {
        let mut fb = FrameBuffer::new(40, 10);
        fb.draw_text(0, 0, "1", 2, 1);
        // '1' has its top-left cell unset and top-middle set
        assert_eq!(fb.get_pixel(0, 0), Some(0));
        assert_eq!(fb.get_pixel(2, 0), Some(1));

        let mut blank = FrameBuffer::new(40, 10);
        blank.draw_text(0, 0, "ab", 2, 1);
        assert!(blank.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_screen_buffer_presentation() {
        let mut fb = FrameBuffer::new(8, 8);
        fb.fill(0xFFFFFFFF);
        fb.draw_square(1, 1, 1, 0xFF000000);
        let mut target = OutputTarget::ScreenBuffer(ScreenBuffer::new(4, 4));
        target.present(&fb, 4, 4).unwrap();
        let OutputTarget::ScreenBuffer(sb) = target else {
            panic!("expected screen buffer");
        };
        assert_eq!(sb.buffer[0][0], ' ');
        assert_eq!(sb.buffer[3][3], '@');
    }
}
