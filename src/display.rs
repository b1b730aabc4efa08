use crate::config::SpriteEdge;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// The 64x32 cell grid the VM draws into. Each cell is 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bit_buffer: Vec<u8>,
    draw_flag: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: vec![0; WIDTH * HEIGHT],
            draw_flag: false,
        }
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer.fill(0);
        self.draw_flag = true;
    }

    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.bit_buffer[y * WIDTH + x]
    }

    /// Row-major cells, `WIDTH * HEIGHT` long.
    pub fn cells(&self) -> &[u8] {
        &self.bit_buffer
    }

    pub fn draw_flag(&self) -> bool {
        self.draw_flag
    }

    /// Reads and clears the dirty bit; the host calls this once per redraw.
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::take(&mut self.draw_flag)
    }

    /// XORs an 8-pixel-wide sprite onto the grid with its top-left corner at
    /// (`x`, `y`). Returns true if any lit cell was switched off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8], edge: SpriteEdge) -> bool {
        self.draw_flag = true;
        let (x, y) = (x as usize % WIDTH, y as usize % HEIGHT);
        let mut vf = false;

        for (i, row) in sprite.iter().enumerate() {
            for j in 0..8 {
                let bit = (row >> (7 - j)) & 1;
                if bit == 0 {
                    continue;
                }
                let (nx, ny) = match edge {
                    SpriteEdge::Clip if x + j >= WIDTH || y + i >= HEIGHT => continue,
                    SpriteEdge::Clip => (x + j, y + i),
                    SpriteEdge::Wrap => ((x + j) % WIDTH, (y + i) % HEIGHT),
                };

                let index = ny * WIDTH + nx;
                if self.bit_buffer[index] == 1 {
                    vf = true;
                }
                self.bit_buffer[index] ^= 1;
            }
        }
        vf
    }
}
