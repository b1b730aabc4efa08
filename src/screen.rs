use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::{
    config::MAX_SCALE,
    display::{FrameBuffer, HEIGHT, WIDTH},
};

const OFF: u32 = 0x000000;

fn from_u16_rgb(r: u16, g: u16, b: u16) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

/// Window the frame buffer is presented in, each cell drawn as a
/// `scale` by `scale` block.
pub struct Screen {
    pixel_buffer: Vec<u32>,
    scale: usize,
    pending: bool,
    pub window: Window,
}

impl Screen {
    pub fn new(title: &str, scale: usize) -> Result<Self, minifb::Error> {
        let scale = scale.clamp(1, MAX_SCALE);
        let window = Window::new(
            &format!("{title} - ESC to exit"),
            WIDTH * scale,
            HEIGHT * scale,
            WindowOptions::default(),
        )?;
        Ok(Self {
            pixel_buffer: vec![OFF; WIDTH * HEIGHT * scale * scale],
            scale,
            pending: true,
            window,
        })
    }

    pub fn is_running(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Rasterises the frame buffer; it reaches the window on the next `sync`.
    pub fn render(&mut self, fb: &FrameBuffer) {
        rasterize(fb, self.scale, &mut self.pixel_buffer);
        self.pending = true;
    }

    /// Presents pending pixels, or just pumps window events if nothing changed.
    pub fn sync(&mut self) -> Result<(), minifb::Error> {
        if self.pending {
            self.window.update_with_buffer(
                &self.pixel_buffer,
                WIDTH * self.scale,
                HEIGHT * self.scale,
            )?;
            self.pending = false;
        } else {
            self.window.update();
        }
        Ok(())
    }
}

fn rasterize(fb: &FrameBuffer, scale: usize, pixels: &mut [u32]) {
    let on = from_u16_rgb(0, 127, 255);
    let row_width = WIDTH * scale;
    for (index, cell) in fb.cells().iter().enumerate() {
        let colour = if *cell == 1 { on } else { OFF };
        let (x, y) = ((index % WIDTH) * scale, (index / WIDTH) * scale);
        for py in y..y + scale {
            pixels[py * row_width + x..py * row_width + x + scale].fill(colour);
        }
    }
}
