use minifb::{Key, Window};

// Host layout      Keypad
// 1 2 3 4          1 2 3 C
// Q W E R          4 5 6 D
// A S D F          7 8 9 E
// Z X C V          A 0 B F
const KEYMAP: [(Key, u8); 16] = [
    (Key::X, 0x0),
    (Key::Key1, 0x1),
    (Key::Key2, 0x2),
    (Key::Key3, 0x3),
    (Key::Q, 0x4),
    (Key::W, 0x5),
    (Key::E, 0x6),
    (Key::A, 0x7),
    (Key::S, 0x8),
    (Key::D, 0x9),
    (Key::Z, 0xA),
    (Key::C, 0xB),
    (Key::Key4, 0xC),
    (Key::R, 0xD),
    (Key::F, 0xE),
    (Key::V, 0xF),
];

/// Pressed state of the 16 logical keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    pub fn new() -> Self {
        Self { keys: [false; 16] }
    }

    pub fn reset(&mut self) {
        self.keys = [false; 16];
    }

    pub fn set(&mut self, n: u8, pressed: bool) {
        self.keys[(n & 0xF) as usize] = pressed;
    }

    // EX9E/EXA1 look up VX, which may exceed 0xF; only the low nibble names a key
    pub fn is_pressed(&self, n: u8) -> bool {
        self.keys[(n & 0xF) as usize]
    }

    /// Lowest-numbered key currently held.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|n| n as u8)
    }

    /// Replaces the state with whatever the window reports as held.
    pub fn refresh_from(&mut self, window: &Window) {
        self.reset();
        for (key, n) in KEYMAP {
            if window.is_key_down(key) {
                self.set(n, true);
            }
        }
    }
}

pub fn key_to_num(key: Key) -> Option<u8> {
    KEYMAP
        .iter()
        .find(|(mapped, _)| *mapped == key)
        .map(|(_, n)| *n)
}
