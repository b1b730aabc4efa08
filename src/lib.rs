//! A CHIP-8 virtual machine.
//!
//! [`emulator::Emulator`] owns the machine state and advances it one
//! instruction per [`step`](emulator::Emulator::step). Everything the host
//! needs to drive it lives alongside: the window ([`screen`]), key mapping
//! ([`keyboard`]), beeper ([`sound`]) and the 60 Hz timer clock ([`timer`]).
//!
//! ```text
//! 16 8-bit data registers named V0 to VF, VF doubles as the flag register
//! I -> address register (12 bits)
//! 16-level call stack
//! Delay timer & Sound timer: count down at 60 times / s until 0
//! Display res: 64 width, 32 height
//!
//! 35 opcodes, each 2 bytes (big-endian)
//!      NNN: address
//!      NN: 8-bit constant
//!      N: 4-bit constant
//!      X and Y: 4-bit register identifier
//! ```

pub mod config;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod screen;
pub mod sound;
pub mod timer;

pub use config::{Config, Quirks, Speed, SpriteEdge};
pub use emulator::{Emulator, Step};
pub use error::{ExecError, LoadError, SoundError};
