use std::{fs::File, io::Read, path::Path};

use tracing::debug;

use crate::{
    error::{ExecError, LoadError},
    registers::{IndexRegister, ProgramCounter, ADDR_MASK},
};

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; 5 * 16];

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_SIZE: usize = 16;

/// Glyphs for the hex digits, 5 bytes each, resident at 0x000.
pub const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Bytes per font glyph; FX29 scales the digit by this.
pub const FONT_GLYPH_SIZE: TypeAddr = 5;

pub struct Memory {
    // 4k bytes
    // font data stored from 000 -> 04F, programs from 200
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        bytes[..DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);
        Self {
            bytes,
            pc: ProgramCounter(PROGRAM_START),
            index: IndexRegister(0x0),
            stack: Stack::new(),
        }
    }

    pub fn set(&mut self, addr: TypeAddr, val: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = val;
    }

    pub fn get(&self, addr: TypeAddr) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    /// `len` bytes starting at `addr`, wrapping at the top of memory.
    pub fn read_span(&self, addr: TypeAddr, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| self.get(addr.wrapping_add(offset as TypeAddr)))
            .collect()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn increment_pc(&mut self) {
        self.pc.increment();
    }

    /// Big-endian word at PC; PC moves past it.
    pub fn next_instruction(&mut self) -> u16 {
        let (l, r) = (self.get(self.pc.0), self.get(self.pc.0.wrapping_add(1)));
        self.increment_pc();
        ((l as u16) << 8) | r as u16
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    /// Pushes the current PC and jumps to `addr`.
    pub fn call(&mut self, addr: TypeAddr) -> Result<(), ExecError> {
        let pc = self.pc.0;
        self.stack
            .push(pc)
            .map_err(|_| ExecError::StackOverflow { pc, target: addr })?;
        self.set_pc(addr);
        Ok(())
    }

    pub fn ret(&mut self) {
        let addr = self.stack.pop();
        self.set_pc(addr);
    }

    // loads program instructions starting at address 0x200
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(LoadError::TooLarge { size: bytes.len() });
        }
        let start_index = PROGRAM_START as usize;
        self.bytes[start_index..start_index + bytes.len()].copy_from_slice(bytes);
        debug!(size = bytes.len(), "loaded rom at {PROGRAM_START:#05x}");
        Ok(())
    }

    pub fn load_rom_by_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let expected = file.metadata().map_err(io_err)?.len() as usize;
        let program = read_image(file, expected, path)?;
        self.load_rom(program.as_slice())
    }
}

/// Reads a program image whose size was reported as `expected`. Never pulls
/// more than one byte past what fits at 0x200, whatever the reported size.
fn read_image(reader: impl Read, expected: usize, path: &Path) -> Result<Vec<u8>, LoadError> {
    if expected > MAX_ROM_SIZE {
        return Err(LoadError::TooLarge { size: expected });
    }

    let mut program = Vec::with_capacity(expected);
    let actual = reader
        .take(MAX_ROM_SIZE as u64 + 1)
        .read_to_end(&mut program)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if actual > MAX_ROM_SIZE {
        return Err(LoadError::TooLarge { size: actual });
    }
    if actual < expected {
        return Err(LoadError::ShortRead {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(program)
}

/// Return-address stack. Slot 0 is never written by a call: SP is bumped
/// before the store, and popping at SP 0 stays at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    addresses: [TypeAddr; STACK_SIZE],
    sp: usize,
}

/// Returned by [`Stack::push`] when SP is already at the last slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackFull;

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_SIZE],
            sp: 0,
        }
    }

    pub fn push(&mut self, addr: TypeAddr) -> Result<(), StackFull> {
        if self.sp + 1 >= STACK_SIZE {
            return Err(StackFull);
        }
        self.sp += 1;
        self.addresses[self.sp] = addr;
        Ok(())
    }

    pub fn pop(&mut self) -> TypeAddr {
        let addr = std::mem::take(&mut self.addresses[self.sp]);
        self.sp = self.sp.saturating_sub(1);
        addr
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn slots(&self) -> &[TypeAddr] {
        &self.addresses
    }
}
