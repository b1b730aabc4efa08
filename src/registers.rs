use crate::memory::TypeAddr;

/// Highest valid address; I and fetched addresses are 12 bits wide.
pub const ADDR_MASK: TypeAddr = 0x0FFF;

/// Index of the flag register, VF.
pub const FLAG: u8 = 0xF;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    registers: [u8; 16],
}

impl Registers {
    pub fn new() -> Self {
        Self { registers: [0; 16] }
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[(reg_num & 0xF) as usize] = value;
    }

    // 7XNN never reports a carry
    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let total = self.get(reg_num).wrapping_add(value);
        self.set_register(reg_num, total);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[(reg_num & 0xF) as usize]
    }

    pub fn flag(&self) -> u8 {
        self.get(FLAG)
    }

    pub fn set_flag(&mut self, value: bool) {
        self.set_register(FLAG, value as u8);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.registers
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr & ADDR_MASK;
    }

    /// Adds `value` to I, keeping the low 12 bits.
    /// Returns true when the sum ran past 0xFFF.
    pub fn add(&mut self, value: u8) -> bool {
        let sum = self.0 + value as TypeAddr;
        self.0 = sum & ADDR_MASK;
        sum > ADDR_MASK
    }
}
