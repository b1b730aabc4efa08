use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use tracing::{debug, trace};

use crate::{
    config::Quirks,
    decode::OpCodes,
    display::FrameBuffer,
    error::ExecError,
    keyboard::Keypad,
    memory::{Memory, TypeAddr, FONT_GLYPH_SIZE},
    registers::Registers,
    timer::Timer,
};

/// What a call to [`Emulator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Stalled on FX0A with no key held; nothing was fetched.
    Waiting,
    Executed(OpCodes),
}

/// The whole machine: memory, registers, timers, keypad, frame buffer and
/// the random source CXNN draws from.
pub struct Emulator<R: RngCore = StdRng> {
    pub fb: FrameBuffer,
    pub regs: Registers,
    pub mem: Memory,
    pub delay_timer: Timer,
    pub sound_timer: Timer,
    pub keypad: Keypad,
    /// Register FX0A will write the key into, while waiting.
    wait: Option<u8>,
    quirks: Quirks,
    rng: R,
}

impl Emulator<StdRng> {
    pub fn new(quirks: Quirks) -> Self {
        Self::with_rng(quirks, StdRng::from_entropy())
    }
}

impl<R: RngCore> Emulator<R> {
    pub fn with_rng(quirks: Quirks, rng: R) -> Self {
        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            keypad: Keypad::new(),
            wait: None,
            quirks,
            rng,
        }
    }

    /// Back to power-on state. The random source carries on where it was.
    pub fn reset(&mut self) {
        self.fb = FrameBuffer::new();
        self.regs = Registers::new();
        self.mem = Memory::new();
        self.delay_timer = Timer::default();
        self.sound_timer = Timer::default();
        self.keypad.reset();
        self.wait = None;
    }

    pub fn is_waiting(&self) -> bool {
        self.wait.is_some()
    }

    /// Runs one instruction, or resolves a pending key wait and then runs one.
    pub fn step(&mut self) -> Result<Step, ExecError> {
        if let Some(vx) = self.wait {
            let Some(key) = self.keypad.first_pressed() else {
                return Ok(Step::Waiting);
            };
            debug!("key {key:X} resolves wait into V{vx:X}");
            self.regs.set_register(vx, key);
            self.wait = None;
        }

        let pc = self.mem.pc.0;
        let operation = self.fetch_decode();
        trace!("{pc:#05x}: {operation}");
        self.execute_ins(operation)?;
        Ok(Step::Executed(operation))
    }

    pub fn fetch_decode(&mut self) -> OpCodes {
        let ins = self.mem.next_instruction();
        OpCodes::decode_raw(ins)
    }

    /// Applies one decoded instruction. PC is expected to already point past it.
    pub fn execute_ins(&mut self, ins: OpCodes) -> Result<(), ExecError> {
        match ins {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
            }
            OpCodes::PopSubroutine => {
                self.mem.ret();
            }
            OpCodes::Jump(addr) => {
                self.mem.set_pc(addr);
            }
            OpCodes::PushSubroutine(addr) => {
                self.mem.call(addr)?; // store current instruction to return back
            }
            OpCodes::SkipEqualConstant(vx, nn) => {
                if self.regs.get(vx) == nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualConstant(vx, nn) => {
                if self.regs.get(vx) != nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            // ADD and the shifts write VF first and then recompute VX from the
            // registers, so an operand that is VF reads the new flag. The
            // subtractions fix their result before touching VF.
            OpCodes::Add(vx, vy) => {
                let carry = self.regs.get(vx).checked_add(self.regs.get(vy)).is_none();
                self.regs.set_flag(carry);
                self.regs.add_to_register(vx, self.regs.get(vy));
            }
            OpCodes::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_flag(x >= y); // no borrow
                self.regs.set_register(vx, x.wrapping_sub(y));
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_flag(y >= x); // no borrow
                self.regs.set_register(vx, y.wrapping_sub(x));
            }
            OpCodes::RightShift(vx, _) => {
                self.regs.set_flag(self.regs.get(vx) & 1 == 1);
                self.regs.set_register(vx, self.regs.get(vx) >> 1);
            }
            OpCodes::LeftShift(vx, _) => {
                self.regs.set_flag((self.regs.get(vx) >> 7) & 1 == 1);
                self.regs.set_register(vx, self.regs.get(vx) << 1);
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::JumpWithOffset(addr) => {
                self.mem.set_pc(addr + self.regs.get(0) as TypeAddr);
            }
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, nn & ransuu);
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                // From I to I + N, plot I at VX, VY
                let sprite = self.mem.read_span(self.mem.index.0, height as usize);
                let vf = self.fb.paint(x, y, &sprite, self.quirks.sprite_edge);
                self.regs.set_flag(vf);
            }
            OpCodes::SkipIfPressed(vx) => {
                if self.keypad.is_pressed(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipIfNotPressed(vx) => {
                if !self.keypad.is_pressed(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::CopyDelayToRegister(vx) => self.regs.set_register(vx, self.delay_timer.count),
            OpCodes::GetKey(vx) => {
                // resolved at the top of the next step
                debug!("waiting for key into V{vx:X}");
                self.wait = Some(vx);
            }
            OpCodes::CopyRegisterToDelay(vx) => self.delay_timer.set(self.regs.get(vx)),
            OpCodes::CopyRegisterToSound(vx) => self.sound_timer.set(self.regs.get(vx)),
            OpCodes::AddToIndex(vx) => {
                let overflow = self.mem.index.add(self.regs.get(vx));
                self.regs.set_flag(overflow);
            }
            OpCodes::PointChar(vx) => {
                let char = self.regs.get(vx) as TypeAddr;
                self.mem.set_index(char * FONT_GLYPH_SIZE);
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                let index = self.mem.index.0;
                for (i, digit) in digits.into_iter().enumerate() {
                    self.mem.set(index + i as TypeAddr, digit);
                }
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                let index = self.mem.index.0;
                for reg in 0..=vx {
                    self.mem.set(index + reg as TypeAddr, self.regs.get(reg));
                }
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                let index = self.mem.index.0;
                for reg in 0..=vx {
                    self.regs.set_register(reg, self.mem.get(index + reg as TypeAddr));
                }
            }
            OpCodes::Unknown(ins) => {
                debug!("ignoring unknown instruction {ins:#06x}");
            }
        }
        Ok(())
    }

    /// One 60 Hz tick: both timers count down if running.
    pub fn tick_timers(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SpriteEdge,
        display::{HEIGHT, WIDTH},
        memory::{DEFAULT_FONT, PROGRAM_START},
        registers::FLAG,
    };
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    fn emu_with(program: &[u8]) -> Emulator<StepRng> {
        let mut emu = Emulator::with_rng(Quirks::default(), StepRng::new(0, 0));
        emu.mem.load_rom(program).unwrap();
        emu
    }

    fn run(emu: &mut Emulator<StepRng>, steps: usize) {
        for _ in 0..steps {
            emu.step().unwrap();
        }
    }

    fn run_one(ins: u16, setup: impl FnOnce(&mut Emulator<StepRng>)) -> Emulator<StepRng> {
        let mut emu = emu_with(&ins.to_be_bytes());
        setup(&mut emu);
        emu.step().unwrap();
        emu
    }

    #[test]
    fn power_on_state() {
        let emu = Emulator::new(Quirks::default());
        assert_eq!(emu.mem.pc.0, 0x200);
        assert_eq!(emu.mem.index.0, 0);
        assert_eq!(emu.mem.stack.sp(), 0);
        assert!(emu.regs.as_slice().iter().all(|v| *v == 0));
        assert!(emu.fb.cells().iter().all(|c| *c == 0));
        assert_eq!(&emu.mem.as_slice()[..80], &DEFAULT_FONT[..]);
        assert!(!emu.is_waiting());
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut emu = emu_with(&[0x60, 0x0A, 0xF0, 0x0A, 0x00, 0xE0]);
        emu.sound_timer.set(9);
        run(&mut emu, 2);
        assert!(emu.is_waiting());

        emu.reset();
        assert_eq!(emu.mem.pc.0, PROGRAM_START);
        assert_eq!(emu.regs.get(0), 0);
        assert_eq!(emu.mem.get(0x200), 0);
        assert_eq!(emu.sound_timer.count, 0);
        assert!(!emu.is_waiting());
    }

    #[test]
    fn set_register_touches_only_vx() {
        let emu = run_one(0x6A42, |_| {});
        for reg in 0..16 {
            let expected = if reg == 0xA { 0x42 } else { 0 };
            assert_eq!(emu.regs.get(reg), expected);
        }
    }

    #[test]
    fn add_constant_wraps_without_flag() {
        let emu = run_one(0x7302, |emu| {
            emu.regs.set_register(3, 0xFF);
            emu.regs.set_register(FLAG, 0x77);
        });
        assert_eq!(emu.regs.get(3), 0x01);
        assert_eq!(emu.regs.flag(), 0x77);
    }

    #[test]
    fn two_instruction_program() {
        let mut emu = emu_with(&[0x60, 0x0A, 0x70, 0x05]);
        run(&mut emu, 2);
        assert_eq!(emu.regs.get(0), 0x0F);
        assert_eq!(emu.mem.pc.0, 0x204);
    }

    #[test]
    fn call_and_return() {
        let mut emu = emu_with(&[0x22, 0x04, 0x00, 0x00, 0x00, 0xEE]);
        emu.step().unwrap();
        assert_eq!(emu.mem.pc.0, 0x204);
        assert_eq!(emu.mem.stack.sp(), 1);
        emu.step().unwrap();
        assert_eq!(emu.mem.pc.0, 0x202);
        assert_eq!(emu.mem.stack.sp(), 0);
    }

    #[test]
    fn return_on_empty_stack_goes_to_zero() {
        let mut emu = emu_with(&[0x00, 0xEE]);
        emu.step().unwrap();
        assert_eq!(emu.mem.pc.0, 0);
        assert_eq!(emu.mem.stack.sp(), 0);
    }

    #[test]
    fn deep_recursion_overflows() {
        // 0x200: CALL 0x200
        let mut emu = emu_with(&[0x22, 0x00]);
        run(&mut emu, 15);
        assert_eq!(emu.mem.stack.sp(), 15);
        let err = emu.step().unwrap_err();
        assert!(matches!(err, ExecError::StackOverflow { target: 0x200, .. }));
    }

    #[test]
    fn jump_and_jump_with_offset() {
        let emu = run_one(0x1ABC, |_| {});
        assert_eq!(emu.mem.pc.0, 0xABC);

        let emu = run_one(0xB300, |emu| emu.regs.set_register(0, 0x10));
        assert_eq!(emu.mem.pc.0, 0x310);
    }

    #[test]
    fn skips() {
        let skipped = |ins, setup: fn(&mut Emulator<StepRng>)| run_one(ins, setup).mem.pc.0 == 0x204;

        assert!(skipped(0x3142, |e| e.regs.set_register(1, 0x42)));
        assert!(!skipped(0x3142, |_| {}));
        assert!(skipped(0x4142, |_| {}));
        assert!(!skipped(0x4142, |e| e.regs.set_register(1, 0x42)));
        assert!(skipped(0x5120, |_| {}));
        assert!(!skipped(0x5120, |e| e.regs.set_register(2, 1)));
        assert!(skipped(0x9120, |e| e.regs.set_register(2, 1)));
        assert!(!skipped(0x9120, |_| {}));
    }

    #[test]
    fn logic_ops() {
        let setup = |emu: &mut Emulator<StepRng>| {
            emu.regs.set_register(1, 0b1100);
            emu.regs.set_register(2, 0b1010);
        };
        assert_eq!(run_one(0x8120, setup).regs.get(1), 0b1010);
        assert_eq!(run_one(0x8121, setup).regs.get(1), 0b1110);
        assert_eq!(run_one(0x8122, setup).regs.get(1), 0b1000);
        assert_eq!(run_one(0x8123, setup).regs.get(1), 0b0110);
    }

    #[test]
    fn shifts_report_the_bit_shifted_out() {
        let emu = run_one(0x8106, |e| e.regs.set_register(1, 0b0000_0011));
        assert_eq!(emu.regs.get(1), 0b0000_0001);
        assert_eq!(emu.regs.flag(), 1);

        let emu = run_one(0x8106, |e| e.regs.set_register(1, 0b0000_0010));
        assert_eq!(emu.regs.flag(), 0);

        let emu = run_one(0x810E, |e| e.regs.set_register(1, 0b1000_0001));
        assert_eq!(emu.regs.get(1), 0b0000_0010);
        assert_eq!(emu.regs.flag(), 1);

        let emu = run_one(0x810E, |e| e.regs.set_register(1, 0b0100_0000));
        assert_eq!(emu.regs.get(1), 0b1000_0000);
        assert_eq!(emu.regs.flag(), 0);
    }

    #[test]
    fn subn_reverses_operands() {
        let emu = run_one(0x8127, |e| {
            e.regs.set_register(1, 3);
            e.regs.set_register(2, 10);
        });
        assert_eq!(emu.regs.get(1), 7);
        assert_eq!(emu.regs.flag(), 1);

        let emu = run_one(0x8127, |e| {
            e.regs.set_register(1, 10);
            e.regs.set_register(2, 3);
        });
        assert_eq!(emu.regs.get(1), 249);
        assert_eq!(emu.regs.flag(), 0);
    }

    #[test]
    fn add_with_vf_operand_reads_the_new_flag() {
        // VX is VF: carry is 0, so VF = 0 + V1
        let emu = run_one(0x8F14, |e| {
            e.regs.set_register(FLAG, 0x10);
            e.regs.set_register(1, 0x02);
        });
        assert_eq!(emu.regs.flag(), 0x02);

        // VY is VF: 0xF0 + 0x20 carries, then V1 = 0xF0 + 1
        let emu = run_one(0x81F4, |e| {
            e.regs.set_register(1, 0xF0);
            e.regs.set_register(FLAG, 0x20);
        });
        assert_eq!(emu.regs.get(1), 0xF1);
        assert_eq!(emu.regs.flag(), 1);
    }

    #[test]
    fn shift_of_vf_shifts_the_new_flag() {
        let emu = run_one(0x8F06, |e| e.regs.set_register(FLAG, 0x03));
        assert_eq!(emu.regs.flag(), 0);

        let emu = run_one(0x8F0E, |e| e.regs.set_register(FLAG, 0x80));
        assert_eq!(emu.regs.flag(), 0x02);

        // Y is ignored, even when it names VF
        let emu = run_one(0x81FE, |e| {
            e.regs.set_register(1, 0x41);
            e.regs.set_register(FLAG, 0xFF);
        });
        assert_eq!(emu.regs.get(1), 0x82);
        assert_eq!(emu.regs.flag(), 0);
    }

    #[test]
    fn subtraction_into_vf_keeps_the_difference() {
        let emu = run_one(0x8F05, |e| {
            e.regs.set_register(FLAG, 0x05);
            e.regs.set_register(0, 0x03);
        });
        assert_eq!(emu.regs.flag(), 0x02);

        let emu = run_one(0x8F07, |e| {
            e.regs.set_register(FLAG, 0x03);
            e.regs.set_register(0, 0x05);
        });
        assert_eq!(emu.regs.flag(), 0x02);
    }

    #[test]
    fn set_index_and_add_to_index() {
        let emu = run_one(0xA123, |_| {});
        assert_eq!(emu.mem.index.0, 0x123);

        let emu = run_one(0xF11E, |e| {
            e.mem.set_index(0xFFE);
            e.regs.set_register(1, 0x03);
        });
        assert_eq!(emu.mem.index.0, 0x001);
        assert_eq!(emu.regs.flag(), 1);

        let emu = run_one(0xF11E, |e| {
            e.mem.set_index(0x100);
            e.regs.set_register(1, 0x03);
            e.regs.set_register(FLAG, 1);
        });
        assert_eq!(emu.mem.index.0, 0x103);
        assert_eq!(emu.regs.flag(), 0);
    }

    #[test]
    fn random_is_masked() {
        let mut emu = Emulator::with_rng(Quirks::default(), StepRng::new(0xAB, 0));
        emu.mem.load_rom(&[0xC1, 0x0F, 0xC2, 0xFF]).unwrap();
        emu.step().unwrap();
        emu.step().unwrap();
        assert_eq!(emu.regs.get(1), 0x0B);
        assert_eq!(emu.regs.get(2), 0xAB);
    }

    #[test]
    fn font_glyph_address() {
        let emu = run_one(0xF129, |e| e.regs.set_register(1, 0xA));
        assert_eq!(emu.mem.index.0, 50);
        assert_eq!(emu.mem.read_span(emu.mem.index.0, 5), DEFAULT_FONT[50..55].to_vec());
    }

    #[test]
    fn decimal_expansion() {
        let emu = run_one(0xF133, |e| {
            e.regs.set_register(1, 254);
            e.mem.set_index(0x300);
        });
        assert_eq!(emu.mem.read_span(0x300, 3), vec![2, 5, 4]);
        assert_eq!(emu.mem.index.0, 0x300);

        let emu = run_one(0xF133, |e| {
            e.regs.set_register(1, 7);
            e.mem.set_index(0x300);
        });
        assert_eq!(emu.mem.read_span(0x300, 3), vec![0, 0, 7]);
    }

    #[test]
    fn timers_load_and_read() {
        let emu = run_one(0xF115, |e| e.regs.set_register(1, 30));
        assert_eq!(emu.delay_timer.count, 30);

        let emu = run_one(0xF118, |e| e.regs.set_register(1, 4));
        assert_eq!(emu.sound_timer.count, 4);
        assert!(emu.sound_active());

        let emu = run_one(0xF207, |e| e.delay_timer.set(12));
        assert_eq!(emu.regs.get(2), 12);
    }

    #[test]
    fn timers_tick_independently_of_steps() {
        let mut emu = emu_with(&[]);
        emu.delay_timer.set(2);
        emu.sound_timer.set(1);
        emu.tick_timers();
        assert_eq!(emu.delay_timer.count, 1);
        assert_eq!(emu.sound_timer.count, 0);
        assert!(!emu.sound_active());
        emu.tick_timers();
        emu.tick_timers();
        assert_eq!(emu.delay_timer.count, 0);
        assert_eq!(emu.mem.pc.0, PROGRAM_START);
    }

    #[test]
    fn key_skips() {
        let pressed = |e: &mut Emulator<StepRng>| {
            e.regs.set_register(1, 0x7);
            e.keypad.set(0x7, true);
        };
        assert_eq!(run_one(0xE19E, pressed).mem.pc.0, 0x204);
        assert_eq!(run_one(0xE1A1, pressed).mem.pc.0, 0x202);
        assert_eq!(run_one(0xE19E, |_| {}).mem.pc.0, 0x202);
        assert_eq!(run_one(0xE1A1, |_| {}).mem.pc.0, 0x204);
    }

    #[test]
    fn key_wait_stalls_then_resolves_and_fetches() {
        // LD V5, K ; LD V0, 0x0A
        let mut emu = emu_with(&[0xF5, 0x0A, 0x60, 0x0A]);
        emu.step().unwrap();
        assert!(emu.is_waiting());
        assert_eq!(emu.mem.pc.0, 0x202);

        for _ in 0..3 {
            assert_eq!(emu.step().unwrap(), Step::Waiting);
        }
        assert_eq!(emu.mem.pc.0, 0x202);
        assert!(emu.regs.as_slice().iter().all(|v| *v == 0));

        emu.keypad.set(0xC, true);
        emu.keypad.set(0xE, true);
        assert_eq!(
            emu.step().unwrap(),
            Step::Executed(OpCodes::SetRegister(0, 0x0A))
        );
        assert!(!emu.is_waiting());
        assert_eq!(emu.regs.get(5), 0xC);
        assert_eq!(emu.regs.get(0), 0x0A);
        assert_eq!(emu.mem.pc.0, 0x204);
    }

    #[test]
    fn clear_screen_sets_draw_flag() {
        let emu = run_one(0x00E0, |e| {
            e.fb.paint(0, 0, &[0xFF], SpriteEdge::Clip);
            e.fb.take_draw_flag();
        });
        assert!(emu.fb.cells().iter().all(|c| *c == 0));
        assert!(emu.fb.draw_flag());
    }

    #[test]
    fn draw_twice_restores_buffer() {
        // LD I, 0x000 (glyph 0) ; DRW V0, V1, 5 ; DRW V0, V1, 5
        let mut emu = emu_with(&[0xA0, 0x00, 0xD0, 0x15, 0xD0, 0x15]);
        emu.regs.set_register(0, 8);
        emu.regs.set_register(1, 4);
        emu.step().unwrap();

        emu.step().unwrap();
        assert_eq!(emu.regs.flag(), 0);
        assert!(emu.fb.take_draw_flag());
        // top row of "0" is 0xF0
        assert_eq!((8..16).map(|x| emu.fb.cell(x, 4)).collect::<Vec<_>>(), vec![1, 1, 1, 1, 0, 0, 0, 0]);
        assert_eq!(emu.mem.index.0, 0);

        emu.step().unwrap();
        assert_eq!(emu.regs.flag(), 1);
        assert!(emu.fb.draw_flag());
        assert!(emu.fb.cells().iter().all(|c| *c == 0));
    }

    #[test]
    fn draw_honours_wrap_quirk() {
        let quirks = Quirks {
            sprite_edge: SpriteEdge::Wrap,
        };
        let mut emu = Emulator::with_rng(quirks, StepRng::new(0, 0));
        // LD I, 0x206 ; DRW V0, V1, 1 ; sprite byte 0xFF
        emu.mem.load_rom(&[0xA2, 0x06, 0xD0, 0x11, 0x00, 0x00, 0xFF]).unwrap();
        emu.regs.set_register(0, (WIDTH - 4) as u8);
        emu.regs.set_register(1, (HEIGHT - 1) as u8);
        run(&mut emu, 2);
        assert_eq!(emu.fb.cell(WIDTH - 1, HEIGHT - 1), 1);
        assert_eq!(emu.fb.cell(3, HEIGHT - 1), 1);
        assert_eq!(emu.fb.cell(4, HEIGHT - 1), 0);
    }

    #[test]
    fn unknown_instruction_changes_nothing_but_pc() {
        let mut emu = emu_with(&[0x81, 0x2F]);
        emu.regs.set_register(1, 5);
        let before = emu.regs.clone();
        assert_eq!(emu.step().unwrap(), Step::Executed(OpCodes::Unknown(0x812F)));
        assert_eq!(emu.regs, before);
        assert_eq!(emu.mem.pc.0, 0x202);
    }

    proptest! {
        #[test]
        fn add_sets_carry(x in any::<u8>(), y in any::<u8>()) {
            let emu = run_one(0x8124, |e| {
                e.regs.set_register(1, x);
                e.regs.set_register(2, y);
            });
            prop_assert_eq!(emu.regs.flag(), (x as u16 + y as u16 > 255) as u8);
            prop_assert_eq!(emu.regs.get(1), x.wrapping_add(y));
        }

        #[test]
        fn sub_sets_no_borrow(x in any::<u8>(), y in any::<u8>()) {
            let emu = run_one(0x8125, |e| {
                e.regs.set_register(1, x);
                e.regs.set_register(2, y);
            });
            prop_assert_eq!(emu.regs.flag(), (x >= y) as u8);
            prop_assert_eq!(emu.regs.get(1), x.wrapping_sub(y));
        }

        #[test]
        fn dump_then_load_round_trips(
            x in 0u8..16,
            values in proptest::array::uniform16(any::<u8>()),
            index in 0x300u16..0xF00,
        ) {
            // LD [I], VX ; then clobber registers ; LD VX, [I]
            let [hi, lo] = [0xF0 | x, 0x55];
            let mut emu = emu_with(&[hi, lo, hi, 0x65]);
            emu.mem.set_index(index);
            for (reg, value) in values.iter().enumerate() {
                emu.regs.set_register(reg as u8, *value);
            }
            emu.step().unwrap();
            prop_assert_eq!(emu.mem.index.0, index);
            for reg in 0..=x {
                emu.regs.set_register(reg, 0);
            }
            emu.step().unwrap();
            prop_assert_eq!(emu.mem.index.0, index);
            for reg in 0..=x {
                prop_assert_eq!(emu.regs.get(reg), values[reg as usize]);
            }
        }
    }
}
