use std::io::Read;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{ADDRESS_MASK, KEY_COUNT, MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::error::{LoadError, StepError};
use crate::instruction::Instruction;
use crate::opcode::fetch;
use crate::operations::execute;
use crate::state::{FrameBuffer, Keypad, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the `program` it was loaded with, so it can be reset
///  - its own random number generator for the RND instruction
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - advancing the CPU one instruction at a time
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
///
/// Pacing is left to the caller: run some number of steps per frame and call
/// `tick_timers` once per frame at 60Hz.
pub struct Chip8 {
    state: State,
    program: Vec<u8>,
    rng: StdRng,
}

impl Chip8 {
    /// Builds a machine running `program`, seeding RND from the operating system
    pub fn new(program: &[u8]) -> Result<Self, LoadError> {
        Self::with_rng(program, StdRng::from_entropy())
    }

    /// Builds a machine running `program` whose RND sequence is fixed by `seed`
    pub fn with_seed(program: &[u8], seed: u64) -> Result<Self, LoadError> {
        Self::with_rng(program, StdRng::seed_from_u64(seed))
    }

    /// Reads a whole program image from `reader`.
    ///
    /// # Arguments
    /// * `reader` a source that contains a ROM
    /// * `seed` fixes the RND sequence when given
    pub fn from_reader(reader: &mut dyn Read, seed: Option<u64>) -> Result<Self, LoadError> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        match seed {
            Some(seed) => Self::with_seed(&program, seed),
            None => Self::new(&program),
        }
    }

    fn with_rng(program: &[u8], rng: StdRng) -> Result<Self, LoadError> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::TooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let mut chip8 = Chip8 {
            state: State::new(),
            program: program.to_vec(),
            rng,
        };
        chip8.reset();
        Ok(chip8)
    }

    /// Puts the machine back into its power-on state with the same program loaded
    pub fn reset(&mut self) {
        self.state = State::new();
        let start = PROGRAM_START as usize;
        self.state.memory[start..start + self.program.len()].copy_from_slice(&self.program);
        debug!("loaded {} byte program at {:#05X}", self.program.len(), start);
    }

    /// Executes exactly one instruction
    /// - fetches the word at pc and moves pc past it
    /// - decodes and executes it
    ///
    /// On error the pc has still moved past the offending instruction, so the caller may
    /// keep stepping.
    pub fn step(&mut self) -> Result<(), StepError> {
        let pc = self.state.pc;
        let op = fetch(&self.state.memory, pc);
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            pc
        );
        self.state.pc = pc.wrapping_add(2) & ADDRESS_MASK;

        let instruction =
            Instruction::decode(op).map_err(|source| StepError::Decode { source, pc })?;
        execute(instruction, &mut self.state, &mut self.rng)
    }

    /// Executes up to `cycles` instructions, stopping at the first failure
    pub fn run_cycles(&mut self, cycles: u32) -> Result<(), StepError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Counts both timers down by one; call at 60Hz
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the hex value of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.state.keypad[key as usize % KEY_COUNT] = true;
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the hex value of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.state.keypad[key as usize % KEY_COUNT] = false;
    }

    pub fn set_keypad(&mut self, keypad: Keypad) {
        self.state.keypad = keypad;
    }

    pub fn clear_keys(&mut self) {
        self.state.keypad = [false; KEY_COUNT];
    }

    /// Returns the FrameBuffer if it changed since the last call
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// A tone should play while the sound timer is running
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn index(&self) -> u16 {
        self.state.i
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.state.v
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    fn chip8(program: &[u8]) -> Chip8 {
        Chip8::with_seed(program, 0).unwrap()
    }

    #[test]
    fn test_loads_program_at_0x200() {
        let chip8 = chip8(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(chip8.state.memory[0x200..0x203], [0xAA, 0xBB, 0xCC]);
        assert_eq!(chip8.pc(), 0x200);
        assert_eq!(chip8.state.memory[0x050], 0xF0);
    }

    #[test]
    fn test_accepts_largest_program() {
        let program = vec![0x12; MAX_PROGRAM_SIZE];
        let chip8 = chip8(&program);
        assert_eq!(chip8.state.memory[0xFFF], 0x12);
    }

    #[test]
    fn test_rejects_oversized_program() {
        let program = vec![0; 4096 - 512 + 1];
        match Chip8::new(&program) {
            Err(LoadError::TooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            _ => panic!("expected LoadError::TooLarge"),
        }
    }

    #[test]
    fn test_loads_from_reader() {
        let mut reader: &[u8] = &[0x60, 0x05];
        let mut chip8 = Chip8::from_reader(&mut reader, Some(1)).unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0], 5);
    }

    #[test]
    fn test_cls_program() {
        let mut chip8 = chip8(&[0x00, 0xE0]);
        chip8.state.frame_buffer[3][3] = 1;
        chip8.step().unwrap();
        assert!(chip8.frame_buffer().iter().flatten().all(|&p| p == 0));
        assert_eq!(chip8.pc(), 0x202);
    }

    #[test]
    fn test_add_program() {
        let mut chip8 = chip8(&[0x60, 0x05, 0x61, 0x03, 0x80, 0x14]);
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.registers()[0x0], 8);
        assert_eq!(chip8.registers()[0xF], 0);
        assert_eq!(chip8.pc(), 0x206);
    }

    #[test]
    fn test_bcd_program() {
        let mut chip8 = chip8(&[0xF3, 0x33]);
        chip8.state.i = 0x300;
        chip8.state.v[0x3] = 157;
        chip8.step().unwrap();
        assert_eq!(chip8.state.memory[0x300..0x303], [1, 5, 7]);
    }

    #[test]
    fn test_call_and_return_program() {
        // 0x200: CALL 0x206; 0x202: LD V1,1; 0x204: JP 0x204; 0x206: LD V0,9; 0x208: RET
        let mut chip8 = chip8(&[
            0x22, 0x06, 0x61, 0x01, 0x12, 0x04, 0x60, 0x09, 0x00, 0xEE,
        ]);
        chip8.run_cycles(4).unwrap();
        assert_eq!(chip8.registers()[0x0], 9);
        assert_eq!(chip8.registers()[0x1], 1);
        assert_eq!(chip8.pc(), 0x204);
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), 0x204);
    }

    #[test]
    fn test_wait_key_polls_until_pressed() {
        let mut chip8 = chip8(&[0xF5, 0x0A]);
        for _ in 0..5 {
            chip8.step().unwrap();
            assert_eq!(chip8.pc(), 0x200);
        }
        chip8.key_press(0x9);
        chip8.key_press(0x4);
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0x5], 0x4);
        assert_eq!(chip8.pc(), 0x202);
    }

    #[test]
    fn test_decode_error_is_reported_and_skipped() {
        let mut chip8 = chip8(&[0x81, 0x2F, 0x60, 0x01]);
        let before = chip8.state.v;
        assert_eq!(
            chip8.step(),
            Err(StepError::Decode {
                source: DecodeError { opcode: 0x812F },
                pc: 0x200
            })
        );
        assert_eq!(chip8.state.v, before);
        assert_eq!(chip8.pc(), 0x202);
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0], 1);
    }

    #[test]
    fn test_run_cycles_stops_at_first_error() {
        let mut chip8 = chip8(&[0x60, 0x01, 0x00, 0xEE, 0x60, 0x02]);
        let result = chip8.run_cycles(10);
        assert_eq!(result, Err(StepError::StackUnderflow { pc: 0x202 }));
        assert_eq!(chip8.pc(), 0x204);
        assert_eq!(chip8.registers()[0], 1);
    }

    #[test]
    fn test_tick_timers_saturates() {
        let mut chip8 = chip8(&[0x60, 0x02, 0xF0, 0x15, 0xF0, 0x18]);
        chip8.run_cycles(3).unwrap();
        assert_eq!(chip8.delay_timer(), 2);
        assert!(chip8.sound_active());
        chip8.tick_timers();
        chip8.tick_timers();
        assert_eq!(chip8.delay_timer(), 0);
        assert_eq!(chip8.sound_timer(), 0);
        assert!(!chip8.sound_active());
        chip8.tick_timers();
        assert_eq!(chip8.delay_timer(), 0);
    }

    #[test]
    fn test_timers_are_not_touched_by_step() {
        let mut chip8 = chip8(&[0x60, 0x07, 0xF0, 0x15, 0x12, 0x04]);
        chip8.run_cycles(20).unwrap();
        assert_eq!(chip8.delay_timer(), 7);
    }

    #[test]
    fn test_take_frame_only_after_draw() {
        let mut chip8 = chip8(&[0xA0, 0x50, 0xD0, 0x05]);
        chip8.step().unwrap();
        assert!(chip8.take_frame().is_none());
        chip8.step().unwrap();
        let frame = chip8.take_frame().unwrap();
        assert_eq!(frame[0][0..4], [1, 1, 1, 1]);
        assert!(chip8.take_frame().is_none());
    }

    #[test]
    fn test_key_release_and_clear() {
        let mut chip8 = chip8(&[]);
        chip8.key_press(0x1);
        chip8.key_press(0x12);
        assert!(chip8.state.keypad[0x1]);
        assert!(chip8.state.keypad[0x2]);
        chip8.key_release(0x1);
        assert!(!chip8.state.keypad[0x1]);
        chip8.clear_keys();
        assert!(chip8.state.keypad.iter().all(|k| !k));
        let mut keypad = [false; 16];
        keypad[0xF] = true;
        chip8.set_keypad(keypad);
        assert!(chip8.state.keypad[0xF]);
    }

    #[test]
    fn test_reset_restores_program_and_registers() {
        let mut chip8 = chip8(&[0x60, 0x05, 0x70, 0x01]);
        chip8.run_cycles(2).unwrap();
        chip8.key_press(0x3);
        chip8.state.memory[0x200] = 0x00;
        chip8.reset();
        assert_eq!(chip8.pc(), 0x200);
        assert_eq!(chip8.registers()[0], 0);
        assert_eq!(chip8.state.memory[0x200..0x204], [0x60, 0x05, 0x70, 0x01]);
        assert!(!chip8.state.keypad[0x3]);
    }

    #[test]
    fn test_seeded_machines_agree_on_rnd() {
        let program = [0xC0, 0xFF, 0xC1, 0xFF, 0xC2, 0xFF, 0xC3, 0xFF];
        let mut a = Chip8::with_seed(&program, 42).unwrap();
        let mut b = Chip8::with_seed(&program, 42).unwrap();
        a.run_cycles(4).unwrap();
        b.run_cycles(4).unwrap();
        assert_eq!(a.registers(), b.registers());
    }
}
