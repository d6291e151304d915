use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_SPRITES, FONT_START, KEY_COUNT, MEMORY_SIZE,
    PROGRAM_START, REGISTER_COUNT, STACK_DEPTH,
};

/// The FrameBuffer is indexed as [y][x]; every cell is 0 or 1
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Pressed status of keys 0..F
pub type Keypad = [bool; KEY_COUNT];

/// The complete machine state
///
/// ## CPU
/// Registers
/// - (v) 16 8-bit registers V0..VF
///     - VF doubles as the carry/borrow/collision flag
/// - (i) the index register; a 12-bit memory pointer
///
/// Counter
/// - (pc) address of the next instruction to fetch
///
/// Pointer
/// - (sp) number of active stack frames
///
/// Timers
/// - delay and sound; decremented at 60Hz by whoever drives the machine
///
/// ## Memory
/// - 4096 bytes
///     - 0x050..0x0A0 holds the hex font
///     - programs are loaded at 0x200
/// - a 16 entry return address stack
/// - a 64x32 frame buffer
///
/// ## Input
/// - 16 key states, written only from outside the core
#[derive(Clone)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub keypad: Keypad,
    /// Set whenever the frame buffer is touched; cleared by whoever renders it
    pub draw_flag: bool,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = FONT_START as usize;
        memory[font..font + FONT_SPRITES.len()].copy_from_slice(&FONT_SPRITES);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            keypad: [false; KEY_COUNT],
            draw_flag: false,
        }
    }

    /// Reads memory at `addr`, wrapping it into the 12-bit address space
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[addr as usize % MEMORY_SIZE]
    }

    /// Writes memory at `addr`, wrapping it into the 12-bit address space
    pub fn write(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize % MEMORY_SIZE] = value;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
