/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;
/// Addresses are 12 bits wide; anything computed at runtime is masked with this
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// Where program images are loaded and where execution begins
pub const PROGRAM_START: u16 = 0x200;
/// The largest image that fits between `PROGRAM_START` and the end of memory
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Both timers count down at this rate regardless of how fast the CPU runs
pub const TIMER_HZ: u32 = 60;
/// Instructions executed per 60Hz frame by a typical pacing loop
pub const DEFAULT_CYCLES_PER_FRAME: u32 = 10;

/// Start of the hex font in the interpreter area
pub const FONT_START: u16 = 0x050;
pub const FONT_SPRITE_SIZE: u16 = 5;

/// # Font
/// Sprites for the hexadecimal digits 0..F, 5 bytes each.
///
/// Each byte is one row; only the high nibble is lit, e.g. `0`:
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const FONT_SPRITES: [u8; 80] = [
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
