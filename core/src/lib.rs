pub use chip8::Chip8;
pub use constants::{DEFAULT_CYCLES_PER_FRAME, TIMER_HZ};
pub use error::{DecodeError, LoadError, StepError};
pub use instruction::Instruction;
pub use state::{FrameBuffer, Keypad, State};

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
