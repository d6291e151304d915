use thiserror::Error;

/// Failures while building a machine from a program image
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program image is {size} bytes but at most {max} fit above 0x200")]
    TooLarge { size: usize, max: usize },

    #[error("unable to read program image")]
    Io(#[from] std::io::Error),
}

/// A fetched word that doesn't match any documented instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown opcode {opcode:#06X}")]
pub struct DecodeError {
    pub opcode: u16,
}

/// Reported by `Chip8::step` when an instruction could not be carried out.
///
/// `pc` is the address of the offending instruction. In every case the program counter has
/// already moved past it and no other state was touched, so execution may continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("{source} at {pc:#05X}")]
    Decode { source: DecodeError, pc: u16 },

    #[error("call at {pc:#05X} exceeds the stack depth")]
    StackOverflow { pc: u16 },

    #[error("return at {pc:#05X} with an empty stack")]
    StackUnderflow { pc: u16 },
}

impl StepError {
    pub fn pc(&self) -> u16 {
        match *self {
            StepError::Decode { pc, .. }
            | StepError::StackOverflow { pc }
            | StepError::StackUnderflow { pc } => pc,
        }
    }
}
