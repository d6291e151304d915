use crate::error::DecodeError;
use crate::opcode::Opcode;

/// A decoded instruction.
///
/// Register operands are nibbles so they always index V0..VF. Addresses are 12 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SkipEqByte { x: u8, kk: u8 },
    /// 4xkk
    SkipNeByte { x: u8, kk: u8 },
    /// 5xy_
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadByte { x: u8, kk: u8 },
    /// 7xkk
    AddByte { x: u8, kk: u8 },
    /// 8xy0
    Move { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddReg { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8 },
    /// 8xy7
    SubN { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8 },
    /// 9xy_
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadI(u16),
    /// Bnnn
    JumpV0(u16),
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: u8 },
    /// ExA1
    SkipKeyReleased { x: u8 },
    /// Fx07
    LoadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddI { x: u8 },
    /// Fx29
    LoadFont { x: u8 },
    /// Fx33
    Bcd { x: u8 },
    /// Fx55
    StoreRegisters { x: u8 },
    /// Fx65
    LoadRegisters { x: u8 },
}

impl Instruction {
    /// Selects the Instruction encoded by `op`.
    ///
    /// Groups 0x0, 0xE and 0xF pick their variant with the low byte and group 0x8 with the
    /// low nibble; anything undocumented inside those groups is rejected. Groups 0x5 and 0x9
    /// ignore their low nibble.
    pub fn decode(op: u16) -> Result<Instruction, DecodeError> {
        use Instruction::*;

        let (x, y) = (op.x(), op.y());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Cls,
            (0x0, 0x0, 0xE, 0xE) => Ret,
            (0x1, ..) => Jump(op.addr()),
            (0x2, ..) => Call(op.addr()),
            (0x3, ..) => SkipEqByte { x, kk: op.kk() },
            (0x4, ..) => SkipNeByte { x, kk: op.kk() },
            (0x5, ..) => SkipEqReg { x, y },
            (0x6, ..) => LoadByte { x, kk: op.kk() },
            (0x7, ..) => AddByte { x, kk: op.kk() },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x },
            (0x8, .., 0x7) => SubN { x, y },
            (0x8, .., 0xE) => ShiftLeft { x },
            (0x9, ..) => SkipNeReg { x, y },
            (0xA, ..) => LoadI(op.addr()),
            (0xB, ..) => JumpV0(op.addr()),
            (0xC, ..) => Random { x, kk: op.kk() },
            (0xD, .., n) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipKeyPressed { x },
            (0xE, _, 0xA, 0x1) => SkipKeyReleased { x },
            (0xF, _, 0x0, 0x7) => LoadDelay { x },
            (0xF, _, 0x0, 0xA) => WaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddI { x },
            (0xF, _, 0x2, 0x9) => LoadFont { x },
            (0xF, _, 0x3, 0x3) => Bcd { x },
            (0xF, _, 0x5, 0x5) => StoreRegisters { x },
            (0xF, _, 0x6, 0x5) => LoadRegisters { x },
            _ => return Err(DecodeError { opcode: op }),
        };
        Ok(instruction)
    }
}
