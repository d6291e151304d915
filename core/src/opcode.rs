use crate::constants::ADDRESS_MASK;

/// # Opcode
///
/// Every instruction is a big-endian 16-bit word split into four nibbles `[c x y n]`.
/// - `c` picks the instruction group
/// - `x` names the register Vx, or the last register of the block V0..Vx
/// - `y` names the register Vy
/// - `n` is a 4-bit immediate (sprite height) or picks the variant inside group 0x8
/// - `kk` (`[__yn]`) is an 8-bit immediate, or picks the variant inside groups 0x0, 0xE and 0xF
/// - `addr` (`[_xyn]`) is a 12-bit address
pub trait Opcode {
    /// `(c, x, y, n)`
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// `[c___]`
    fn group(&self) -> u8;

    /// `[_x__]`
    fn x(&self) -> u8;

    /// `[__y_]`
    fn y(&self) -> u8;

    /// `[___n]`
    fn n(&self) -> u8;

    /// `[__kk]`
    fn kk(&self) -> u8;

    /// `[_nnn]`
    fn addr(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (self.group(), self.x(), self.y(), self.n())
    }

    fn group(&self) -> u8 {
        (self >> 12) as u8
    }

    fn x(&self) -> u8 {
        ((self >> 8) & 0xF) as u8
    }

    fn y(&self) -> u8 {
        ((self >> 4) & 0xF) as u8
    }

    fn n(&self) -> u8 {
        (self & 0xF) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0xFF) as u8
    }

    fn addr(&self) -> u16 {
        self & ADDRESS_MASK
    }
}

/// Combines the two bytes at `pc` and `pc + 1` into an instruction word.
pub fn fetch(memory: &[u8], pc: u16) -> u16 {
    let high = u16::from(memory[pc as usize % memory.len()]);
    let low = u16::from(memory[(pc as usize + 1) % memory.len()]);
    high << 8 | low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        let op: u16 = 0xD12F;
        assert_eq!(op.nibbles(), (0xD, 0x1, 0x2, 0xF));
        assert_eq!(op.group(), 0xD);
        assert_eq!(op.x(), 0x1);
        assert_eq!(op.y(), 0x2);
        assert_eq!(op.n(), 0xF);
        assert_eq!(op.kk(), 0x2F);
        assert_eq!(op.addr(), 0x12F);
    }

    #[test]
    fn test_fetch_is_big_endian() {
        let mut memory = [0u8; 4096];
        memory[0x200] = 0x60;
        memory[0x201] = 0x05;
        assert_eq!(fetch(&memory, 0x200), 0x6005);
    }

    #[test]
    fn test_fetch_wraps_at_end_of_memory() {
        let mut memory = [0u8; 4096];
        memory[0xFFF] = 0x12;
        memory[0x000] = 0x34;
        assert_eq!(fetch(&memory, 0xFFF), 0x1234);
    }
}
