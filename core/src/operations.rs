//! Instruction semantics.
//!
//! Every function here runs after the fetch has already moved `pc` past the instruction, so
//! jumps overwrite `pc`, skips add 2 more, and CALL pushes the address of the next instruction.

use rand::Rng;

use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_SPRITE_SIZE, FONT_START, KEY_COUNT,
    STACK_DEPTH,
};
use crate::error::StepError;
use crate::instruction::Instruction;
use crate::state::State;

/// Carries out a single decoded instruction against `state`.
pub fn execute<R: Rng>(
    instruction: Instruction,
    state: &mut State,
    rng: &mut R,
) -> Result<(), StepError> {
    use Instruction::*;

    match instruction {
        Cls => cls(state),
        Ret => ret(state)?,
        Jump(addr) => jump(state, addr),
        Call(addr) => call(state, addr)?,
        SkipEqByte { x, kk } => {
            let equal = state.v[x as usize] == kk;
            skip_if(state, equal)
        }
        SkipNeByte { x, kk } => {
            let equal = state.v[x as usize] == kk;
            skip_if(state, !equal)
        }
        SkipEqReg { x, y } => {
            let equal = state.v[x as usize] == state.v[y as usize];
            skip_if(state, equal)
        }
        SkipNeReg { x, y } => {
            let equal = state.v[x as usize] == state.v[y as usize];
            skip_if(state, !equal)
        }
        LoadByte { x, kk } => state.v[x as usize] = kk,
        AddByte { x, kk } => state.v[x as usize] = state.v[x as usize].wrapping_add(kk),
        Move { x, y } => state.v[x as usize] = state.v[y as usize],
        Or { x, y } => state.v[x as usize] |= state.v[y as usize],
        And { x, y } => state.v[x as usize] &= state.v[y as usize],
        Xor { x, y } => state.v[x as usize] ^= state.v[y as usize],
        AddReg { x, y } => add(state, x, y),
        Sub { x, y } => sub(state, x, y),
        ShiftRight { x } => shr(state, x),
        SubN { x, y } => subn(state, x, y),
        ShiftLeft { x } => shl(state, x),
        LoadI(addr) => state.i = addr,
        JumpV0(addr) => {
            let target = addr + u16::from(state.v[0x0]);
            jump(state, target)
        }
        Random { x, kk } => state.v[x as usize] = rng.gen::<u8>() & kk,
        Draw { x, y, n } => draw(state, x, y, n),
        SkipKeyPressed { x } => {
            let pressed = key_down(state, x);
            skip_if(state, pressed)
        }
        SkipKeyReleased { x } => {
            let pressed = key_down(state, x);
            skip_if(state, !pressed)
        }
        LoadDelay { x } => state.v[x as usize] = state.delay_timer,
        WaitKey { x } => wait_key(state, x),
        SetDelay { x } => state.delay_timer = state.v[x as usize],
        SetSound { x } => state.sound_timer = state.v[x as usize],
        AddI { x } => {
            state.i = state.i.wrapping_add(u16::from(state.v[x as usize])) & ADDRESS_MASK
        }
        LoadFont { x } => load_font(state, x),
        Bcd { x } => bcd(state, x),
        StoreRegisters { x } => store_registers(state, x),
        LoadRegisters { x } => load_registers(state, x),
    }
    Ok(())
}

/// Address of the instruction currently executing
fn current_pc(state: &State) -> u16 {
    state.pc.wrapping_sub(2) & ADDRESS_MASK
}

/// clear
pub fn cls(state: &mut State) {
    state.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    state.draw_flag = true;
}

/// PC = STACK.pop()
pub fn ret(state: &mut State) -> Result<(), StepError> {
    if state.sp == 0 {
        return Err(StepError::StackUnderflow {
            pc: current_pc(state),
        });
    }
    state.sp -= 1;
    state.pc = state.stack[state.sp as usize] & ADDRESS_MASK;
    Ok(())
}

/// PC = addr
pub fn jump(state: &mut State, addr: u16) {
    state.pc = addr & ADDRESS_MASK;
}

/// STACK.push(PC); PC = addr
pub fn call(state: &mut State, addr: u16) -> Result<(), StepError> {
    if state.sp as usize >= STACK_DEPTH {
        return Err(StepError::StackOverflow {
            pc: current_pc(state),
        });
    }
    state.stack[state.sp as usize] = state.pc;
    state.sp += 1;
    state.pc = addr & ADDRESS_MASK;
    Ok(())
}

/// if condition then pc += 2
pub fn skip_if(state: &mut State, condition: bool) {
    if condition {
        state.pc = state.pc.wrapping_add(2) & ADDRESS_MASK;
    }
}

/// Vx += Vy; VF = carry
pub fn add(state: &mut State, x: u8, y: u8) {
    let sum = u16::from(state.v[x as usize]) + u16::from(state.v[y as usize]);
    state.v[x as usize] = sum as u8;
    state.v[0xF] = (sum > 0xFF) as u8;
}

/// Vx -= Vy; VF = Vx > Vy
pub fn sub(state: &mut State, x: u8, y: u8) {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    state.v[x as usize] = vx.wrapping_sub(vy);
    state.v[0xF] = (vx > vy) as u8;
}

/// Vx >>= 1; VF = shifted out bit
pub fn shr(state: &mut State, x: u8) {
    let vx = state.v[x as usize];
    state.v[x as usize] = vx >> 1;
    state.v[0xF] = vx & 0x1;
}

/// Vx = Vy - Vx; VF = Vy > Vx
pub fn subn(state: &mut State, x: u8, y: u8) {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    state.v[x as usize] = vy.wrapping_sub(vx);
    state.v[0xF] = (vy > vx) as u8;
}

/// Vx <<= 1; VF = shifted out bit
pub fn shl(state: &mut State, x: u8) {
    let vx = state.v[x as usize];
    state.v[x as usize] = vx << 1;
    state.v[0xF] = vx >> 7;
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs an n-row sprite from memory at I onto the FrameBuffer at (Vx, Vy), wrapping at the
/// edges. VF ends up 1 if any lit pixel was erased, otherwise 0.
pub fn draw(state: &mut State, x: u8, y: u8, n: u8) {
    // Read the coordinates before VF is reset; either may be VF
    let origin_x = state.v[x as usize] as usize;
    let origin_y = state.v[y as usize] as usize;
    state.v[0xF] = 0x0;

    for row in 0..n as usize {
        let sprite = state.read(state.i.wrapping_add(row as u16));
        let target_y = (origin_y + row) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            let pixel = (sprite >> (7 - bit)) & 0x1;
            if pixel == 0 {
                continue;
            }
            let target_x = (origin_x + bit) % DISPLAY_WIDTH;
            let cell = &mut state.frame_buffer[target_y][target_x];
            if *cell == 1 {
                state.v[0xF] = 0x1;
            }
            *cell ^= pixel;
        }
    }
    state.draw_flag = true;
}

/// Vx.pressed
fn key_down(state: &State, x: u8) -> bool {
    state.keypad[state.v[x as usize] as usize % KEY_COUNT]
}

/// Vx = lowest pressed key, or refetch this instruction next step
pub fn wait_key(state: &mut State, x: u8) {
    match state.keypad.iter().position(|&pressed| pressed) {
        Some(key) => state.v[x as usize] = key as u8,
        None => state.pc = current_pc(state),
    }
}

/// I = address of the font sprite for the hex digit in Vx
pub fn load_font(state: &mut State, x: u8) {
    let digit = u16::from(state.v[x as usize] & 0xF);
    state.i = FONT_START + digit * FONT_SPRITE_SIZE;
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(state: &mut State, x: u8) {
    let vx = state.v[x as usize];
    let digits = [vx / 100, vx / 10 % 10, vx % 10];
    let i = state.i;
    for (offset, digit) in digits.iter().enumerate() {
        state.write(i.wrapping_add(offset as u16), *digit);
    }
}

/// mem[I..=I+x] = V0..=Vx
pub fn store_registers(state: &mut State, x: u8) {
    let i = state.i;
    for register in 0..=x as usize {
        let value = state.v[register];
        state.write(i.wrapping_add(register as u16), value);
    }
}

/// V0..=Vx = mem[I..=I+x]
pub fn load_registers(state: &mut State, x: u8) {
    for register in 0..=x as usize {
        state.v[register] = state.read(state.i.wrapping_add(register as u16));
    }
}
