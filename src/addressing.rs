//! Effective address resolution from the low 3 bits of an opcode.
use crate::state::ProcessorState;

/// top page reached by direct addressing
pub const DIRECT_PAGE: u16 = 0xff00;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// P[n] + disp; register unchanged. n = 0 is PC-relative, n = 1 stack-relative
    Indexed(usize),
    /// operand follows the opcode; no address
    Immediate,
    /// 0xff00 | disp
    Direct,
    /// pre-decrement for a negative disp, post-increment otherwise
    AutoIndexed(usize),
}

impl AddressingMode {
    pub const fn decode(op: u8) -> Self {
        let reg = (op & 3) as usize;
        match op & 7 {
            4 => AddressingMode::Immediate,
            5 => AddressingMode::Direct,
            6 | 7 => AddressingMode::AutoIndexed(reg),
            _ => AddressingMode::Indexed(reg),
        }
    }
}

/// Resolve `mode` given its already-fetched displacement byte. The caller must
/// fetch `disp` first: with P0 as base, the address is relative to the byte
/// after the displacement.
///
/// Immediate has no address and yields 0.
pub fn effective_address(mode: AddressingMode, state: &mut ProcessorState, disp: u8) -> u16 {
    let offset = disp as i8 as u16;
    match mode {
        AddressingMode::Immediate => 0,
        AddressingMode::Direct => DIRECT_PAGE | u16::from(disp),
        AddressingMode::AutoIndexed(n) => {
            let r = &mut state.p[n];
            if (disp as i8) < 0 {
                *r = r.wrapping_add(offset);
                *r
            } else {
                let addr = *r;
                *r = r.wrapping_add(offset);
                addr
            }
        }
        AddressingMode::Indexed(n) => state.p[n].wrapping_add(offset),
    }
}
