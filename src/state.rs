//! # processor state
//!
//! INS8070 programmer's model:
//!  P0  program counter; names the next byte to be fetched
//!  P1  stack pointer, by software convention only (push/pop/call/ret use it)
//!  P2  pointer, also auto-indexed with mode 6
//!  P3  pointer, also auto-indexed with mode 7
//!  EA  accumulator (A, low byte) and extension (E, high byte)
//!  T   temporary; multiply/divide operand
//!  S   status: bit 0 interrupt enable, bit 6 overflow, bit 7 carry. the
//!      other bits mean nothing to us but are kept as written

/// interrupt enable
pub const MIE: u8 = 0x01;
/// overflow
pub const MOV: u8 = 0x40;
/// carry / no-borrow
pub const MCY: u8 = 0x80;

/// status after reset
pub const RESET_STATUS: u8 = 0x30;

pub const PC: usize = 0;
pub const SP: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorState {
    pub p: [u16; 4],
    pub ea: u16,
    pub t: u16,
    pub s: u8,
    /// interrupt request pending
    pub irq: bool,
    pub halted: bool,
}

impl ProcessorState {
    pub fn new() -> Self {
        ProcessorState {
            p: [0; 4],
            ea: 0,
            t: 0,
            s: RESET_STATUS,
            irq: false,
            halted: false,
        }
    }

    /// T survives a reset
    pub fn reset(&mut self) {
        self.ea = 0;
        self.s = RESET_STATUS;
        self.p = [0; 4];
        self.irq = false;
        self.halted = false;
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.ea as u8
    }

    #[inline]
    pub fn e(&self) -> u8 {
        (self.ea >> 8) as u8
    }

    /// replace A, keeping E
    #[inline]
    pub fn set_a(&mut self, v: u8) {
        self.ea = (self.ea & 0xff00) | u16::from(v);
    }

    #[inline]
    pub fn flag(&self, mask: u8) -> bool {
        self.s & mask != 0
    }

    #[inline]
    pub fn set_flag(&mut self, mask: u8, on: bool) {
        if on {
            self.s |= mask;
        } else {
            self.s &= !mask;
        }
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.p[PC]
    }

    #[inline]
    pub fn sp(&self) -> u16 {
        self.p[SP]
    }
}

impl Default for ProcessorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_defaults() {
        let mut s = ProcessorState::new();
        s.p = [1, 2, 3, 4];
        s.ea = 0x1234;
        s.t = 0x5678;
        s.s = 0xff;
        s.irq = true;
        s.halted = true;
        s.reset();
        assert_eq!(s.p, [0; 4]);
        assert_eq!(s.ea, 0);
        assert_eq!(s.s, 0x30);
        assert!(!s.irq);
        assert!(!s.halted);
        assert_eq!(s.t, 0x5678);
    }

    #[test]
    fn test_set_a_keeps_e() {
        let mut s = ProcessorState::new();
        s.ea = 0xabcd;
        s.set_a(0x12);
        assert_eq!(s.ea, 0xab12);
        assert_eq!(s.a(), 0x12);
        assert_eq!(s.e(), 0xab);
    }

    #[test]
    fn test_flags_leave_reserved_bits() {
        let mut s = ProcessorState::new();
        s.set_flag(MCY, true);
        s.set_flag(MIE, true);
        assert_eq!(s.s, 0xb1);
        s.set_flag(MCY, false);
        assert_eq!(s.s, 0x31);
        assert!(s.flag(MIE));
        assert!(!s.flag(MOV));
    }
}
