//! 8- and 16-bit add/subtract. Only A (or EA) and the overflow and carry bits
//! of S are written; everything else in S is left alone.
//!
//! Carry after a subtract means "no borrow".
use crate::state::{ProcessorState, MCY, MOV};

const SIGN8: u8 = 0x80;
const SIGN16: u16 = 0x8000;

impl ProcessorState {
    /// A += v
    pub fn add_a(&mut self, v: u8) {
        let a = self.a();
        let r = a.wrapping_add(v);
        self.set_flag(MOV, ((r & !a & !v) | (!r & a & v)) & SIGN8 != 0);
        self.set_flag(MCY, ((a & v) | (v & !r) | (!r & a)) & SIGN8 != 0);
        self.set_a(r);
    }

    /// EA += v
    pub fn add_ea(&mut self, v: u16) {
        let ea = self.ea;
        let r = ea.wrapping_add(v);
        self.set_flag(MOV, ((r & !ea & !v) | (!r & ea & v)) & SIGN16 != 0);
        self.set_flag(MCY, ((ea & v) | (v & !r) | (!r & ea)) & SIGN16 != 0);
        self.ea = r;
    }

    /// A -= v
    pub fn sub_a(&mut self, v: u8) {
        let a = self.a();
        let r = a.wrapping_sub(v);
        self.set_flag(MOV, ((a & !v & !r) | (!a & v & r)) & SIGN8 != 0);
        self.set_flag(MCY, ((!a & v) | (v & r) | (r & !a)) & SIGN8 == 0);
        self.set_a(r);
    }

    /// EA -= v
    pub fn sub_ea(&mut self, v: u16) {
        let ea = self.ea;
        let r = ea.wrapping_sub(v);
        self.set_flag(MOV, ((ea & !v & !r) | (!ea & v & r)) & SIGN16 != 0);
        self.set_flag(MCY, ((!ea & v) | (v & r) | (r & !ea)) & SIGN16 == 0);
        self.ea = r;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn with_a(a: u8) -> ProcessorState {
        let mut s = ProcessorState::new();
        s.ea = 0x5500 | u16::from(a);
        s
    }

    #[test]
    fn test_add_examples() {
        let mut s = with_a(0x7f);
        s.add_a(0x01);
        assert_eq!(s.a(), 0x80);
        assert!(s.flag(MOV));
        assert!(!s.flag(MCY));

        let mut s = with_a(0xff);
        s.add_a(0x01);
        assert_eq!(s.a(), 0x00);
        assert!(!s.flag(MOV));
        assert!(s.flag(MCY));
        // E untouched
        assert_eq!(s.e(), 0x55);
    }

    #[test]
    fn test_sub_no_borrow_convention() {
        let mut s = with_a(0x00);
        s.sub_a(0x01);
        assert_eq!(s.a(), 0xff);
        assert!(!s.flag(MCY));

        let mut s = with_a(0x01);
        s.sub_a(0x01);
        assert_eq!(s.a(), 0x00);
        assert!(s.flag(MCY));
        assert!(!s.flag(MOV));

        let mut s = with_a(0x80);
        s.sub_a(0x01);
        assert!(s.flag(MOV));
    }

    #[test]
    fn test_add_all_byte_pairs() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let mut s = with_a(a);
                s.add_a(b);
                let wide = u16::from(a) + u16::from(b);
                let signed = i16::from(a as i8) + i16::from(b as i8);
                assert_eq!(s.a(), wide as u8);
                assert_eq!(s.flag(MCY), wide > 0xff, "carry {:02x}+{:02x}", a, b);
                assert_eq!(
                    s.flag(MOV),
                    !(-128..=127).contains(&signed),
                    "overflow {:02x}+{:02x}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_sub_all_byte_pairs() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let mut s = with_a(a);
                s.sub_a(b);
                let signed = i16::from(a as i8) - i16::from(b as i8);
                assert_eq!(s.a(), a.wrapping_sub(b));
                assert_eq!(s.flag(MCY), a >= b, "carry {:02x}-{:02x}", a, b);
                assert_eq!(
                    s.flag(MOV),
                    !(-128..=127).contains(&signed),
                    "overflow {:02x}-{:02x}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_other_status_bits_untouched() {
        let mut s = with_a(0x7f);
        s.s = 0x3f;
        s.add_a(0x01);
        assert_eq!(s.s & 0x3f, 0x3f);
        s.sub_ea(0x1234);
        assert_eq!(s.s & 0x3f, 0x3f);
    }

    proptest! {
        #[test]
        fn prop_add_ea_flags(a in any::<u16>(), b in any::<u16>()) {
            let mut s = ProcessorState::new();
            s.ea = a;
            s.add_ea(b);
            let signed = i32::from(a as i16) + i32::from(b as i16);
            prop_assert_eq!(s.ea, a.wrapping_add(b));
            prop_assert_eq!(s.flag(MCY), u32::from(a) + u32::from(b) > 0xffff);
            prop_assert_eq!(s.flag(MOV), !(-32768..=32767).contains(&signed));
        }

        #[test]
        fn prop_sub_ea_flags(a in any::<u16>(), b in any::<u16>()) {
            let mut s = ProcessorState::new();
            s.ea = a;
            s.sub_ea(b);
            let signed = i32::from(a as i16) - i32::from(b as i16);
            prop_assert_eq!(s.ea, a.wrapping_sub(b));
            prop_assert_eq!(s.flag(MCY), a >= b);
            prop_assert_eq!(s.flag(MOV), !(-32768..=32767).contains(&signed));
        }
    }
}
