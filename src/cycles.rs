/// Base cost of every opcode, in machine cycles. Unassigned opcodes still
/// cost their entry.
#[rustfmt::skip]
pub const CYCLE_TABLE: [u8; 256] = [
//   0   1   2   3   4   5   6   7   8   9   a   b   c   d   e   f
     3,  5,  3,  3,  3,  3,  3,  3,  8,  4,  5,  4,  4, 43,  3,  4, // 0x00
    16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, // 0x10
    16,  3, 16, 16,  9,  9,  9,  9,  3,  3,  3,  3, 37,  9,  7,  7, // 0x20
     4,  4,  4,  4,  3,  3,  3,  3,  6,  5,  9,  5,  3,  3,  3,  3, // 0x30
     4,  3,  3,  3,  5,  5,  5,  5,  4,  3,  3,  3,  7,  7,  7,  7, // 0x40
     4,  3,  3,  3,  8,  3,  8,  8,  4,  3,  3,  3, 10,  3, 10, 10, // 0x50
     4,  3,  3,  3,  5,  3,  5,  5,  3,  3,  3,  3,  5,  3,  5,  5, // 0x60
     4,  3,  3,  3,  5,  3,  5,  5,  4,  3,  3,  3,  5,  3,  5,  5, // 0x70
    10, 10, 10, 10,  8, 10, 12, 12, 10, 10, 10, 10,  3, 10, 12, 12, // 0x80
     8,  8,  8,  8,  3,  8, 10, 10,  8,  8,  8,  8,  3,  8, 10, 10, // 0x90
    10, 10, 10, 10,  8, 10, 12, 12,  3,  3,  3,  3,  3,  3,  3,  3, // 0xa0
    10, 10, 10, 10,  8, 10, 12, 12, 10, 10, 10, 10,  8, 10, 12, 12, // 0xb0
     7,  7,  7,  7,  5,  7,  9,  9,  7,  7,  7,  7,  3,  7,  9,  9, // 0xc0
     7,  7,  7,  7,  5,  7,  9,  9,  7,  7,  7,  7,  5,  7,  9,  9, // 0xd0
     7,  7,  7,  7,  5,  7,  9,  9,  3,  3,  3,  3,  3,  3,  3,  3, // 0xe0
     7,  7,  7,  7,  5,  7,  9,  9,  7,  7,  7,  7,  5,  7,  9,  9, // 0xf0
];

/// cycles charged for taking an interrupt
pub const INTERRUPT_CYCLES: i64 = 9;

/// host time units per machine cycle
pub const UNITS_PER_CYCLE_SHIFT: u32 = 2;

#[inline]
pub fn cost(op: u8) -> i64 {
    i64::from(CYCLE_TABLE[usize::from(op)])
}
