//! Instruction handlers and the 256-entry dispatch table.
//!
//! A handler runs after its opcode byte has been fetched (P0 already names
//! the next byte) and returns cycles owed on top of the opcode's table cost.
//! Only ssm owes any.
//!
//! Memory-operand families share one handler across their eight addressing
//! modes; `op & 7 == 4` is the immediate form. Store and increment families
//! have no immediate form and leave that slot unassigned.
use crate::interpreter::Ins8070Interpreter;
use crate::state::{MCY, PC};

pub(crate) type Handler = fn(&mut Ins8070Interpreter<'_>, u8) -> i64;

/// base of the 16-entry CALL vector table
const CALL_VECTORS: u16 = 0x0020;

const fn decode(op: u8) -> Handler {
    match op {
        0x00 => nop,
        0x01 => xch_a_e,
        0x02 => getc,
        0x03 => putc,
        0x04 => exit,
        0x05 => halt,
        0x06 => ld_a_s,
        0x07 => ld_s_a,
        0x08 => push_ea,
        0x09 => ld_t_ea,
        0x0a => push_a,
        0x0b => ld_ea_t,
        0x0c => sr_ea,
        0x0d => div,
        0x0e => sl_a,
        0x0f => sl_ea,
        0x10..=0x1f => call,
        0x20 | 0x22 | 0x23 => jsr_pli,
        0x24..=0x27 => ld_p_imm,
        0x2c => mpy,
        0x2d => bnd,
        0x2e | 0x2f => ssm,
        0x30..=0x33 => ld_ea_p,
        0x38 => pop_a,
        0x39 => and_s,
        0x3a => pop_ea,
        0x3b => or_s,
        0x3c => sr_a,
        0x3d => srl_a,
        0x3e => rr_a,
        0x3f => rrl_a,
        0x40 => ld_a_e,
        0x44..=0x47 => ld_p_ea,
        0x48 => ld_e_a,
        0x4c..=0x4f => xch_ea_p,
        0x50 => and_a_e,
        0x54 | 0x56 | 0x57 => push_p,
        0x58 => or_a_e,
        0x5c | 0x5e | 0x5f => pop_p,
        0x60 => xor_a_e,
        0x64 | 0x66 | 0x67 => bp,
        0x6c | 0x6e | 0x6f => bz,
        0x70 => add_a_e,
        0x74 | 0x76 | 0x77 => bra,
        0x78 => sub_a_e,
        0x7c | 0x7e | 0x7f => bnz,
        0x80..=0x87 => ld_ea,
        0x88..=0x8b | 0x8d..=0x8f => st_ea,
        0x90..=0x93 | 0x95..=0x97 => ild,
        0x98..=0x9b | 0x9d..=0x9f => dld,
        0xa0..=0xa7 => ld_t,
        0xb0..=0xb7 => add_ea,
        0xb8..=0xbf => sub_ea,
        0xc0..=0xc7 => ld_a,
        0xc8..=0xcb | 0xcd..=0xcf => st_a,
        0xd0..=0xd7 => and_a,
        0xd8..=0xdf => or_a,
        0xe0..=0xe7 => xor_a,
        0xf0..=0xf7 => add_a,
        0xf8..=0xff => sub_a,
        _ => illegal,
    }
}

pub(crate) static DISPATCH: [Handler; 256] = {
    let mut table = [illegal as Handler; 256];
    let mut op = 0;
    while op < 256 {
        table[op] = decode(op as u8);
        op += 1;
    }
    table
};

/// pointer register named by the low two bits
#[inline]
fn reg(op: u8) -> usize {
    usize::from(op & 3)
}

fn is_immediate(op: u8) -> bool {
    op & 7 == 4
}

/// byte operand: immediate, or loaded through the bus
fn operand_byte(i: &mut Ins8070Interpreter<'_>, op: u8) -> u8 {
    if is_immediate(op) {
        i.fetch()
    } else {
        let addr = i.ea(op);
        i.bus.ld1(addr)
    }
}

fn operand_word(i: &mut Ins8070Interpreter<'_>, op: u8) -> u16 {
    if is_immediate(op) {
        i.fetch_word()
    } else {
        let addr = i.ea(op);
        i.bus.ld2(addr)
    }
}

fn illegal(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let pc = i.state.pc().wrapping_sub(1);
    log::trace!("unassigned opcode {:02x} at {:04x}", op, pc);
    i.tracer.illegal_opcode(pc, op);
    0
}

fn nop(_i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    0
}

// emulator-only opcodes

fn getc(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let c = i.console.getc();
    i.state.set_a(c);
    0
}

fn putc(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.console.putc(i.state.a() & 0x7f);
    0
}

fn exit(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    log::info!("guest exit at {:04x}", i.state.pc().wrapping_sub(1));
    i.console.request_exit();
    i.tracer.exit();
    i.state.halted = true;
    0
}

fn halt(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.halted = true;
    0
}

// register moves

fn xch_a_e(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.ea = i.state.ea.swap_bytes();
    0
}

fn ld_a_s(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.set_a(i.state.s);
    0
}

fn ld_s_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.s = i.state.a();
    0
}

fn ld_t_ea(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.t = i.state.ea;
    0
}

fn ld_ea_t(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.ea = i.state.t;
    0
}

fn ld_ea_p(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.state.ea = i.state.p[reg(op)];
    0
}

fn ld_p_ea(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.state.p[reg(op)] = i.state.ea;
    0
}

fn xch_ea_p(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    std::mem::swap(&mut i.state.ea, &mut i.state.p[reg(op)]);
    0
}

fn ld_a_e(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.set_a(i.state.e());
    0
}

/// A copied into E
fn ld_e_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let a = u16::from(i.state.a());
    i.state.ea = a << 8 | a;
    0
}

fn and_s(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let mask = i.fetch();
    i.state.s &= mask;
    0
}

fn or_s(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let mask = i.fetch();
    i.state.s |= mask;
    0
}

// stack

fn push_ea(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.push_word(i.state.ea);
    0
}

fn pop_ea(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.ea = i.pop_word();
    0
}

fn push_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.push_byte(i.state.a());
    0
}

fn pop_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let a = i.pop_byte();
    i.state.set_a(a);
    0
}

fn push_p(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.push_word(i.state.p[reg(op)]);
    0
}

/// pop P0 is ret
fn pop_p(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.state.p[reg(op)] = i.pop_word();
    0
}

// control transfer

fn call(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.push_word(i.state.pc());
    let vector = CALL_VECTORS + u16::from(op & 0x0f) * 2;
    i.state.p[PC] = i.bus.ld2(vector);
    0
}

/// push P[n] then load it with the immediate; with P0 this is jsr
fn jsr_pli(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let target = i.fetch_word();
    let n = reg(op);
    i.push_word(i.state.p[n]);
    i.state.p[n] = target;
    0
}

/// with P0 this is jmp
fn ld_p_imm(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.state.p[reg(op)] = i.fetch_word();
    0
}

fn bp(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let positive = i.state.a() & 0x80 == 0;
    i.branch(op, positive);
    0
}

fn bz(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let zero = i.state.a() == 0;
    i.branch(op, zero);
    0
}

fn bnz(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let nonzero = i.state.a() != 0;
    i.branch(op, nonzero);
    0
}

fn bra(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.branch(op, true);
    0
}

/// ASCII digit in A: convert it and skip the offset byte; otherwise branch
fn bnd(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let a = i.state.a();
    if a.is_ascii_digit() {
        i.state.set_a(a - b'0');
        i.state.p[PC] = i.state.pc().wrapping_add(1);
    } else {
        let disp = i.fetch() as i8;
        i.state.p[PC] = i.state.pc().wrapping_add(disp as u16);
    }
    0
}

/// Search up to 256 bytes from P[n] for A. A hit leaves P[n] one past it and
/// skips the two bytes after the opcode; a miss puts P[n] back.
fn ssm(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let n = reg(op);
    let start = i.state.p[n];
    let a = i.state.a();
    for k in 0..256 {
        let addr = i.state.p[n];
        i.state.p[n] = addr.wrapping_add(1);
        if i.bus.ld1(addr) == a {
            i.state.p[PC] = i.state.pc().wrapping_add(2);
            return k * 4;
        }
    }
    i.state.p[n] = start;
    -2
}

// arithmetic and logic

fn sr_ea(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.ea >>= 1;
    0
}

fn sl_ea(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.ea <<= 1;
    0
}

fn sl_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.set_a(i.state.a() << 1);
    0
}

/// low 7 bits of A from EA >> 1; bit 7 clear
fn sr_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let low = (i.state.ea >> 1) as u8 & 0x7f;
    i.state.set_a(low);
    0
}

/// as sr A, with carry into bit 7
fn srl_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let low = (i.state.ea >> 1) as u8 & 0x7f;
    i.state.set_a(i.state.s & MCY | low);
    0
}

fn rr_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let ea = i.state.ea;
    i.state.set_a((ea << 7) as u8 | (ea >> 1) as u8 & 0x7f);
    0
}

/// rotate A right through carry
fn rrl_a(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let a = i.state.a();
    i.state.set_a(i.state.s & MCY | a >> 1);
    i.state.set_flag(MCY, a & 1 != 0);
    0
}

/// EA:T = (T & 0x7fff) * EA, signed
fn mpy(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let product = i32::from((i.state.t & 0x7fff) as i16) * i32::from(i.state.ea as i16);
    i.state.ea = (product >> 16) as u16;
    i.state.t = product as u16;
    0
}

/// EA = EA / T, T = remainder; unsigned. A zero divisor leaves EA = 0xffff
/// and the dividend in T.
fn div(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let (ea, t) = (i.state.ea, i.state.t);
    match ea.checked_div(t) {
        Some(q) => {
            i.state.t = ea % t;
            i.state.ea = q;
        }
        None => {
            log::debug!("divide by zero at {:04x}", i.state.pc().wrapping_sub(1));
            i.state.ea = 0xffff;
            i.state.t = ea;
        }
    }
    0
}

fn and_a_e(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.set_a(i.state.a() & i.state.e());
    0
}

fn or_a_e(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.set_a(i.state.a() | i.state.e());
    0
}

fn xor_a_e(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    i.state.set_a(i.state.a() ^ i.state.e());
    0
}

fn add_a_e(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let e = i.state.e();
    i.state.add_a(e);
    0
}

fn sub_a_e(i: &mut Ins8070Interpreter<'_>, _op: u8) -> i64 {
    let e = i.state.e();
    i.state.sub_a(e);
    0
}

// memory-operand families

fn ld_ea(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.state.ea = operand_word(i, op);
    0
}

fn st_ea(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let addr = i.ea(op);
    i.bus.st2(addr, i.state.ea);
    0
}

fn ld_t(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    i.state.t = operand_word(i, op);
    0
}

fn add_ea(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let v = operand_word(i, op);
    i.state.add_ea(v);
    0
}

fn sub_ea(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let v = operand_word(i, op);
    i.state.sub_ea(v);
    0
}

/// increment memory, result in A too
fn ild(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let addr = i.ea(op);
    let v = i.bus.ld1(addr).wrapping_add(1);
    i.state.set_a(v);
    i.bus.st1(addr, v);
    0
}

fn dld(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let addr = i.ea(op);
    let v = i.bus.ld1(addr).wrapping_sub(1);
    i.state.set_a(v);
    i.bus.st1(addr, v);
    0
}

fn ld_a(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let v = operand_byte(i, op);
    i.state.set_a(v);
    0
}

fn st_a(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let addr = i.ea(op);
    i.bus.st1(addr, i.state.a());
    0
}

fn and_a(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let v = operand_byte(i, op);
    i.state.set_a(i.state.a() & v);
    0
}

fn or_a(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let v = operand_byte(i, op);
    i.state.set_a(i.state.a() | v);
    0
}

fn xor_a(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let v = operand_byte(i, op);
    i.state.set_a(i.state.a() ^ v);
    0
}

fn add_a(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let v = operand_byte(i, op);
    i.state.add_a(v);
    0
}

fn sub_a(i: &mut Ins8070Interpreter<'_>, op: u8) -> i64 {
    let v = operand_byte(i, op);
    i.state.sub_a(v);
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferConsole;
    use crate::disk::NoDisk;
    use crate::input::DummyInput;
    use crate::memory::MemoryMap;
    use crate::sound::Mute;

    const UNASSIGNED: [u8; 60] = [
        0x21, 0x28, 0x29, 0x2a, 0x2b, 0x34, 0x35, 0x36, 0x37, 0x41, 0x42, 0x43, 0x49, 0x4a,
        0x4b, 0x51, 0x52, 0x53, 0x55, 0x59, 0x5a, 0x5b, 0x5d, 0x61, 0x62, 0x63, 0x65, 0x68,
        0x69, 0x6a, 0x6b, 0x6d, 0x71, 0x72, 0x73, 0x75, 0x79, 0x7a, 0x7b, 0x7d, 0x8c, 0x94,
        0x9c, 0xa8, 0xa9, 0xaa, 0xab, 0xac, 0xad, 0xae, 0xaf, 0xcc, 0xe8, 0xe9, 0xea, 0xeb,
        0xec, 0xed, 0xee, 0xef,
    ];

    fn run_one(op: u8) -> (crate::state::ProcessorState, Vec<u8>) {
        let mut disk = NoDisk;
        let mut input = DummyInput::new(0);
        let mut sound = Mute::new();
        let mut console = BufferConsole::new(b"");
        let mut i = Ins8070Interpreter::new(&mut disk, &mut input, &mut sound, &mut console);
        i.memory_mut().write(&[op, 0x12, 0x34], 0x0100);
        i.state_mut().p = [0x0100, 0x2000, 0x3000, 0x4000];
        i.state_mut().ea = 0x5678;
        i.state_mut().t = 0x9abc;
        i.execute(0);
        let mem = i.memory().get_ro_slice(0, 0x10000).to_vec();
        (i.state().clone(), mem)
    }

    #[test]
    fn test_unassigned_opcodes_only_advance_pc() {
        let (_, pristine) = run_one(0x00);
        for op in UNASSIGNED {
            let (s, mem) = run_one(op);
            assert_eq!(s.pc(), 0x0101, "op {:02x}", op);
            assert_eq!(s.p[1..], [0x2000, 0x3000, 0x4000], "op {:02x}", op);
            assert_eq!((s.ea, s.t, s.s), (0x5678, 0x9abc, 0x30), "op {:02x}", op);
            assert!(mem[..0x0100] == pristine[..0x0100], "op {:02x}", op);
            assert!(mem[0x0101..] == pristine[0x0101..], "op {:02x}", op);
        }
    }

    #[test]
    fn test_immediate_forms() {
        for op in [0x84u8, 0xa4, 0xb4, 0xbc, 0xc4, 0xd4, 0xdc, 0xe4, 0xf4, 0xfc] {
            let (s, _) = run_one(op);
            let expected = if op == 0xc4 || op >= 0xd4 { 0x0102 } else { 0x0103 };
            assert_eq!(s.pc(), expected, "op {:02x}", op);
        }
    }

    #[test]
    fn test_stack_relative_operand() {
        let mut disk = NoDisk;
        let mut input = DummyInput::new(0);
        let mut sound = Mute::new();
        let mut console = BufferConsole::new(b"");
        let mut i = Ins8070Interpreter::new(&mut disk, &mut input, &mut sound, &mut console);
        // ld EA,2,SP
        i.memory_mut().write(&[0x81, 0x02], 0x0000);
        i.memory_mut().write_word(0x2002, 0xabcd);
        i.state_mut().p[1] = 0x2000;
        i.execute(0);
        assert_eq!(i.state().ea, 0xabcd);
        assert_eq!(i.state().sp(), 0x2000);
    }
}
