//! Per-instruction trace for offline diagnostics.
//!
//! The interpreter only builds records when its `Tracer` says it is active,
//! and never reads them back. A `TraceBuffer` keeps the most recent records;
//! what happens to them (dumping, stopping the session) is up to the caller.
use std::collections::VecDeque;
use std::io::{self, Write};

use crate::state::{ProcessorState, MCY, MOV};

/// raw instruction bytes kept per record
pub const MAX_OP_BYTES: usize = 3;
/// memory accesses kept per record
pub const MAX_ACCESSES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    LoadByte,
    LoadWord,
    StoreByte,
    StoreWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub addr: u16,
    pub value: u16,
    pub kind: AccessKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceRecord {
    /// address of the opcode
    pub pc: u16,
    pub op: Vec<u8>,
    pub p: [u16; 4],
    pub ea: u16,
    pub t: u16,
    pub s: u8,
    pub accesses: Vec<Access>,
}

impl TraceRecord {
    pub fn new(pc: u16) -> Self {
        TraceRecord {
            pc,
            op: Vec::with_capacity(MAX_OP_BYTES),
            accesses: Vec::with_capacity(MAX_ACCESSES),
            ..Default::default()
        }
    }

    pub fn push_op(&mut self, byte: u8) {
        if self.op.len() < MAX_OP_BYTES {
            self.op.push(byte);
        }
    }

    pub fn push_access(&mut self, addr: u16, value: u16, kind: AccessKind) {
        if self.accesses.len() < MAX_ACCESSES {
            self.accesses.push(Access { addr, value, kind });
        }
    }

    /// copy registers as they stand after the instruction
    pub fn capture(&mut self, state: &ProcessorState) {
        self.p = state.p;
        self.ea = state.ea;
        self.t = state.t;
        self.s = state.s;
    }

    /// one line: pc, op bytes, P0-P3, EA, T, flags, accesses
    pub fn write_line(&self, index: usize, w: &mut impl Write) -> io::Result<()> {
        write!(w, "{:4} {:04X} ", index, self.pc)?;
        for i in 0..MAX_OP_BYTES {
            match self.op.get(i) {
                Some(b) => write!(w, "{:02X} ", b)?,
                None => write!(w, "   ")?,
            }
        }
        write!(
            w,
            "{:04X} {:04X} {:04X} {:04X} {:04X} {:04X} {}{} ",
            self.p[0],
            self.p[1],
            self.p[2],
            self.p[3],
            self.ea,
            self.t,
            if self.s & MCY != 0 { 'C' } else { '-' },
            if self.s & MOV != 0 { 'V' } else { '-' },
        )?;
        for a in &self.accesses {
            match a.kind {
                AccessKind::LoadByte => write!(w, "L {:04X} {:02X} ", a.addr, a.value)?,
                AccessKind::LoadWord => write!(w, "L {:04X} {:04X} ", a.addr, a.value)?,
                AccessKind::StoreByte => write!(w, "S {:04X} {:02X} ", a.addr, a.value)?,
                AccessKind::StoreWord => write!(w, "S {:04X} {:04X} ", a.addr, a.value)?,
            }
        }
        writeln!(w)
    }
}

/// Receives trace records from the interpreter.
pub trait Tracer {
    /// when false the interpreter skips building records altogether
    fn is_active(&self) -> bool;

    fn record(&mut self, record: TraceRecord);

    /// an unassigned opcode was executed (as a no-op)
    fn illegal_opcode(&mut self, _pc: u16, _op: u8) {}

    /// the guest executed the exit opcode
    fn exit(&mut self) {}
}

impl<T: Tracer + ?Sized> Tracer for &mut T {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }
    fn record(&mut self, record: TraceRecord) {
        (**self).record(record)
    }
    fn illegal_opcode(&mut self, pc: u16, op: u8) {
        (**self).illegal_opcode(pc, op)
    }
    fn exit(&mut self) {
        (**self).exit()
    }
}

/// the default: traces nothing
pub struct NullTracer;

impl Tracer for NullTracer {
    fn is_active(&self) -> bool {
        false
    }

    fn record(&mut self, _record: TraceRecord) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceMode {
    /// overwrite the oldest record when full
    Wrap,
    /// stop recording once full
    SinglePass,
}

/// Bounded record of the last `capacity` instructions.
///
/// Recording stops on an illegal opcode or the exit opcode (after keeping
/// that instruction's record), when `stop` is called, or (single-pass) when
/// the buffer fills. Stopped buffers keep their contents until drained.
pub struct TraceBuffer {
    records: VecDeque<TraceRecord>,
    capacity: usize,
    mode: TraceMode,
    stopped: bool,
    /// stop once the in-flight record is in
    stop_pending: bool,
}

impl TraceBuffer {
    pub fn new(capacity: usize, mode: TraceMode) -> Self {
        TraceBuffer {
            records: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            mode,
            stopped: false,
            stop_pending: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// take everything, oldest first, and start recording again
    pub fn drain(&mut self) -> Vec<TraceRecord> {
        self.stopped = false;
        self.stop_pending = false;
        self.records.drain(..).collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// write the buffer, oldest first, one line per instruction
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        for (i, r) in self.records.iter().enumerate() {
            r.write_line(i, w)?;
        }
        Ok(())
    }
}

impl Tracer for TraceBuffer {
    fn is_active(&self) -> bool {
        !self.stopped
    }

    fn record(&mut self, record: TraceRecord) {
        if self.stopped {
            return;
        }
        if self.records.len() == self.capacity {
            match self.mode {
                TraceMode::Wrap => {
                    self.records.pop_front();
                }
                TraceMode::SinglePass => {
                    self.stopped = true;
                    return;
                }
            }
        }
        self.records.push_back(record);
        if self.stop_pending {
            self.stop_pending = false;
            self.stopped = true;
        }
    }

    fn illegal_opcode(&mut self, pc: u16, op: u8) {
        log::warn!("illegal op: PC={:04x} OP={:02x}", pc, op);
        self.stop_pending = true;
    }

    fn exit(&mut self) {
        self.stop_pending = true;
    }
}
