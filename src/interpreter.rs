/// # interpreter
///
/// Fetch/decode/execute for the INS8070 against a 64K bus. The host hands the
/// interpreter its devices once, then alternates `raise_interrupt` and
/// `execute(budget)`; `execute` runs whole instructions until the budget is
/// spent and returns the overrun so the next call can be shortened by it.
///
/// Budgets are in host units, four to a machine cycle.
use crate::bus::Bus;
use crate::console::Console;
use crate::cycles::{self, INTERRUPT_CYCLES, UNITS_PER_CYCLE_SHIFT};
use crate::disk::Disk;
use crate::display::Display;
use crate::error::{Error, Result};
use crate::input::Input;
use crate::memory::{AddressSpace, FRAMEBUFFER_BYTES};
use crate::opcodes::DISPATCH;
use crate::sound::Sound;
use crate::state::{ProcessorState, MIE, PC, SP};
use crate::trace::{NullTracer, Tracer};
use crate::{addressing, addressing::AddressingMode};
use std::io;
use std::time::{Duration, Instant};

/// where an acknowledged interrupt continues
pub const INTERRUPT_VECTOR: u16 = 0x0003;

/// host frames per second for `main_loop`
pub const FRAMES_PER_SECOND: u32 = 60;

pub struct Ins8070Interpreter<'a> {
    pub(crate) state: ProcessorState,
    pub(crate) bus: Bus<'a>,
    pub(crate) console: &'a mut dyn Console,
    pub(crate) tracer: Box<dyn Tracer + 'a>,
}

impl<'a> Ins8070Interpreter<'a> {
    pub fn new(
        disk: &'a mut dyn Disk,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        console: &'a mut dyn Console,
    ) -> Ins8070Interpreter<'a> {
        Ins8070Interpreter {
            state: ProcessorState::new(),
            bus: Bus::new(disk, input, sound),
            console,
            tracer: Box::new(NullTracer),
        }
    }

    /// replace the default no-op tracer
    pub fn with_tracer(mut self, tracer: impl Tracer + 'a) -> Self {
        self.tracer = Box::new(tracer);
        self
    }

    /// load a raw image at 0x0000
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        let len = self.bus.memory_mut().load_program(reader)?;
        log::info!("loaded {} byte program", len);
        Ok(len)
    }

    pub fn reset(&mut self) {
        log::debug!("reset");
        self.state.reset();
    }

    /// external interrupt; taken before the next fetch if enabled
    pub fn raise_interrupt(&mut self) {
        self.state.irq = true;
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }

    /// the guest ran the exit opcode
    pub fn exit_requested(&self) -> bool {
        self.console.exit_requested()
    }

    pub fn state(&self) -> &ProcessorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ProcessorState {
        &mut self.state
    }

    pub fn memory(&self) -> &AddressSpace {
        self.bus.memory()
    }

    pub fn memory_mut(&mut self) -> &mut AddressSpace {
        self.bus.memory_mut()
    }

    /// Run whole instructions until `budget` host units are used up or the CPU
    /// halts. Returns 0 when halted, otherwise how far the last instruction
    /// ran past the budget, in host units.
    pub fn execute(&mut self, budget: i64) -> i64 {
        let budget = budget >> UNITS_PER_CYCLE_SHIFT;
        let mut cycles: i64 = 0;
        loop {
            cycles += self.service_interrupt();
            if self.state.halted {
                return 0;
            }
            let tracing = self.tracer.is_active();
            if tracing {
                self.bus.begin_record(self.state.pc());
            }
            let op = self.fetch();
            cycles += DISPATCH[usize::from(op)](self, op);
            if tracing {
                if let Some(mut record) = self.bus.take_record() {
                    record.capture(&self.state);
                    self.tracer.record(record);
                }
            }
            cycles += cycles::cost(op);
            if self.state.halted || cycles >= budget {
                break;
            }
        }
        if self.state.halted {
            0
        } else {
            (cycles - budget) << UNITS_PER_CYCLE_SHIFT
        }
    }

    /// take a pending interrupt if enabled; returns the cycles it cost
    fn service_interrupt(&mut self) -> i64 {
        if !(self.state.irq && self.state.flag(MIE)) {
            return 0;
        }
        self.state.irq = false;
        self.state.halted = false;
        self.state.set_flag(MIE, false);
        let pc = self.state.pc();
        self.push_word(pc);
        self.state.p[PC] = INTERRUPT_VECTOR;
        log::debug!("interrupt taken at {:04x}", pc);
        INTERRUPT_CYCLES
    }

    /// Drive the guest at `FRAMES_PER_SECOND`: each frame takes an interrupt,
    /// runs `frame_budget` host units (less last frame's overrun) and shows
    /// the framebuffer. Returns when the user quits, the guest exits, or the
    /// guest halts with interrupts off.
    pub fn main_loop(&mut self, display: &mut dyn Display, frame_budget: i64) -> Result<()> {
        let expected = display.get_display_size_bytes();
        if expected != FRAMEBUFFER_BYTES {
            return Err(Error::DisplaySize {
                expected,
                actual: FRAMEBUFFER_BYTES,
            });
        }
        let frame = Duration::from_secs(1) / FRAMES_PER_SECOND;
        let mut overrun = 0;
        loop {
            let start = Instant::now();
            self.bus.input_mut().poll()?;
            if self.bus.input_mut().quit_requested() || self.exit_requested() {
                break;
            }
            if self.state.halted && !self.state.flag(MIE) {
                log::info!("halted with interrupts disabled at {:04x}", self.state.pc());
                break;
            }
            self.raise_interrupt();
            overrun = self.execute(frame_budget - overrun);
            self.bus.sound_mut().end_frame();
            display.draw(self.memory().framebuffer())?;
            if let Some(rest) = frame.checked_sub(start.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }
        Ok(())
    }

    // instruction stream and stack helpers used by the opcode handlers

    /// byte at P0, then P0 += 1
    #[inline]
    pub(crate) fn fetch(&mut self) -> u8 {
        let pc = self.state.p[PC];
        self.state.p[PC] = pc.wrapping_add(1);
        self.bus.fetch(pc)
    }

    /// little-endian immediate word
    pub(crate) fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch();
        let hi = self.fetch();
        crate::memory::le_word(lo, hi)
    }

    /// effective address for a memory-operand opcode
    pub(crate) fn ea(&mut self, op: u8) -> u16 {
        let mode = AddressingMode::decode(op);
        if mode == AddressingMode::Immediate {
            return 0;
        }
        let disp = self.fetch();
        addressing::effective_address(mode, &mut self.state, disp)
    }

    pub(crate) fn push_word(&mut self, v: u16) {
        let sp = self.state.p[SP].wrapping_sub(2);
        self.state.p[SP] = sp;
        self.bus.st2(sp, v);
    }

    pub(crate) fn pop_word(&mut self) -> u16 {
        let sp = self.state.p[SP];
        let v = self.bus.ld2(sp);
        self.state.p[SP] = sp.wrapping_add(2);
        v
    }

    pub(crate) fn push_byte(&mut self, v: u8) {
        let sp = self.state.p[SP].wrapping_sub(1);
        self.state.p[SP] = sp;
        self.bus.st1(sp, v);
    }

    pub(crate) fn pop_byte(&mut self) -> u8 {
        let sp = self.state.p[SP];
        let v = self.bus.ld1(sp);
        self.state.p[SP] = sp.wrapping_add(1);
        v
    }

    /// when taken, P0 = P[op & 3] + disp, with P0 read after the disp byte;
    /// otherwise skip the disp byte
    pub(crate) fn branch(&mut self, op: u8, taken: bool) {
        if taken {
            let disp = self.fetch() as i8;
            self.state.p[PC] = self.state.p[usize::from(op & 3)].wrapping_add(disp as u16);
        } else {
            self.state.p[PC] = self.state.p[PC].wrapping_add(1);
        }
    }
}
