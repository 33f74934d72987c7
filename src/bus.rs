//! Load/store path between the CPU and the address space.
//!
//! Byte accesses to 0xfe00-0xfe05 go to the host devices instead of RAM:
//!
//!   addr    write                     read
//!   0xfe00  LBA bits 0-7              next disk byte
//!   0xfe01  LBA bits 8-15             keyboard code
//!   0xfe02  LBA bits 16-23, seek      1 if the sample queue is full
//!   0xfe04  sample bits 0-7           (RAM)
//!   0xfe05  sample bits 8-15, queue   (RAM)
//!
//! Word accesses and instruction fetches always hit RAM.
use crate::disk::Disk;
use crate::input::Input;
use crate::memory::{AddressSpace, MemoryMap};
use crate::sound::Sound;
use crate::trace::{AccessKind, TraceRecord};

pub const PORT_DISK: u16 = 0xfe00;
pub const PORT_KEYBOARD: u16 = 0xfe01;
pub const PORT_SOUND_FULL: u16 = 0xfe02;
pub const PORT_LBA_LO: u16 = 0xfe00;
pub const PORT_LBA_MID: u16 = 0xfe01;
pub const PORT_LBA_HI: u16 = 0xfe02;
pub const PORT_SAMPLE_LO: u16 = 0xfe04;
pub const PORT_SAMPLE_HI: u16 = 0xfe05;

pub struct Bus<'a> {
    memory: AddressSpace,
    disk: &'a mut dyn Disk,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    /// logical block address being assembled
    lba: u32,
    /// audio sample being assembled
    sample: u16,
    /// in-flight trace record, when tracing
    record: Option<TraceRecord>,
}

impl<'a> Bus<'a> {
    pub fn new(
        disk: &'a mut dyn Disk,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        Bus {
            memory: AddressSpace::new(),
            disk,
            input,
            sound,
            lba: 0,
            sample: 0,
            record: None,
        }
    }

    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut AddressSpace {
        &mut self.memory
    }

    pub fn input_mut(&mut self) -> &mut dyn Input {
        &mut *self.input
    }

    pub fn sound_mut(&mut self) -> &mut dyn Sound {
        &mut *self.sound
    }

    /// instruction stream byte; RAM only
    #[inline]
    pub fn fetch(&mut self, addr: u16) -> u8 {
        let b = self.memory.read_byte(addr);
        if let Some(r) = self.record.as_mut() {
            r.push_op(b);
        }
        b
    }

    pub fn ld1(&mut self, addr: u16) -> u8 {
        let data = match addr {
            PORT_DISK => self.disk.read_byte(),
            PORT_KEYBOARD => self.input.key_code(),
            PORT_SOUND_FULL => u8::from(self.sound.is_full()),
            _ => self.memory.read_byte(addr),
        };
        self.log(addr, u16::from(data), AccessKind::LoadByte);
        data
    }

    pub fn ld2(&mut self, addr: u16) -> u16 {
        let data = self.memory.read_word(addr);
        self.log(addr, data, AccessKind::LoadWord);
        data
    }

    pub fn st1(&mut self, addr: u16, data: u8) {
        match addr {
            PORT_LBA_LO => self.lba = u32::from(data),
            PORT_LBA_MID => self.lba |= u32::from(data) << 8,
            PORT_LBA_HI => {
                self.lba |= u32::from(data) << 16;
                self.disk.seek(self.lba);
            }
            PORT_SAMPLE_LO => self.sample = u16::from(data),
            PORT_SAMPLE_HI => {
                self.sample |= u16::from(data) << 8;
                self.sound.put_sample(self.sample as i16);
            }
            _ => self.memory.write_byte(addr, data),
        }
        self.log(addr, u16::from(data), AccessKind::StoreByte);
    }

    pub fn st2(&mut self, addr: u16, data: u16) {
        self.memory.write_word(addr, data);
        self.log(addr, data, AccessKind::StoreWord);
    }

    /// start collecting accesses for the instruction at `pc`
    pub fn begin_record(&mut self, pc: u16) {
        self.record = Some(TraceRecord::new(pc));
    }

    pub fn take_record(&mut self) -> Option<TraceRecord> {
        self.record.take()
    }

    #[inline]
    fn log(&mut self, addr: u16, value: u16, kind: AccessKind) {
        if let Some(r) = self.record.as_mut() {
            r.push_access(addr, value, kind);
        }
    }
}
