use crate::error::{Error, Result};
use std::io;

// NB. addresses are u16 as per the INS8070; lengths are usize to stop endless casting

/// size of the flat address space
pub const ADDRESS_SPACE_SIZE: usize = 0x10000;

/// guest framebuffer: 128x64 pixels, packed R,G,B
pub const FRAMEBUFFER_ADDR: u16 = 0x8000;
pub const FRAMEBUFFER_WIDTH: usize = 128;
pub const FRAMEBUFFER_HEIGHT: usize = 64;
pub const FRAMEBUFFER_BYTES: usize = FRAMEBUFFER_WIDTH * FRAMEBUFFER_HEIGHT * 3;

/// where a program image is loaded
pub const PROGRAM_ADDR: u16 = 0x0000;

/// assemble a little-endian word
#[inline]
pub fn le_word(lo: u8, hi: u8) -> u16 {
    u16::from(lo) | (u16::from(hi) << 8)
}

/// split a word into its little-endian byte pair (lo, hi)
#[inline]
pub fn le_bytes(word: u16) -> (u8, u8) {
    (word as u8, (word >> 8) as u8)
}

/// Represents the memory map seen by the CPU. Accesses here never touch the
/// I/O ports; see `bus` for that.
pub trait MemoryMap {
    /// write unknown len of data into memory at a particular address
    fn write_any(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<usize> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        if usize::from(addr) + len > ADDRESS_SPACE_SIZE {
            return Err(Error::ProgramTooLarge(usize::from(addr) + len));
        }
        self.write(buf.as_slice(), addr);
        Ok(len)
    }

    /// write a chunk of bytes into "RAM"; must not run past the top of memory
    fn write(&mut self, data: &[u8], addr: u16) {
        self.get_rw_slice(addr, data.len()).copy_from_slice(data);
    }

    fn read_byte(&self, addr: u16) -> u8;

    fn write_byte(&mut self, addr: u16, value: u8);

    /// get a little-endian word; the high byte wraps round to 0x0000
    fn read_word(&self, addr: u16) -> u16 {
        le_word(self.read_byte(addr), self.read_byte(addr.wrapping_add(1)))
    }

    /// put a little-endian word
    fn write_word(&mut self, addr: u16, value: u16) {
        let (lo, hi) = le_bytes(value);
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];
}

/// The full 64K of the INS8070 bus as flat RAM.
///
///   0x0000-0x001f  reset/interrupt entry, start of program image
///   0x0020-0x003f  call vectors (CALL 0-15)
///   0x8000-0xdfff  framebuffer, 128x64x3
///   0xfe00-0xfe05  I/O ports (only byte accesses are intercepted)
///   0xff00-0xffff  direct page
pub struct AddressSpace {
    bytes: Box<[u8]>,
}

impl MemoryMap for AddressSpace {
    #[inline]
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[usize::from(addr)]
    }
    #[inline]
    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[usize::from(addr)] = value;
    }
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = usize::from(addr);
        &mut self.bytes[a..(a + len)]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = usize::from(addr);
        &self.bytes[a..(a + len)]
    }
}

impl AddressSpace {
    /// zeroed 64K
    pub fn new() -> Self {
        AddressSpace {
            bytes: vec![0u8; ADDRESS_SPACE_SIZE].into_boxed_slice(),
        }
    }

    /// load a raw program image at 0x0000; no header, no relocation
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        self.write_any(reader, PROGRAM_ADDR)
    }

    /// the guest framebuffer, as read by the host display
    pub fn framebuffer(&self) -> &[u8] {
        self.get_ro_slice(FRAMEBUFFER_ADDR, FRAMEBUFFER_BYTES)
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = AddressSpace::new();
        assert_eq!(m.bytes.len(), ADDRESS_SPACE_SIZE);
        assert!(m.bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_any_data_ok() -> Result<()> {
        let mut dst = AddressSpace::new();
        let mut src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write_any(&mut src, 8)?, 8);
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_write_any_too_much() {
        let mut dst = AddressSpace::new();
        let mut src: &[u8] = &[0; 8];
        match dst.write_any(&mut src, 0xfffc) {
            Err(Error::ProgramTooLarge(n)) => assert_eq!(n, 0x10004),
            other => panic!("expected ProgramTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_read_word_little_endian() {
        let mut m = AddressSpace::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0);
        assert_eq!(m.read_word(0x4), 0x0504);
    }

    #[test]
    fn test_word_wraps_at_top_of_memory() {
        let mut m = AddressSpace::new();
        m.write_word(0xffff, 0xbeef);
        assert_eq!(m.read_byte(0xffff), 0xef);
        assert_eq!(m.read_byte(0x0000), 0xbe);
        assert_eq!(m.read_word(0xffff), 0xbeef);
    }

    #[test]
    fn test_le_helpers() {
        assert_eq!(le_word(0x34, 0x12), 0x1234);
        assert_eq!(le_bytes(0x1234), (0x34, 0x12));
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = AddressSpace::new();
        let mut prog: &[u8] = &[0xc4, 0x05];
        dst.load_program(&mut prog)?;
        assert_eq!(dst.get_ro_slice(0, 2), &[0xc4, 0x05]);
        Ok(())
    }

    #[test]
    fn test_framebuffer_layout() {
        let mut m = AddressSpace::new();
        m.write_byte(0xdfff, 0xff);
        let fb = m.framebuffer();
        assert_eq!(fb.len(), 0x6000);
        assert_eq!(fb[fb.len() - 1], 0xff);
    }
}
