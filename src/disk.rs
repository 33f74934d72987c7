use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// bytes per logical block
pub const SECTOR_SIZE: u64 = 512;

/// what a read past the end of the image returns (EOF as a byte)
const END_OF_IMAGE: u8 = 0xff;

/// Block device behind ports 0xfe00-0xfe02. The guest sets a logical block
/// address then streams bytes from it.
pub trait Disk {
    /// move the read cursor to the start of `sector`
    fn seek(&mut self, sector: u32);

    /// next byte at the cursor, advancing it
    fn read_byte(&mut self) -> u8;
}

/// disk image backed by anything seekable; a `File` in the emulator,
/// a `Cursor` in tests
pub struct ImageDisk<R: Read + Seek> {
    image: R,
}

impl<R: Read + Seek> ImageDisk<R> {
    pub fn new(image: R) -> Self {
        ImageDisk { image }
    }
}

impl ImageDisk<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        Ok(ImageDisk::new(File::open(path)?))
    }
}

impl<R: Read + Seek> Disk for ImageDisk<R> {
    fn seek(&mut self, sector: u32) {
        let offset = u64::from(sector) * SECTOR_SIZE;
        log::debug!("disk seek to sector {} (offset 0x{:x})", sector, offset);
        if let Err(e) = self.image.seek(SeekFrom::Start(offset)) {
            log::warn!("disk seek to sector {} failed: {}", sector, e);
        }
    }

    fn read_byte(&mut self) -> u8 {
        let mut b = [0u8; 1];
        match self.image.read(&mut b) {
            Ok(1) => b[0],
            Ok(_) => END_OF_IMAGE,
            Err(e) => {
                log::warn!("disk read failed: {}", e);
                END_OF_IMAGE
            }
        }
    }
}

/// no image attached; reads as zero
pub struct NoDisk;

impl Disk for NoDisk {
    fn seek(&mut self, _sector: u32) {}

    fn read_byte(&mut self) -> u8 {
        0
    }
}
