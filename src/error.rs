use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// image does not fit in the 64K address space
    #[error("program image is {0} bytes; the address space holds 65536")]
    ProgramTooLarge(usize),
    /// display wants a different amount of pixel data than the framebuffer holds
    #[error("display expects {expected} bytes per frame; the framebuffer is {actual}")]
    DisplaySize { expected: usize, actual: usize },
}
