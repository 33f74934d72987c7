//! # emu8070
//!
//! National Semiconductor INS8070 (SC/MP III) emulator core, plus the host
//! devices it needs to run a guest program in a terminal.
//!
//! ## Design
//!
//! * whole-instruction stepping against a cycle budget; the overrun from one
//!   call is carried into the next so the long-run clock rate is right
//! * host time units are four to a machine cycle
//! * 256-entry dispatch table of handler functions; memory-operand families
//!   share a handler across addressing modes
//! * the CPU only sees a 64K bus; six byte-wide ports at 0xfe00 go to the disk,
//!   keyboard and sound devices
//! * devices behind traits so the interpreter doesn't know what's on the other
//!   side (terminal, dummy, test spy)
//! * guest framebuffer is plain memory at 0x8000, drawn by the host each frame
//!
//! Model
//!
//! main
//!  |-- config, disk, input, sound, console, display, tracer
//!  |-- interpreter(disk, input, sound, console).with_tracer(tracer)
//!  |    |-- bus(memory, disk, input, sound)
//!  |    `-- processor state
//!  `-- main loop, every 1/60 s
//!       |-- poll input; stop on quit, exit or a wedged CPU
//!       |-- raise interrupt
//!       |-- overrun = execute(frame budget - overrun)
//!       |-- draw framebuffer
//!       `-- sleep out the frame
pub mod addressing;
pub mod alu;
pub mod bus;
pub mod config;
pub mod console;
pub mod cycles;
pub mod disk;
pub mod display;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod memory;
mod opcodes;
pub mod sound;
pub mod state;
pub mod trace;

pub use error::{Error, Result};
pub use interpreter::Ins8070Interpreter;
pub use state::ProcessorState;
