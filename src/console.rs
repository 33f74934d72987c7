use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;

/// Character console for the emulator-only opcodes (getc 0x02, putc 0x03)
/// and the exit request (0x04).
pub trait Console {
    fn getc(&mut self) -> u8;

    fn putc(&mut self, c: u8);

    /// guest wants the session over
    fn request_exit(&mut self);

    fn exit_requested(&self) -> bool;
}

/// console on the process's stdin/stdout; input is folded to upper case and
/// LF becomes CR
pub struct StdConsole {
    exit: bool,
}

impl StdConsole {
    pub fn new() -> Self {
        StdConsole { exit: false }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

/// what the guest sees for a byte typed on the host
pub fn fold_input(c: u8) -> u8 {
    match c {
        b'\n' => b'\r',
        c => c.to_ascii_uppercase(),
    }
}

impl Console for StdConsole {
    fn getc(&mut self) -> u8 {
        let mut b = [0u8; 1];
        match io::stdin().read(&mut b) {
            Ok(1) => fold_input(b[0]),
            Ok(_) => 0xff,
            Err(e) => {
                log::warn!("console read failed: {}", e);
                0xff
            }
        }
    }

    fn putc(&mut self, c: u8) {
        let mut out = io::stdout();
        if let Err(e) = out.write_all(&[c]).and_then(|_| out.flush()) {
            log::warn!("console write failed: {}", e);
        }
    }

    fn request_exit(&mut self) {
        self.exit = true;
    }

    fn exit_requested(&self) -> bool {
        self.exit
    }
}

/// Keys typed on the host, shared between the keyboard reader and the
/// console so guest getc sees the same presses as the 0xfe01 port.
pub type KeyQueue = Rc<RefCell<VecDeque<u8>>>;

pub fn key_queue() -> KeyQueue {
    Rc::new(RefCell::new(VecDeque::new()))
}

/// Console that owns no terminal. Input comes from a `KeyQueue` (0 when it
/// is empty; getc never blocks the frame loop). Output is logged a line at
/// a time. Used under the TUI display and in tests.
pub struct BufferConsole {
    keys: KeyQueue,
    line: Vec<u8>,
    lines: usize,
    exit: bool,
}

impl BufferConsole {
    pub fn new(input: &[u8]) -> Self {
        let keys = key_queue();
        keys.borrow_mut().extend(input.iter().copied());
        BufferConsole::with_keys(keys)
    }

    pub fn with_keys(keys: KeyQueue) -> Self {
        BufferConsole {
            keys,
            line: Vec::new(),
            lines: 0,
            exit: false,
        }
    }

    /// output since the last line end
    pub fn pending(&self) -> &[u8] {
        &self.line
    }

    /// complete lines logged so far
    pub fn lines(&self) -> usize {
        self.lines
    }
}

impl Console for BufferConsole {
    fn getc(&mut self) -> u8 {
        self.keys.borrow_mut().pop_front().map(fold_input).unwrap_or(0)
    }

    fn putc(&mut self, c: u8) {
        if c == b'\r' || c == b'\n' {
            log::info!("guest: {}", String::from_utf8_lossy(&self.line));
            self.line.clear();
            self.lines += 1;
        } else {
            self.line.push(c);
        }
    }

    fn request_exit(&mut self) {
        self.exit = true;
    }

    fn exit_requested(&self) -> bool {
        self.exit
    }
}
