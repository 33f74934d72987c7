use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crate::console::KeyQueue;
use crossterm::terminal;
use std::io;
use std::time::Duration;

/// cursor keys as the guest expects them
const KEY_RIGHT: u8 = 28;
const KEY_LEFT: u8 = 29;
const KEY_UP: u8 = 30;
const KEY_DOWN: u8 = 31;

/// terminals only report presses, so a key counts as held for this many
/// frames after its last (auto-repeated) press
const KEY_HOLD_FRAMES: u32 = 6;

/// reads keypresses
pub trait Input {
    /// key currently held, as read by the guest at 0xfe01; 0 for none
    fn key_code(&mut self) -> u8;

    /// pick up whatever the host has for us; called once a frame
    fn poll(&mut self) -> Result<(), io::Error> {
        Ok(())
    }

    /// the user asked to leave the emulator
    fn quit_requested(&self) -> bool {
        false
    }
}

/// map a terminal key to the guest's key code
pub fn map_key(code: KeyCode) -> Option<u8> {
    match code {
        KeyCode::Right => Some(KEY_RIGHT),
        KeyCode::Left => Some(KEY_LEFT),
        KeyCode::Up => Some(KEY_UP),
        KeyCode::Down => Some(KEY_DOWN),
        KeyCode::Enter => Some(b'\r'),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Tab => Some(b'\t'),
        KeyCode::Char(c) if c.is_ascii() => Some(c as u8),
        _ => None,
    }
}

/// keyboard in a raw-mode terminal, via crossterm
pub struct StdinInput {
    code: u8,
    hold: u32,
    quit: bool,
    /// every mapped press is also queued here for the console
    typed: Option<KeyQueue>,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput::detached())
    }

    fn detached() -> Self {
        StdinInput {
            code: 0,
            hold: 0,
            quit: false,
            typed: None,
        }
    }

    /// share presses with a console's getc
    pub fn with_key_queue(mut self, keys: KeyQueue) -> Self {
        self.typed = Some(keys);
        self
    }

    fn press(&mut self, evt: KeyEvent) {
        match evt.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true
            }
            code => match map_key(code) {
                Some(mapped_key) => {
                    self.code = mapped_key;
                    self.hold = KEY_HOLD_FRAMES;
                    if let Some(keys) = &self.typed {
                        keys.borrow_mut().push_back(mapped_key);
                    }
                }
                None => {
                    log::warn!("can't map {:?} to a guest key", code);
                }
            },
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("failed to leave raw mode: {}", e);
        }
    }
}

impl Input for StdinInput {
    fn key_code(&mut self) -> u8 {
        self.code
    }

    fn poll(&mut self) -> Result<(), io::Error> {
        let mut pressed = false;
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                self.press(evt);
                pressed = true;
            }
        }
        if !pressed {
            self.hold = self.hold.saturating_sub(1);
            if self.hold == 0 {
                self.code = 0;
            }
        }
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing and headless runs
pub struct DummyInput {
    code: u8,
}

impl DummyInput {
    pub fn new(code: u8) -> Self {
        DummyInput { code }
    }

    pub fn press(&mut self, code: u8) {
        self.code = code;
    }
}

impl Input for DummyInput {
    fn key_code(&mut self) -> u8 {
        self.code
    }
}
