use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};

use clap::Parser;

use emu8070::config::Config;
use emu8070::console::{key_queue, BufferConsole, Console, StdConsole};
use emu8070::disk::{Disk, ImageDisk, NoDisk};
use emu8070::display::{ColourTermDisplay, Display, DummyDisplay};
use emu8070::input::{DummyInput, Input, StdinInput};
use emu8070::interpreter::{Ins8070Interpreter, FRAMES_PER_SECOND};
use emu8070::memory::{FRAMEBUFFER_HEIGHT, FRAMEBUFFER_WIDTH};
use emu8070::sound::{Mute, SampleQueue, Sound};
use emu8070::trace::{TraceBuffer, TraceMode};

fn open_disk(config: &Config) -> Box<dyn Disk> {
    let path = match config.disk_path() {
        Some(path) => path,
        None => {
            log::warn!("no disk image given and $HOME is unset");
            return Box::new(NoDisk);
        }
    };
    match ImageDisk::open(&path) {
        Ok(disk) => {
            log::info!("disk image {}", path.display());
            Box::new(disk)
        }
        Err(e) => {
            log::warn!("disk image {} cannot open: {}", path.display(), e);
            Box::new(NoDisk)
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let config = Config::parse();

    // initialise
    let mut display: Box<dyn Display>;
    let mut input: Box<dyn Input>;
    let mut console: Box<dyn Console>;
    if config.headless {
        display = Box::new(DummyDisplay::new());
        input = Box::new(DummyInput::new(0));
        console = Box::new(StdConsole::new());
    } else {
        display = Box::new(ColourTermDisplay::new(FRAMEBUFFER_WIDTH, FRAMEBUFFER_HEIGHT)?);
        // getc reads the same key presses as the keyboard port
        let keys = key_queue();
        input = Box::new(StdinInput::new()?.with_key_queue(keys.clone()));
        console = Box::new(BufferConsole::with_keys(keys));
    }
    let mut sound: Box<dyn Sound> = if config.sound {
        Box::new(SampleQueue::new(FRAMES_PER_SECOND as usize))
    } else {
        Box::new(Mute::new())
    };
    let mut disk = open_disk(&config);
    let mut trace = config.trace.map(|n| {
        let mode = if config.single_pass {
            TraceMode::SinglePass
        } else {
            TraceMode::Wrap
        };
        TraceBuffer::new(n, mode)
    });

    {
        let mut interpreter =
            Ins8070Interpreter::new(&mut *disk, &mut *input, &mut *sound, &mut *console);
        if let Some(buf) = trace.as_mut() {
            interpreter = interpreter.with_tracer(buf);
        }

        // load a program
        let mut f = File::open(&config.program)?;
        interpreter.load_program(&mut f)?;
        interpreter.reset();
        interpreter.main_loop(&mut *display, config.frame_budget())?;
    }

    if let Some(buf) = trace {
        let mut out = BufWriter::new(File::create(&config.trace_file)?);
        buf.write_to(&mut out)?;
        out.flush()?;
        log::info!(
            "wrote {} trace records to {}",
            buf.len(),
            config.trace_file.display()
        );
    }

    if !config.headless {
        // leave the prompt below the last frame
        drop(input);
        println!();
    }
    Ok(())
}
