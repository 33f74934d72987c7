use std::path::PathBuf;

use clap::Parser;

use crate::interpreter::FRAMES_PER_SECOND;

/// disk image looked for in $HOME when --disk isn't given
pub const DEFAULT_DISK_IMAGE: &str = "fatmovie.dmg";

#[derive(Parser, Debug, Clone)]
#[command(name = "emu8070")]
#[command(about = "INS8070 emulator with a terminal framebuffer", long_about = None)]
pub struct Config {
    /// Raw program image, loaded at 0x0000
    pub program: PathBuf,

    /// Guest clock in MHz (budget units per frame scale with this)
    #[arg(short, long, default_value_t = 1000)]
    pub clock: u32,

    /// Queue guest audio samples instead of discarding them
    #[arg(short, long)]
    pub sound: bool,

    /// Disk image served on the LBA ports [default: $HOME/fatmovie.dmg]
    #[arg(long)]
    pub disk: Option<PathBuf>,

    /// No terminal display; the console uses stdin/stdout
    #[arg(long)]
    pub headless: bool,

    /// Keep the last N executed instructions and dump them on exit
    #[arg(long, value_name = "N")]
    pub trace: Option<usize>,

    /// Where the trace is written
    #[arg(long, default_value = "trace.txt")]
    pub trace_file: PathBuf,

    /// Stop tracing once the buffer fills instead of wrapping
    #[arg(long, requires = "trace")]
    pub single_pass: bool,
}

impl Config {
    /// host budget units per 1/60 s frame
    pub fn frame_budget(&self) -> i64 {
        1_000_000 / i64::from(FRAMES_PER_SECOND) * i64::from(self.clock)
    }

    /// --disk, or the default image under $HOME if there is one
    pub fn disk_path(&self) -> Option<PathBuf> {
        self.disk.clone().or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_DISK_IMAGE))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::parse_from(["emu8070", "a.out"]);
        assert_eq!(c.program, PathBuf::from("a.out"));
        assert_eq!(c.clock, 1000);
        assert!(!c.sound);
        assert!(!c.headless);
        assert_eq!(c.trace, None);
        assert_eq!(c.trace_file, PathBuf::from("trace.txt"));
    }

    #[test]
    fn test_frame_budget() {
        let c = Config::parse_from(["emu8070", "-c", "2", "a.out"]);
        assert_eq!(c.frame_budget(), 16_666 * 2);
        let c = Config::parse_from(["emu8070", "a.out"]);
        assert_eq!(c.frame_budget(), 16_666_000);
    }

    #[test]
    fn test_explicit_disk_wins() {
        let c = Config::parse_from(["emu8070", "--disk", "/tmp/x.img", "a.out"]);
        assert_eq!(c.disk_path(), Some(PathBuf::from("/tmp/x.img")));
    }

    #[test]
    fn test_trace_flags() {
        let c = Config::parse_from([
            "emu8070",
            "--trace",
            "100",
            "--single-pass",
            "--trace-file",
            "t.log",
            "a.out",
        ]);
        assert_eq!(c.trace, Some(100));
        assert!(c.single_pass);
        assert_eq!(c.trace_file, PathBuf::from("t.log"));
    }

    #[test]
    fn test_single_pass_needs_trace() {
        assert!(Config::try_parse_from(["emu8070", "--single-pass", "a.out"]).is_err());
    }

    #[test]
    fn test_program_required() {
        assert!(Config::try_parse_from(["emu8070"]).is_err());
    }
}
