mod app;
mod constants;
mod entities;
mod game;
mod rendering;
mod terminal_io;
mod types;

use std::io::{self, Write};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{error, info, LevelFilter};

use crate::app::{App, Settings};
use crate::constants::*;
use crate::rendering::{OutputTarget, ScreenBuffer};
use crate::terminal_io::SimulatedInput;

#[derive(Parser, Debug)]
#[command(name = "twin-orbit")]
#[command(about = "Steer two orbiting spheres past enemies and into bonuses, in your terminal")]
struct Args {
    /// Width of the pixel buffer
    #[arg(long, default_value_t = DEFAULT_SCREEN_WIDTH, value_parser = parse_dimension)]
    width: u32,

    /// Height of the pixel buffer
    #[arg(long, default_value_t = DEFAULT_SCREEN_HEIGHT, value_parser = parse_dimension)]
    height: u32,

    /// Run headless with scripted input, dumping frames to the log
    #[arg(long)]
    debug: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Fixed RNG seed instead of the wall clock
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "twin-orbit.log")]
    log_file: String,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn parse_dimension(value: &str) -> Result<u32, String> {
    let pixels: u32 = value.parse().map_err(|e| format!("{value} is not a pixel count: {e}"))?;
    if pixels < MIN_SCREEN_SIZE {
        return Err(format!("must be at least {MIN_SCREEN_SIZE} pixels"));
    }
    Ok(pixels)
}

// Undoes terminal setup on drop. Built as soon as raw mode is on so a failed
// setup step still restores the terminal.
struct TerminalGuard<W: Write> {
    out: W,
    keyboard_enhanced: bool,
}

impl TerminalGuard<io::Stdout> {
    fn enter() -> io::Result<Self> {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        let mut guard = TerminalGuard::new(io::stdout());
        // Release events make held keys exact; without them KeyboardState times key repeats.
        guard.prepare(supports_keyboard_enhancement().unwrap_or(false))?;
        info!("Terminal ready (key release events: {}).", guard.keyboard_enhanced);
        Ok(guard)
    }
}

impl<W: Write> TerminalGuard<W> {
    fn new(out: W) -> Self {
        TerminalGuard { out, keyboard_enhanced: false }
    }

    fn prepare(&mut self, keyboard_enhancement: bool) -> io::Result<()> {
        execute!(self.out, EnterAlternateScreen, Hide)
            .map_err(|e| { error!("Failed to prepare screen: {}", e); e })?;
        if keyboard_enhancement {
            execute!(self.out, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
                .map_err(|e| { error!("Failed to enable key release events: {}", e); e })?;
            self.keyboard_enhanced = true;
        }
        Ok(())
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = execute!(self.out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = self.out.flush();
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", e);
        }
        info!("Terminal restored.");
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    simple_logging::log_to_file(&args.log_file, args.log_level)?;
    info!("Starting twin-orbit: {:?}", args);

    let settings = Settings {
        width: args.width,
        height: args.height,
        seed: args.seed,
        max_frames: args.frames.or(args.debug.then_some(DEFAULT_DEBUG_FRAMES)),
        debug: args.debug,
    };

    if args.debug {
        info!("Debug mode enabled.");
        let output = OutputTarget::ScreenBuffer(ScreenBuffer::new(DEBUG_COLS, DEBUG_ROWS));
        let mut app = App::initialize(settings, output, Some(SimulatedInput::demo()), (DEBUG_COLS, DEBUG_ROWS));
        return app.run();
    }

    let terminal_size = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", terminal_size.0, terminal_size.1);

    let _guard = TerminalGuard::enter()?;
    let mut app = App::initialize(settings, OutputTarget::Stdout(io::stdout()), None, terminal_size);
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingTerminal {
        written: Rc<RefCell<Vec<u8>>>,
        broken: Rc<Cell<bool>>,
    }

    impl RecordingTerminal {
        fn output(&self) -> String {
            String::from_utf8_lossy(&self.written.borrow()).into_owned()
        }
    }

    impl Write for RecordingTerminal {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.broken.get() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"));
            }
            self.written.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const SHOW_CURSOR: &str = "\x1b[?25h";
    const LEAVE_ALTERNATE_SCREEN: &str = "\x1b[?1049l";
    const POP_KEYBOARD_FLAGS: &str = "\x1b[<1u";

    #[test]
    fn test_failed_setup_still_restores_terminal() {
        let terminal = RecordingTerminal::default();
        terminal.broken.set(true);
        let mut guard = TerminalGuard::new(terminal.clone());
        assert!(guard.prepare(true).is_err());
        assert!(!guard.keyboard_enhanced);

        terminal.broken.set(false);
        drop(guard);
        let output = terminal.output();
        assert!(output.contains(SHOW_CURSOR));
        assert!(output.contains(LEAVE_ALTERNATE_SCREEN));
        assert!(!output.contains(POP_KEYBOARD_FLAGS));
    }

    #[test]
    fn test_drop_pops_keyboard_flags_it_pushed() {
        let terminal = RecordingTerminal::default();
        let mut guard = TerminalGuard::new(terminal.clone());
        guard.prepare(true).unwrap();
        assert!(guard.keyboard_enhanced);
        drop(guard);
        let output = terminal.output();
        assert!(output.contains(POP_KEYBOARD_FLAGS));
        assert!(output.contains(LEAVE_ALTERNATE_SCREEN));
    }

    #[test]
    fn test_dimension_below_minimum_is_rejected() {
        assert!(parse_dimension("32").is_err());
        assert!(parse_dimension("wide").is_err());
        assert_eq!(parse_dimension("640"), Ok(640));
    }
}
