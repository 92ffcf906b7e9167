use std::io;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use crossterm::event::{self, Event, KeyCode};
use log::{error, info};

use crate::constants::*;
use crate::game::{Controls, Game};
use crate::rendering::{FrameBuffer, OutputTarget};
use crate::terminal_io::{KeyboardState, SimulatedInput};

const FRAME_DURATION: Duration = Duration::from_micros(16_667);

pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
    pub max_frames: Option<u64>,
    pub debug: bool,
}

/// Host runtime: owns the game, the pixel buffer and the terminal, and drives
/// `act`/`draw` once per frame.
pub struct App {
    game: Game,
    frame: FrameBuffer,
    output: OutputTarget,
    keyboard: KeyboardState,
    simulated_input: Option<SimulatedInput>,
    terminal_size: (u16, u16),
    max_frames: Option<u64>,
    debug: bool,
    running: bool,
    frame_count: u64,
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

impl App {
    pub fn initialize(
        settings: Settings,
        output: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        terminal_size: (u16, u16),
    ) -> Self {
        let seed = settings.seed.unwrap_or_else(clock_seed);
        info!(
            "Initializing {}x{} game with seed {} (debug: {})",
            settings.width, settings.height, seed, settings.debug
        );
        App {
            game: Game::with_seed(settings.width, settings.height, seed),
            frame: FrameBuffer::new(settings.width, settings.height),
            output,
            keyboard: KeyboardState::new(),
            simulated_input,
            terminal_size,
            max_frames: settings.max_frames,
            debug: settings.debug,
            running: true,
            frame_count: 0,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Polls the held keys and advances the simulation by `dt` seconds.
    pub fn act(&mut self, dt: f64) {
        if self.keyboard.is_key_pressed(KeyCode::Esc) || self.keyboard.is_key_pressed(KeyCode::Char('q')) {
            if self.running {
                info!("Quit key pressed. Exiting game loop.");
            }
            self.running = false;
        }

        let controls = Controls {
            rotate: self.keyboard.is_key_pressed(KeyCode::Char(' ')),
            reset: self.keyboard.is_key_pressed(KeyCode::Char('r')),
        };
        self.game.handle_input(controls);
        self.game.update(dt);
    }

    pub fn draw(&mut self) -> io::Result<()> {
        self.game.render(&mut self.frame);
        if self.debug {
            let game = self.game();
            info!(
                "Frame {}: phase {:?}, score {}, enemies {}, bonuses {}, particles {}, angle {:.2}, background {:#010X}",
                self.frame_count,
                game.phase(),
                game.score(),
                game.enemy_count(),
                game.bonus_count(),
                game.particle_count(),
                game.player().angle,
                game.background()
            );
        }
        let (cols, rows) = self.terminal_size;
        self.output
            .present(&self.frame, cols, rows)
            .map_err(|e| { error!("Failed to present frame: {}", e); e })
    }

    pub fn finalize(&self) {
        info!(
            "Shutting down after {} frames. Score: {}, game over: {}",
            self.frame_count,
            self.game.score(),
            self.game.is_game_over()
        );
    }

    fn pump_events(&mut self) -> io::Result<()> {
        if let Some(input) = &mut self.simulated_input {
            for event in input.take(self.frame_count) {
                self.apply_event(event);
            }
            return Ok(());
        }

        while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            let event = event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?;
            self.apply_event(event);
        }
        Ok(())
    }

    fn apply_event(&mut self, event: Event) {
        match event {
            Event::Key(key_event) => self.keyboard.handle_key(key_event),
            Event::Resize(cols, rows) => {
                info!("Terminal resized to {}x{}", cols, rows);
                self.terminal_size = (cols, rows);
            }
            _ => {}
        }
    }

    fn frames_remaining(&self) -> bool {
        self.max_frames.is_none_or(|max| self.frame_count < max)
    }

    /// Fixed-step loop. Debug runs advance exactly one step per frame.
    pub fn run(&mut self) -> io::Result<()> {
        let mut accumulator = 0.0;
        let mut last_frame = Instant::now();

        while self.is_running() && self.frames_remaining() {
            let frame_start = Instant::now();
            self.pump_events()?;

            if self.debug {
                self.act(SIM_DT);
            } else {
                accumulator += frame_start.duration_since(last_frame).as_secs_f64();
                last_frame = frame_start;
                let mut steps = 0;
                while accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
                    self.act(SIM_DT);
                    accumulator -= SIM_DT;
                    steps += 1;
                }
                if steps == MAX_SUBSTEPS {
                    accumulator = 0.0;
                }
            }

            if !self.debug || self.frame_count % DEBUG_SNAPSHOT_INTERVAL == 0 {
                self.draw()?;
            }

            self.keyboard.next_frame();
            self.frame_count += 1;

            if !self.debug {
                thread::sleep(FRAME_DURATION.saturating_sub(frame_start.elapsed()));
            }
        }

        self.finalize();
        Ok(())
    }
}
