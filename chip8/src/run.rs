use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use log::{info, warn};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use chip8vm_core::Chip8;
use display::Display;

use crate::keymap::keymap;

/// Settings for a single run, collected from the command line
pub struct Settings {
    pub rom: PathBuf,
    pub cycles_per_frame: u32,
    pub fps: u32,
    pub scale: u32,
    pub seed: Option<u64>,
    pub halt_on_error: bool,
}

pub fn run(settings: Settings) -> anyhow::Result<()> {
    // Load ROM
    let file = File::open(&settings.rom)
        .with_context(|| format!("unable to open {}", settings.rom.display()))?;
    let mut reader = BufReader::new(file);
    let mut chip8 = Chip8::from_reader(&mut reader, settings.seed)
        .with_context(|| format!("unable to load {}", settings.rom.display()))?;
    info!("loaded {}", settings.rom.display());

    // Get SDL2 context
    let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut display = Display::new(&sdl, "Chip-8", settings.scale).map_err(|e| anyhow!(e))?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;

    // Set initial timing
    let frame_time = Duration::from_secs(1) / settings.fps.max(1);
    let mut errors: u64 = 0;
    let mut frames: u64 = 0;

    'event: loop {
        let frame_start = Instant::now();

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_press(kc)
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_release(kc)
                    }
                }
                _ => continue,
            };
        }

        // Update state
        for _ in 0..settings.cycles_per_frame {
            if let Err(e) = chip8.step() {
                errors += 1;
                if settings.halt_on_error {
                    bail!("halted after {} frames: {}", frames, e);
                }
                warn!("{}", e);
            }
        }

        // If the frame changed, render it
        if let Some(frame) = chip8.take_frame() {
            display.render(&frame).map_err(|e| anyhow!(e))?;
        }

        // Handle timing
        let elapsed = frame_start.elapsed();
        if frame_time > elapsed {
            std::thread::sleep(frame_time - elapsed);
        }
        chip8.tick_timers();
        frames += 1;
    }

    info!("exiting after {} frames with {} step errors", frames, errors);
    Ok(())
}
