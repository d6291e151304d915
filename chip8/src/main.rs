use std::path::PathBuf;

use clap::Parser;

use chip8vm_core::{DEFAULT_CYCLES_PER_FRAME, TIMER_HZ};

mod keymap;
mod run;

/// Runs a Chip-8 program in a window
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the ROM to run
    rom: PathBuf,

    /// Instructions executed per frame
    #[arg(short, long, default_value_t = DEFAULT_CYCLES_PER_FRAME)]
    cycles_per_frame: u32,

    /// Frames per second; timers tick once per frame
    #[arg(short, long, default_value_t = TIMER_HZ)]
    fps: u32,

    /// Window pixels per Chip-8 pixel
    #[arg(short, long, default_value_t = 15)]
    scale: u32,

    /// Seed for the RND instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Stop on the first bad instruction instead of logging it and carrying on
    #[arg(long)]
    halt_on_error: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    run::run(run::Settings {
        rom: args.rom,
        cycles_per_frame: args.cycles_per_frame,
        fps: args.fps,
        scale: args.scale,
        seed: args.seed,
        halt_on_error: args.halt_on_error,
    })
}
