use std::{
    io::{self, Write},
    path::PathBuf,
    thread,
    time::Instant,
};

use anyhow::{bail, Context};
use chip8vm::{
    config::{DEFAULT_INSTRUCTIONS_PER_SECOND, DEFAULT_SCALE, MAX_SCALE},
    screen::Screen,
    sound::Sound,
    timer::TimerClock,
    Config, Emulator, Quirks, Speed, SpriteEdge,
};
use clap::Parser;
use minifb::Key;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// Separately:
// CPU: --ips times per second (+/- at runtime)
// Timers: 60 times per second
// Display: redrawn at the timer rate when the frame buffer changed

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 virtual machine", long_about = None)]
struct Args {
    /// Program image to run. Prompted for when omitted.
    rom: Option<PathBuf>,

    #[arg(short, long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND, help = "Instructions per second")]
    ips: u32,

    #[arg(
        short,
        long,
        default_value_t = DEFAULT_SCALE as u16,
        value_parser = clap::value_parser!(u16).range(1..=MAX_SCALE as i64),
        help = "Window pixels per display cell"
    )]
    scale: u16,

    #[arg(long, help = "Wrap sprites around the screen edges instead of clipping them")]
    wrap_sprites: bool,
}

impl Args {
    fn into_config(self, rom: PathBuf) -> Config {
        let sprite_edge = if self.wrap_sprites {
            SpriteEdge::Wrap
        } else {
            SpriteEdge::Clip
        };
        Config {
            rom,
            speed: Speed::new(self.ips),
            scale: usize::from(self.scale),
            quirks: Quirks { sprite_edge },
        }
    }
}

fn prompt_for_rom() -> anyhow::Result<PathBuf> {
    print!("Enter the ROM file: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("unable to read rom path from stdin")?;
    let path = line.trim();
    if path.is_empty() {
        bail!("no rom file given");
    }
    Ok(PathBuf::from(path))
}

fn run(config: Config) -> anyhow::Result<()> {
    let mut emu = Emulator::new(config.quirks);
    emu.mem
        .load_rom_by_file(&config.rom)
        .with_context(|| format!("error loading program \"{}\"", config.rom.display()))?;

    let title = config
        .rom
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chip8vm".to_owned());
    let mut screen = Screen::new(&title, config.scale).context("unable to open window")?;
    let sound = match Sound::new() {
        Ok(sound) => Some(sound),
        Err(err) => {
            warn!("audio disabled: {err}");
            None
        }
    };

    let mut speed = config.speed;
    info!("loaded {}, press + and - to adjust emulation speed", config.rom.display());
    info!("current speed is {} instructions per second", speed.ips());

    let mut timers = TimerClock::new(Instant::now());
    while screen.is_running() {
        let cycle_start = Instant::now();

        emu.keypad.refresh_from(&screen.window);
        if let Err(err) = emu.step() {
            error!("execution halted: {err}");
            break;
        }
        if emu.fb.take_draw_flag() {
            screen.render(&emu.fb);
        }

        let ticks = timers.poll(Instant::now());
        if ticks > 0 {
            for _ in 0..ticks {
                emu.tick_timers();
            }
            if let Some(sound) = &sound {
                sound.set_active(emu.sound_active());
            }

            // key edges only change when the window pumps events
            screen.sync().context("unable to update window")?;
            if screen.was_pressed(Key::Equal) || screen.was_pressed(Key::NumPadPlus) {
                speed.faster();
                info!("current speed is {} instructions per second", speed.ips());
            }
            if screen.was_pressed(Key::Minus) || screen.was_pressed(Key::NumPadMinus) {
                speed.slower();
                info!("current speed is {} instructions per second", speed.ips());
            }
        }

        if let Some(rest) = speed.step_interval().checked_sub(cycle_start.elapsed()) {
            thread::sleep(rest);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let rom = match args.rom.clone() {
        Some(rom) => rom,
        None => prompt_for_rom()?,
    };
    run(args.into_config(rom))
}
