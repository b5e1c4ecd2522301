//! Katamari Adventure entry point
//!
//! Headless runner: loads settings and tuning, then plays attract mode for a
//! fixed number of frames and prints the final render snapshot as JSON.
//!
//! ```text
//! katamari-adventure [--seed N] [--frames N] [--settings PATH] [--tuning PATH] [--unpaced]
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use katamari_adventure::audio::{AudioManager, LogSink};
use katamari_adventure::consts::{DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, TARGET_FPS};
use katamari_adventure::driver::FrameDriver;
use katamari_adventure::sim::GameState;
use katamari_adventure::{Settings, Tuning};

const DEFAULT_FRAMES: u64 = TARGET_FPS as u64 * 30;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Run seed. Defaults to the wall clock.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Frames to play before stopping.
    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = DEFAULT_FRAMES,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    frames: u64,
    /// Settings file, created on exit if missing.
    #[arg(long, value_name = "PATH", default_value = "katamari_settings.json")]
    settings: PathBuf,
    /// Balance overrides as JSON.
    #[arg(long, value_name = "PATH")]
    tuning: Option<PathBuf>,
    /// Run as fast as possible instead of at the target frame rate.
    #[arg(long)]
    unpaced: bool,
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = CliArgs::parse();
    let settings = Settings::load(&args.settings);
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let seed = args.seed.unwrap_or_else(clock_seed);
    log::info!("Katamari Adventure starting (seed {})", seed);

    let audio = AudioManager::from_settings(&settings, Box::new(LogSink));
    let display = (DEFAULT_SCREEN_WIDTH * 2, DEFAULT_SCREEN_HEIGHT * 2);
    let mut driver = FrameDriver::new(GameState::with_tuning(seed, tuning), settings, audio, display)
        .with_frame_limit(args.frames);
    if args.unpaced {
        driver = driver.unpaced();
    }

    let mut last = None;
    let frames = driver.run(
        |input, _| input.tick.idle_mode = true,
        |snapshot| last = Some(snapshot.clone()),
    );

    let state = &driver.state;
    log::info!(
        "Ran {} frames: level {}/{}, size {:.1}, score {}, {} objects collected",
        frames,
        state.progression.level,
        state.progression.level_count(),
        state.player.size,
        state.player.score,
        state.player.objects_collected
    );

    if let Err(e) = driver.settings.save(&args.settings) {
        log::warn!("Failed to save settings: {}", e);
    }

    if let Some(snapshot) = last {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["katamari-adventure"]).unwrap();
        assert_eq!(args.seed, None);
        assert_eq!(args.frames, DEFAULT_FRAMES);
        assert_eq!(args.settings, PathBuf::from("katamari_settings.json"));
        assert!(args.tuning.is_none());
        assert!(!args.unpaced);
    }

    #[test]
    fn test_cli_flags() {
        let args = CliArgs::try_parse_from([
            "katamari-adventure",
            "--seed",
            "42",
            "--frames",
            "600",
            "--tuning",
            "easy.json",
            "--unpaced",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.frames, 600);
        assert_eq!(args.tuning, Some(PathBuf::from("easy.json")));
        assert!(args.unpaced);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(CliArgs::try_parse_from(["katamari-adventure", "--frames", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["katamari-adventure", "--seed", "abc"]).is_err());
        assert!(CliArgs::try_parse_from(["katamari-adventure", "--bogus"]).is_err());
    }
}
