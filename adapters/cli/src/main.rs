#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Horde session.

mod decor;
mod host;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use horde_core::{SimulationConfig, WINDOW_TITLE};
use horde_engine::Simulation;
use horde_rendering::{palette, Presentation, RenderingBackend, Scene};
use horde_rendering_macroquad::MacroquadBackend;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing_subscriber::filter::EnvFilter;

use self::host::Host;

/// Command-line arguments accepted by the Horde binary.
#[derive(Debug, Parser)]
#[command(name = "horde", about = "Survive an endless horde for as long as possible")]
struct Args {
    /// TOML file overriding the simulation defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for spawn randomness and ground decoration. Defaults to the clock.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the configured simulation ticks per second.
    #[arg(long, value_name = "TICKS")]
    tick_rate: Option<u32>,
    /// Runs this many frames without a window, then logs a summary.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,
    /// Draws primitive shapes instead of loading sprites.
    #[arg(long)]
    no_sprites: bool,
    /// Sprite manifest to load instead of `assets/manifest.toml`.
    #[arg(long, value_name = "FILE")]
    sprite_manifest: Option<PathBuf>,
    /// Synchronises presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
    /// Logs the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Horde command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.tick_rate)?;
    let seed = args.seed.unwrap_or_else(clock_seed);
    tracing::info!(seed, ?config, "starting session");

    let simulation = Simulation::new(config.clone(), seed);

    if let Some(frames) = args.headless {
        let summary = host::run_headless(simulation, frames);
        tracing::info!(
            frames = summary.frames,
            kills = summary.kills,
            level = summary.level,
            experience = summary.experience,
            bosses_defeated = summary.bosses_defeated,
            session = ?summary.session,
            "headless run finished"
        );
        return Ok(());
    }

    let mut decor_rng = ChaCha8Rng::seed_from_u64(seed);
    let scene = Scene::new(decor::generate(&mut decor_rng, config.world_half_extent));
    let presentation = Presentation::new(
        WINDOW_TITLE,
        Vec2::new(config.viewport_width, config.viewport_height),
        palette::BACKGROUND,
        scene,
    );

    let mut backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .with_sprite_loading(!args.no_sprites);
    if let Some(path) = args.sprite_manifest {
        backend = backend.with_sprite_manifest(path);
    }

    let mut host = Host::new(simulation, config.tick_rate);
    backend.run(presentation, move |elapsed, input, scene| {
        host.frame(elapsed, input, scene);
    })
}

fn load_config(path: Option<&Path>, tick_rate: Option<u32>) -> Result<SimulationConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config at {}", path.display()))?;
            toml::from_str::<SimulationConfig>(&contents)
                .with_context(|| format!("failed to parse config at {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(tick_rate) = tick_rate {
        config.tick_rate = tick_rate;
    }
    config
        .validate()
        .context("invalid simulation configuration")?;
    Ok(config)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_parse_into_arguments() {
        let args = Args::try_parse_from([
            "horde",
            "--seed",
            "9",
            "--headless",
            "120",
            "--no-sprites",
            "--tick-rate",
            "30",
        ])
        .expect("valid arguments");
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.headless, Some(120));
        assert_eq!(args.tick_rate, Some(30));
        assert!(args.no_sprites);
        assert!(!args.vsync);
    }

    #[test]
    fn missing_config_uses_defaults() {
        let config = load_config(None, None).expect("defaults are valid");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn tick_rate_flag_overrides_file() {
        let path = std::env::temp_dir().join(format!("horde-cli-{}.toml", std::process::id()));
        fs::write(&path, "tick_rate = 120\nboss_max_hp = 800\n").expect("write temp config");
        let config = load_config(Some(&path), Some(30)).expect("valid config");
        let _ = fs::remove_file(&path);

        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.boss_max_hp, 800);
    }

    #[test]
    fn invalid_config_is_rejected_with_context() {
        let error = load_config(None, Some(0)).expect_err("zero tick rate");
        assert!(format!("{error:#}").contains("invalid simulation configuration"));
    }

    #[test]
    fn unreadable_config_names_the_path() {
        let error = load_config(Some(Path::new("no/such/horde.toml")), None)
            .expect_err("missing file");
        assert!(format!("{error:#}").contains("no/such/horde.toml"));
    }
}
