#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Deepdelve session headlessly.
//!
//! The binary starts (or resumes) a game, replays the requested actions,
//! then prints the first-person view as text together with the automap and
//! the party roster.

mod ascii;
mod save_transfer;
mod script;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use deepdelve_core::{Command, DungeonConfig, Event, TurnPhase};
use deepdelve_rendering::{PlaceholderAssets, RenderingBackend, Viewport};
use deepdelve_system_session::{MemoryPersistence, Persistence, Session, SessionConfig};
use deepdelve_world::query;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use self::{ascii::AsciiBackend, save_transfer::JsonFilePersistence};

/// Headless Deepdelve runner.
#[derive(Debug, Parser)]
#[command(author, version, about = "Plays a scripted Deepdelve session", long_about = None)]
struct Args {
    /// Seed for dungeon generation and combat rolls.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Party as comma separated name:archetype entries.
    #[arg(long, default_value = "Brakka:warrior,Ilsa:mage,Fenn:ranger")]
    party: String,
    /// Actions to replay, e.g. "f f l i melee step:1:0 tick:500".
    #[arg(long, default_value = "")]
    actions: String,
    /// Save file; the game is stored there after the actions ran.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Continue the game stored in the save file instead of starting anew.
    #[arg(long, requires = "save")]
    resume: bool,
    /// TOML file overriding dungeon rules.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Width of the rendered view in characters.
    #[arg(long, default_value_t = 96)]
    width: u32,
    /// Height of the rendered view in characters.
    #[arg(long, default_value_t = 28)]
    height: u32,
}

/// Contents of the optional TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    dungeon: DungeonConfig,
    autosave: Option<bool>,
    /// Sight range in tiles for the ray sweep and sprite visibility.
    max_ray_depth: Option<f32>,
}

/// Entry point for the Deepdelve command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    match args.save.clone() {
        Some(path) => {
            let store = JsonFilePersistence::new(path);
            tracing::debug!(path = %store.path().display(), "using save file");
            play(&args, config, store)
        }
        None => play(&args, config, MemoryPersistence::new()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&PathBuf>) -> Result<SessionConfig> {
    let mut config = SessionConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let file: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config.dungeon = file.dungeon;
    if let Some(autosave) = file.autosave {
        config.autosave = autosave;
    }
    if let Some(depth) = file.max_ray_depth {
        if !(depth.is_finite() && depth > 0.0) {
            bail!("max_ray_depth must be a positive number of tiles, got {depth}");
        }
        config.raycast.max_ray_depth = depth;
    }
    Ok(config)
}

fn play<P: Persistence>(args: &Args, config: SessionConfig, persistence: P) -> Result<()> {
    let party = script::parse_party(&args.party).context("invalid --party")?;
    let actions = script::parse_actions(&args.actions).context("invalid --actions")?;
    let viewport = Viewport::new(args.width, args.height)?;
    let mut backend = AsciiBackend::new(args.width as usize, args.height as usize)?;

    let mut session = Session::new(config, args.seed, persistence);
    if !(args.resume && session.resume()) {
        let events = session.dispatch(Command::StartGame { party });
        if let Some(Event::ActionRejected { reason }) = events
            .iter()
            .find(|event| matches!(event, Event::ActionRejected { .. }))
        {
            bail!("the game could not start: {reason:?}");
        }
    }

    for command in actions {
        if query::phase(session.world()) == TurnPhase::GameOver {
            tracing::info!("party defeated; remaining actions skipped");
            break;
        }
        for event in session.dispatch(command) {
            match event {
                Event::ActionRejected { reason } => {
                    tracing::warn!(?reason, "action rejected");
                }
                event => tracing::debug!(?event, "event"),
            }
        }
    }

    if let Some(path) = &args.save {
        session
            .save()
            .with_context(|| format!("failed to write save {}", path.display()))?;
    }

    let frame = session.frame(viewport, &PlaceholderAssets);
    backend.present(&frame, &PlaceholderAssets)?;
    print_report(&session, &backend);
    Ok(())
}

fn print_report<P: Persistence>(session: &Session<P>, backend: &AsciiBackend) {
    let world = session.world();
    for line in backend.lines() {
        println!("{line}");
    }
    println!();

    let rows = ascii::automap(
        query::map(world),
        query::explored(world),
        &query::pose(world),
        &query::enemy_view(world),
    );
    for row in rows {
        println!("{}", row.trim_end());
    }
    println!();

    println!(
        "Dungeon level {} | {:?} | {}s played",
        query::dungeon_level(world),
        query::phase(world),
        query::elapsed(world).as_secs()
    );
    for (index, member) in query::party(world).iter().enumerate() {
        let marker = if index == query::active_index(world) {
            '>'
        } else {
            ' '
        };
        let stats = member.stats();
        println!(
            "{marker} {} ({:?}) L{} hp {}/{} mp {}/{} xp {}/{} gold {}{}",
            member.name(),
            member.archetype(),
            member.level(),
            member.current_hp(),
            stats.max_hp,
            member.current_mp(),
            stats.max_mp,
            member.xp(),
            member.next_level_xp(),
            member.gold(),
            if member.is_alive() { "" } else { " [fallen]" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("deepdelve-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("scratch file writable");
        path
    }

    #[test]
    fn missing_config_keeps_defaults() {
        let config = load_config(None).expect("defaults load");
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn ray_depth_override_reaches_the_raycaster() {
        let path = scratch_config(
            "depth.toml",
            "max_ray_depth = 8.0\nautosave = false\n\n[dungeon]\nmagic_cost = 4\n",
        );
        let config = load_config(Some(&path)).expect("config loads");
        fs::remove_file(&path).expect("scratch file removable");

        assert!((config.raycast.max_ray_depth - 8.0).abs() < f32::EPSILON);
        assert!(!config.autosave);
        assert_eq!(config.dungeon.magic_cost, 4);
        assert_eq!(config.dungeon.map_width, DungeonConfig::default().map_width);
    }

    #[test]
    fn non_positive_ray_depth_is_rejected() {
        let path = scratch_config("bad-depth.toml", "max_ray_depth = 0.0\n");
        let result = load_config(Some(&path));
        fs::remove_file(&path).expect("scratch file removable");
        assert!(result.is_err());
    }
}
