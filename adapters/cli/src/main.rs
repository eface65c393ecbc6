#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the Sokoban engine headlessly.

mod config;
mod render;
mod script;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use sokoban_core::{Command, LevelId, ProfileId, ScoreReport, SessionState};
use sokoban_storage::{
    InProgressSave, LevelCatalog, LevelFormat, Profile, ProfileStore, SaveSlot, SaveSlotStore,
    StorageError,
};
use sokoban_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    script::{parse_moves, parse_paint, Runner},
};

/// Headless front end for the Sokoban puzzle engine.
#[derive(Debug, Parser)]
#[command(name = "sokoban", version)]
struct Cli {
    /// Path to the TOML configuration file (defaults to ./sokoban.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Inspect and manage level catalogs.
    Levels {
        #[command(subcommand)]
        action: LevelsAction,
    },
    /// Play a catalog level with a scripted move sequence.
    Play(PlayArgs),
    /// Continue a session saved in a profile or a save slot.
    Resume(ResumeArgs),
    /// Manage player profiles.
    Profiles {
        #[command(subcommand)]
        action: ProfilesAction,
    },
    /// Show profiles ranked by total score.
    Leaderboard,
    /// Manage save slots.
    Saves {
        #[command(subcommand)]
        action: SavesAction,
    },
    /// Paint a level in the editor, optionally playtest it, and export it.
    Edit(EditArgs),
}

#[derive(Debug, Subcommand)]
enum LevelsAction {
    /// List the levels of a catalog.
    List {
        /// Use the player-authored catalog.
        #[arg(long)]
        authored: bool,
    },
    /// Print one level and its grid.
    Show {
        /// Level id.
        id: u32,
        /// Use the player-authored catalog.
        #[arg(long)]
        authored: bool,
    },
    /// Rename a player-authored level.
    Rename {
        /// Level id.
        id: u32,
        /// New name.
        name: String,
    },
    /// Delete a player-authored level, shifting later ids down.
    Delete {
        /// Level id.
        id: u32,
    },
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Level id.
    level: u32,
    /// Play from the player-authored catalog.
    #[arg(long)]
    authored: bool,
    /// Moves to play, as a string of U, D, L and R.
    #[arg(long, default_value = "")]
    moves: String,
    /// Profile that receives the score when the level is finished.
    #[arg(long)]
    profile: Option<String>,
    /// Store the session in a new save slot with this name.
    #[arg(long)]
    save_slot: Option<String>,
    /// Store an unfinished session as the profile's in-progress save.
    #[arg(long, requires = "profile")]
    save_profile: bool,
}

#[derive(Debug, Args)]
struct ResumeArgs {
    /// Resume the in-progress save of this profile.
    #[arg(long, conflicts_with = "slot", required_unless_present = "slot")]
    profile: Option<String>,
    /// Resume the save slot at this position.
    #[arg(long)]
    slot: Option<usize>,
    /// Moves to play after restoring, as a string of U, D, L and R.
    #[arg(long, default_value = "")]
    moves: String,
    /// Store the resulting session in a new save slot with this name.
    #[arg(long)]
    save_slot: Option<String>,
}

#[derive(Debug, Subcommand)]
enum ProfilesAction {
    /// Create a profile with an empty score table.
    Create {
        /// Unique profile name.
        name: String,
    },
    /// List profiles by id.
    List,
    /// Rename a profile.
    Rename {
        /// Profile id.
        id: u32,
        /// New unique name.
        name: String,
    },
    /// Delete a profile, shifting later ids down.
    Delete {
        /// Profile id.
        id: u32,
    },
    /// Show the best score of every level for one profile.
    Scores {
        /// Profile id.
        id: u32,
    },
}

#[derive(Debug, Subcommand)]
enum SavesAction {
    /// List save slots by creation time.
    List,
    /// Delete the save slot at a position.
    Delete {
        /// Position in the listing.
        index: usize,
    },
}

#[derive(Debug, Args)]
struct EditArgs {
    /// Canvas width.
    #[arg(long)]
    columns: u32,
    /// Canvas height.
    #[arg(long)]
    rows: u32,
    /// Tiles to paint, as `column,row,tile;...` with row 0 at the bottom.
    #[arg(long, default_value = "")]
    paint: String,
    /// Play the painted level with these moves before exporting.
    #[arg(long)]
    playtest: Option<String>,
    /// Export the canvas into the authored catalog under this name.
    #[arg(long)]
    export: Option<String>,
}

/// Profile that follows a run and receives its scores.
struct ScoredProfile {
    store: ProfileStore,
    profile: Profile,
    keep_session: bool,
}

/// Entry point for the Sokoban command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.log_filter);

    match cli.command {
        CliCommand::Levels { action } => levels(&config, action),
        CliCommand::Play(args) => play(&config, args),
        CliCommand::Resume(args) => resume(&config, args),
        CliCommand::Profiles { action } => profiles(&config, action),
        CliCommand::Leaderboard => leaderboard(&config),
        CliCommand::Saves { action } => saves(&config, action),
        CliCommand::Edit(args) => edit(&config, args),
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn open_catalog(config: &Config, authored: bool) -> Result<LevelCatalog> {
    let (dir, format) = if authored {
        (config.authored_dir(), LevelFormat::Authored)
    } else {
        (config.levels_dir(), LevelFormat::Standard)
    };
    LevelCatalog::open(&dir, format)
        .with_context(|| format!("failed to open level catalog {}", dir.display()))
}

fn levels(config: &Config, action: LevelsAction) -> Result<()> {
    match action {
        LevelsAction::List { authored } => {
            let catalog = open_catalog(config, authored)?;
            if catalog.is_empty() {
                println!("no levels in {}", catalog.dir().display());
            }
            for level in catalog.levels() {
                println!("{}", render::level_summary(level));
            }
        }
        LevelsAction::Show { id, authored } => {
            let catalog = open_catalog(config, authored)?;
            let level = catalog.get(LevelId::new(id))?;
            println!("{}", render::level_summary(level));
            print!("{}", render::grid(level.view()));
        }
        LevelsAction::Rename { id, name } => {
            let mut catalog = open_catalog(config, true)?;
            if catalog.contains_name(&name) {
                bail!("a level named {name:?} already exists");
            }
            catalog.rename(LevelId::new(id), &name)?;
            println!("renamed level {id} to {name:?}");
        }
        LevelsAction::Delete { id } => {
            let mut catalog = open_catalog(config, true)?;
            let removed = catalog.delete(LevelId::new(id))?;
            println!("deleted level {id} ({})", removed.name());
        }
    }
    Ok(())
}

fn play(config: &Config, args: PlayArgs) -> Result<()> {
    if args.authored && args.profile.is_some() {
        bail!("authored levels are unranked and cannot be scored for a profile");
    }

    let catalog = open_catalog(config, args.authored)?;
    let level = catalog.get(LevelId::new(args.level))?.clone();
    let moves = parse_moves(&args.moves)?;

    let scored = match &args.profile {
        Some(name) => {
            let store = ProfileStore::open(config.profiles_dir())?;
            let profile = store
                .find(name)
                .with_context(|| format!("no profile named {name:?}"))?
                .clone();
            Some(ScoredProfile {
                store,
                profile,
                keep_session: args.save_profile,
            })
        }
        None => None,
    };

    let mut runner = Runner::new(config.seconds_per_move);
    let _ = runner.apply(Command::LoadLevel { level })?;
    conclude(config, runner, &moves, scored, args.save_slot)
}

fn resume(config: &Config, args: ResumeArgs) -> Result<()> {
    let moves = parse_moves(&args.moves)?;
    let mut runner = Runner::new(config.seconds_per_move);

    let scored = if let Some(name) = &args.profile {
        let store = ProfileStore::open(config.profiles_dir())?;
        let profile = store
            .find(name)
            .with_context(|| format!("no profile named {name:?}"))?
            .clone();
        let InProgressSave::Session(snapshot) = profile.in_progress().clone() else {
            println!("profile {name:?} has no saved session");
            return Ok(());
        };
        let _ = runner.apply(Command::RestoreSession { snapshot })?;
        Some(ScoredProfile {
            store,
            profile,
            keep_session: true,
        })
    } else if let Some(index) = args.slot {
        let slots = SaveSlotStore::open(config.saves_dir())?;
        let snapshot = slots.get(index)?.snapshot().clone();
        let _ = runner.apply(Command::RestoreSession { snapshot })?;
        None
    } else {
        bail!("pass --profile or --slot");
    };

    conclude(config, runner, &moves, scored, args.save_slot)
}

/// Plays the moves, prints the outcome and persists scores and saves.
fn conclude(
    config: &Config,
    mut runner: Runner,
    moves: &[sokoban_core::Direction],
    mut scored: Option<ScoredProfile>,
    save_slot: Option<String>,
) -> Result<()> {
    let reports = {
        let profile = scored.as_ref().map(|scored| &scored.profile);
        runner.play(moves, |level| {
            profile.map_or(0, |profile| profile.best_score(level))
        })?
    };

    let world = runner.world();
    if let Some(grid) = query::grid(world) {
        print!("{}", render::grid(grid));
    }
    if let Some(counters) = query::counters(world) {
        println!("{}", render::counters(query::state(world), counters));
    }
    for report in &reports {
        print_report(report);
    }

    let state = query::state(world);
    if let Some(ScoredProfile {
        store,
        profile,
        keep_session,
    }) = scored.as_mut()
    {
        for report in &reports {
            if profile.record_score(report) {
                info!(
                    profile = profile.name(),
                    level = report.level.get(),
                    score = report.score,
                    "high_score_recorded"
                );
            }
        }
        if *keep_session {
            let save = match (state, query::snapshot(world)) {
                (SessionState::Playing, Some(snapshot)) => InProgressSave::Session(snapshot),
                _ => InProgressSave::Empty,
            };
            profile.set_in_progress(save);
        }
        store.save(profile.clone())?;
    }

    if let Some(name) = save_slot {
        let Some(snapshot) = query::snapshot(world) else {
            bail!("no session to save");
        };
        let mut slots = SaveSlotStore::open(config.saves_dir())?;
        match slots.add(SaveSlot::capture(&name, snapshot)) {
            Ok(index) => println!("saved slot {name:?} at position {index}"),
            Err(StorageError::DuplicateName { name }) => {
                warn!(name = %name, "duplicate_save_slot");
                println!("a save slot named {name:?} already exists; nothing saved");
            }
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}

fn print_report(report: &ScoreReport) {
    println!(
        "level {} scored {} (previous best {})",
        report.level.get(),
        report.score,
        report.previous_best
    );
    if report.is_high_score {
        println!("new high score!");
    }
}

fn profiles(config: &Config, action: ProfilesAction) -> Result<()> {
    let mut store = ProfileStore::open(config.profiles_dir())?;
    match action {
        ProfilesAction::Create { name } => {
            let level_count = open_catalog(config, false)?.len();
            match store.create(&name, level_count) {
                Ok(id) => println!("created profile {name:?} with id {}", id.get()),
                Err(StorageError::DuplicateName { name }) => {
                    warn!(name = %name, "duplicate_profile");
                    println!("a profile named {name:?} already exists");
                }
                Err(error) => return Err(error.into()),
            }
        }
        ProfilesAction::List => {
            for profile in store.profiles() {
                println!(
                    "{:>3}  {:<24} {:>6}",
                    profile.id().get(),
                    profile.name(),
                    profile.total_score()
                );
            }
        }
        ProfilesAction::Rename { id, name } => match store.rename(ProfileId::new(id), &name) {
            Ok(()) => println!("renamed profile {id} to {name:?}"),
            Err(StorageError::DuplicateName { name }) => {
                warn!(name = %name, "duplicate_profile");
                println!("a profile named {name:?} already exists");
            }
            Err(error) => return Err(error.into()),
        },
        ProfilesAction::Delete { id } => {
            let removed = store.delete(ProfileId::new(id))?;
            println!("deleted profile {id} ({})", removed.name());
        }
        ProfilesAction::Scores { id } => {
            let profile = store.get(ProfileId::new(id))?;
            let catalog = open_catalog(config, false)?;
            println!("{} (total {})", profile.name(), profile.total_score());
            for (index, score) in profile.level_scores().iter().enumerate() {
                let level = u32::try_from(index).map(LevelId::new).ok();
                let name = level
                    .and_then(|level| catalog.get(level).ok())
                    .map_or("?", |level| level.name());
                println!("{index:>3}  {name:<24} {score:>3}");
            }
        }
    }
    Ok(())
}

fn leaderboard(config: &Config) -> Result<()> {
    let store = ProfileStore::open(config.profiles_dir())?;
    for (rank, profile) in store.leaderboard().iter().enumerate() {
        println!(
            "{:>3}. {:<24} {:>6}",
            rank + 1,
            profile.name(),
            profile.total_score()
        );
    }
    Ok(())
}

fn saves(config: &Config, action: SavesAction) -> Result<()> {
    let mut slots = SaveSlotStore::open(config.saves_dir())?;
    match action {
        SavesAction::List => {
            for (index, slot) in slots.slots().iter().enumerate() {
                let snapshot = slot.snapshot();
                println!(
                    "{index:>3}  {:<20} {:<24} moves {:>4}  time {:>4}s  created {}",
                    slot.name(),
                    snapshot.level.name(),
                    snapshot.player_moves,
                    snapshot.elapsed_seconds,
                    slot.created_at()
                );
            }
        }
        SavesAction::Delete { index } => {
            let removed = slots.delete(index)?;
            println!("deleted save slot {:?}", removed.name());
        }
    }
    Ok(())
}

fn edit(config: &Config, args: EditArgs) -> Result<()> {
    let mut runner = Runner::new(config.seconds_per_move);
    let _ = runner.apply(Command::BeginEditing {
        columns: args.columns,
        rows: args.rows,
    })?;
    for (cell, tile) in parse_paint(&args.paint)? {
        let _ = runner.apply(Command::PaintTile { cell, tile })?;
    }
    if let Some(canvas) = query::canvas(runner.world()) {
        print!("{}", render::grid(canvas));
    }

    if let Some(moves) = &args.playtest {
        let level = query::export_level(runner.world(), "playtest", args.rows, args.columns)
            .context("the canvas cannot be playtested")?;
        let moves = parse_moves(moves)?;
        let _ = runner.apply(Command::LoadLevel { level })?;
        let _ = runner.play(&moves, |_| 0)?;
        let world = runner.world();
        if let (Some(grid), Some(counters)) = (query::grid(world), query::counters(world)) {
            println!("playtest:");
            print!("{}", render::grid(grid));
            println!("{}", render::counters(query::state(world), counters));
        }
        let _ = runner.apply(Command::ResumeEditing)?;
    }

    if let Some(name) = &args.export {
        let mut catalog = open_catalog(config, true)?;
        if catalog.contains_name(name) {
            bail!("a level named {name:?} already exists");
        }
        let level = query::export_level(runner.world(), name, args.rows, args.columns)
            .context("the canvas cannot be exported")?;
        let id = catalog.add(level)?;
        println!("exported {name:?} as authored level {}", id.get());
    }
    Ok(())
}
