//! Deepwarren - Entry Point
//!
//! Generates and populates a dungeon, then runs the regeneration driver
//! for a number of simulated ticks and prints what happened.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use deepwarren::data::{export_default_config, load_config_or_default, DEFAULT_CONFIG_PATH};
use deepwarren::ecs::{Container, Creature};
use deepwarren::world::{render_depth, Notice, Realm, RegenerationDriver};
use deepwarren::FloorCatalogue;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RNG seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of regeneration ticks to simulate
    #[arg(short, long, default_value_t = 0)]
    ticks: u32,

    /// Seconds of game time per tick
    #[arg(long, default_value_t = 1.0)]
    tick_secs: f64,

    /// Path to the RON realm config
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print a map of every depth
    #[arg(long)]
    depth_maps: bool,

    /// Count the creatures and loot the dungeon was populated with
    #[arg(long)]
    census: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    export_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting Deepwarren v{}", env!("CARGO_PKG_VERSION"));

    if args.export_config {
        export_default_config(&args.config)
            .with_context(|| format!("writing default config to {:?}", args.config))?;
        println!("Default config written to {}", args.config.display());
        return Ok(());
    }

    let config = load_config_or_default(&args.config);
    let seed = args.seed.or(config.generation.seed);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut realm = Realm::new(FloorCatalogue::standard(), config);
    let dungeon = realm.build_dungeon(&mut rng).context("generating the dungeon")?;
    realm.install_dungeon(dungeon);
    println!("{}", realm.dungeon.stats());

    if args.depth_maps {
        print_maps(&realm);
    }
    if args.census {
        print_census(&realm);
    }

    let mut driver = RegenerationDriver::new(&realm.config.regeneration);
    let tick = Duration::from_secs_f64(args.tick_secs.max(0.0));
    for n in 1..=args.ticks {
        let outcome = driver
            .tick(&mut realm, tick, &mut rng)
            .with_context(|| format!("regeneration tick {}", n))?;

        if let Some(stats) = outcome.regenerated {
            println!("[tick {}] dungeon regenerated: {}", n, stats);
        }
        if let Some(report) = outcome.mutation.filter(|report| !report.is_empty()) {
            println!("[tick {}] {}", n, report);
        }
        for notice in realm.drain_notices() {
            match notice {
                Notice::Global(text) => println!("[tick {}] ** {}", n, text),
                Notice::Room { room, text } => println!("[tick {}] ({}) {}", n, room, text),
            }
        }
    }

    if args.ticks > 0 {
        println!("{}", realm.dungeon.stats());
        let issues = realm.dungeon.validate();
        if !issues.is_empty() {
            log::warn!("{} structural issues after regeneration", issues.len());
        }
        if args.depth_maps {
            print_maps(&realm);
        }
    }

    log::info!("Deepwarren shutdown complete");
    Ok(())
}

fn print_maps(realm: &Realm) {
    for depth in 0..realm.dungeon.depth_count() {
        println!("{}", render_depth(&realm.dungeon, depth));
    }
}

fn print_census(realm: &Realm) {
    let mut creatures: BTreeMap<&'static str, (char, usize)> = BTreeMap::new();
    for (_, creature) in realm.entities.query::<&Creature>().iter() {
        let glyph = creature.kind.def().glyph;
        creatures.entry(creature.kind.name()).or_insert((glyph, 0)).1 += 1;
    }
    println!("Creatures:");
    for (name, (glyph, count)) in &creatures {
        println!("  {} {:<18} x{}", glyph, name, count);
    }

    let mut loot = BTreeMap::new();
    for (_, container) in realm.entities.query::<&Container>().iter() {
        for stack in &container.items {
            *loot.entry((stack.kind.rarity(), stack.kind.name())).or_insert(0u32) += stack.quantity;
        }
    }
    println!("Loot:");
    for ((rarity, name), quantity) in &loot {
        println!("  {:<9} {:<18} x{}", format!("{:?}", rarity), name, quantity);
    }
}
