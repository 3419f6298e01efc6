//! Puzzle Builder CLI
//!
//! Connect-two-players puzzle creator for DribbleGame.
//! Each invocation opens a session, runs one interaction, and prints the result.

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dribble_core::{
    MemoryGateway, PlayerId, PuzzleSession, RestGateway, StoreConfig, TableGateway,
    RANDOM_PUZZLE_MIN_RANK,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "puzzle_builder")]
#[command(about = "Create DribbleGame connect-two-players puzzles", long_about = None)]
struct Cli {
    /// JSON config file (url, api_key, page_size, ...)
    #[arg(long, global = true, env = "DRIBBLE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Serve all tables from a JSON fixture instead of the remote store
    #[arg(long, global = true)]
    offline: Option<PathBuf>,

    /// Print JSON instead of text tables
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List players in name order
    Players {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value_t = 25)]
        limit: usize,
    },

    /// Show the teammates of one player
    Teammates {
        id: PlayerId,
    },

    /// Show one-shot solutions for a start/end pair
    Candidates {
        #[arg(long)]
        start: PlayerId,

        #[arg(long)]
        end: PlayerId,
    },

    /// Pick a random start/end pair of well-known players
    Random {
        #[arg(long, default_value_t = RANDOM_PUZZLE_MIN_RANK)]
        min_rank: u32,

        /// RNG seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Save a puzzle; the solution must be a one-shot solution of the pair
    Create {
        #[arg(long)]
        creator: String,

        #[arg(long)]
        start: PlayerId,

        #[arg(long)]
        end: PlayerId,

        #[arg(long)]
        solution: PlayerId,
    },

    /// List puzzles saved by a creator
    List {
        #[arg(long)]
        creator: String,
    },

    /// Delete a puzzle by id
    Delete {
        #[arg(long)]
        id: i64,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --json.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dribble_core=info,puzzle_builder=info,warn")),
        )
        .init();

    let cli = Cli::parse();
    let (gateway, config) = open_gateway(cli.config.as_deref(), cli.offline.as_deref())?;
    let mut session = PuzzleSession::open(gateway.as_ref(), &config).context("Failed to load player catalog")?;

    run(&cli.command, &mut session, cli.json)
}

fn open_gateway(
    config_path: Option<&Path>,
    offline: Option<&Path>,
) -> Result<(Box<dyn TableGateway>, StoreConfig)> {
    match offline {
        Some(fixture) => {
            let config = StoreConfig::load_unvalidated(config_path)?;
            let gateway = MemoryGateway::from_fixture_file(fixture)
                .with_context(|| format!("Failed to load fixture: {}", fixture.display()))?;
            info!(fixture = %fixture.display(), "using offline fixture");
            Ok((Box::new(gateway), config))
        }
        None => {
            let config = StoreConfig::load(config_path).context("Invalid store configuration")?;
            let gateway = RestGateway::new(&config)?;
            Ok((Box::new(gateway), config))
        }
    }
}

fn run(command: &Commands, session: &mut PuzzleSession<'_, dyn TableGateway>, json: bool) -> Result<()> {
    match command {
        Commands::Players { search, limit } => {
            let catalog = session.catalog();
            let players: Vec<_> = match search {
                Some(query) => catalog.search(query).take(*limit).collect(),
                None => catalog.iter_sorted().take(*limit).collect(),
            };
            render::players(&players, catalog.len(), json)
        }

        Commands::Teammates { id } => {
            let player = session.catalog().require(*id)?;
            let records = session.teammates().teammates_of(*id)?;
            render::teammates(player, &records, session.catalog(), json)
        }

        Commands::Candidates { start, end } => {
            session.select_pair(*start, *end)?;
            render::candidates(session.candidate_table(), json)
        }

        Commands::Random { min_rank, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            let (start, end) = session.randomize(&mut rng, *min_rank)?;
            render::random_pair(session.catalog(), start, end, json)?;
            render::candidates(session.candidate_table(), json)
        }

        Commands::Create { creator, start, end, solution } => {
            session.set_creator(creator);
            session.select_pair(*start, *end)?;
            session.select_solution(Some(*solution))?;
            let puzzle = session.submit().context("Failed to submit puzzle")?;
            render::created(&puzzle, json)
        }

        Commands::List { creator } => {
            session.set_creator(creator);
            let puzzles = session.my_puzzles()?;
            render::puzzles(&puzzles, json)
        }

        Commands::Delete { id } => {
            session.select_puzzle(Some(*id));
            let deleted = session.delete_selected()?;
            render::deleted(deleted, json)
        }
    }
}
