//! # dribble_core - DribbleGame puzzle creator core
//!
//! Builds "connect two players through a shared teammate" puzzles on top of
//! a remote tabular store.
//!
//! ## Layers
//! - `gateway`: paginated reads, inserts and deletes against the store
//! - `catalog` / `teammates`: typed snapshots of players and teammate rows
//! - `candidates`: one-shot solutions for a start/end pair
//! - `puzzles`: puzzle records per creator
//! - `session`: selection state driven by a front end

pub mod candidates;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod headshot;
pub mod models;
pub mod puzzles;
pub mod session;
pub mod teammates;

pub use candidates::{compute_candidates, EnrichedCandidate, SharedSeasons};
pub use catalog::{PlayerCatalog, RANDOM_PUZZLE_MIN_RANK};
pub use config::{ResourceNames, StoreConfig};
pub use error::{CoreError, CoreResult, RecordKind};
pub use gateway::{fetch_all, Filter, MemoryGateway, Page, RestGateway, TableGateway};
pub use headshot::{headshot_url, HeadshotResolver, HeadshotSize};
pub use models::{NewPuzzle, Player, PlayerId, Puzzle, PuzzleId, TeammateRecord};
pub use puzzles::{CreatorId, PuzzleStore};
pub use session::{CandidateRow, CandidateTable, PlayerBadge, PuzzleSession, PuzzleSummary, Selection};
pub use teammates::TeammateIndex;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
