//! Interactive puzzle-creation session.
//!
//! `PuzzleSession` is the context object a front end drives: it owns the
//! catalog snapshot and the current selections, and recomputes the derived
//! candidate list whenever the start/end pair changes. Every operation either
//! succeeds or leaves the selection exactly as it was.

use crate::candidates::{compute_candidates, EnrichedCandidate};
use crate::catalog::PlayerCatalog;
use crate::config::{ResourceNames, StoreConfig};
use crate::error::{CoreError, CoreResult};
use crate::gateway::TableGateway;
use crate::headshot::{headshot_url, HeadshotResolver, HeadshotSize};
use crate::models::{Player, PlayerId, Puzzle, PuzzleId};
use crate::puzzles::{CreatorId, PuzzleStore};
use crate::teammates::TeammateIndex;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub creator: Option<CreatorId>,
    pub start: Option<PlayerId>,
    pub end: Option<PlayerId>,
    pub solution: Option<PlayerId>,
    /// `Some` once both endpoints are chosen
    pub candidates: Option<Vec<EnrichedCandidate>>,
    pub selected_puzzle: Option<PuzzleId>,
}

/// One row of the one-shot solutions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub id: PlayerId,
    pub display_name: String,
    pub headshot_url: String,
    pub search_rank: u32,
    pub total_shared_seasons: u32,
    pub seasons_with_start: Vec<String>,
    pub seasons_with_end: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTable {
    pub start_last_name: String,
    pub end_last_name: String,
    pub rows: Vec<CandidateRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBadge {
    pub id: PlayerId,
    pub display_name: String,
    pub headshot_url: String,
}

/// A stored puzzle joined with the catalog for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSummary {
    pub id: PuzzleId,
    pub created_at: Option<DateTime<Utc>>,
    pub start: PlayerBadge,
    pub end: PlayerBadge,
    pub solution: PlayerBadge,
}

pub struct PuzzleSession<'g, G: TableGateway + ?Sized> {
    catalog: PlayerCatalog,
    teammates: TeammateIndex<'g, G>,
    puzzles: PuzzleStore<'g, G>,
    headshots: HeadshotResolver,
    selection: Selection,
}

impl<'g, G: TableGateway + ?Sized> PuzzleSession<'g, G> {
    /// Load the player catalog and start with an empty selection.
    pub fn open(gateway: &'g G, config: &StoreConfig) -> CoreResult<Self> {
        let catalog = PlayerCatalog::load(gateway, &config.resources, config.page_size)?;
        Ok(Self::with_catalog(
            gateway,
            catalog,
            &config.resources,
            config.page_size,
            HeadshotResolver::new(config.resolved_headshot_base_url()),
        ))
    }

    pub fn with_catalog(
        gateway: &'g G,
        catalog: PlayerCatalog,
        resources: &ResourceNames,
        page_size: usize,
        headshots: HeadshotResolver,
    ) -> Self {
        Self {
            catalog,
            teammates: TeammateIndex::new(gateway, resources.teammates.clone(), page_size),
            puzzles: PuzzleStore::new(gateway, resources.puzzles.clone(), page_size),
            headshots,
            selection: Selection::default(),
        }
    }

    pub fn catalog(&self) -> &PlayerCatalog {
        &self.catalog
    }

    pub fn teammates(&self) -> &TeammateIndex<'g, G> {
        &self.teammates
    }

    pub fn headshots(&self) -> &HeadshotResolver {
        &self.headshots
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Blank input clears the creator (which disables submit and listing).
    pub fn set_creator(&mut self, raw: &str) {
        self.selection.creator = CreatorId::new(raw).ok();
        self.selection.selected_puzzle = None;
    }

    pub fn select_start(&mut self, start: Option<PlayerId>) -> CoreResult<()> {
        self.apply_endpoints(start, self.selection.end)
    }

    pub fn select_end(&mut self, end: Option<PlayerId>) -> CoreResult<()> {
        self.apply_endpoints(self.selection.start, end)
    }

    pub fn select_pair(&mut self, start: PlayerId, end: PlayerId) -> CoreResult<()> {
        self.apply_endpoints(Some(start), Some(end))
    }

    /// Pick two random players ranked above `min_rank` and select them.
    /// Front ends pass [`crate::catalog::RANDOM_PUZZLE_MIN_RANK`] unless told otherwise.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, min_rank: u32) -> CoreResult<(PlayerId, PlayerId)> {
        let (start, end) = self.catalog.random_pair(rng, min_rank).ok_or_else(|| {
            CoreError::Validation(format!("need at least two players ranked above {min_rank}"))
        })?;
        self.apply_endpoints(Some(start), Some(end))?;
        Ok((start, end))
    }

    fn apply_endpoints(&mut self, start: Option<PlayerId>, end: Option<PlayerId>) -> CoreResult<()> {
        for id in [start, end].into_iter().flatten() {
            self.catalog.require(id)?;
        }

        let candidates = match (start, end) {
            (Some(s), Some(e)) => Some(compute_candidates(&self.catalog, &self.teammates, s, e)?),
            _ => None,
        };

        let still_valid = |id: &PlayerId| {
            candidates.as_ref().is_some_and(|list| list.iter().any(|c| c.id() == *id))
        };
        self.selection.solution = self.selection.solution.filter(still_valid);
        self.selection.start = start;
        self.selection.end = end;
        self.selection.candidates = candidates;
        Ok(())
    }

    /// Current one-shot solutions, empty until both endpoints are selected.
    pub fn candidates(&self) -> &[EnrichedCandidate] {
        self.selection.candidates.as_deref().unwrap_or_default()
    }

    /// Candidate list shaped for display, `None` until both endpoints are selected.
    pub fn candidate_table(&self) -> Option<CandidateTable> {
        let (start, end) = (self.selection.start?, self.selection.end?);
        let candidates = self.selection.candidates.as_ref()?;
        let last_name = |id| self.catalog.get(id).map(|p: &Player| p.last_name.clone()).unwrap_or_default();

        Some(CandidateTable {
            start_last_name: last_name(start),
            end_last_name: last_name(end),
            rows: candidates
                .iter()
                .map(|c| CandidateRow {
                    id: c.id(),
                    display_name: c.player.display_name.clone(),
                    headshot_url: self.headshots.url_for(&c.player, HeadshotSize::Medium),
                    search_rank: c.player.search_rank,
                    total_shared_seasons: c.total_shared_seasons,
                    seasons_with_start: c.with_start.seasons.clone(),
                    seasons_with_end: c.with_end.seasons.clone(),
                })
                .collect(),
        })
    }

    /// The solution must be one of the current candidates.
    pub fn select_solution(&mut self, solution: Option<PlayerId>) -> CoreResult<()> {
        if let Some(id) = solution {
            if !self.candidates().iter().any(|c| c.id() == id) {
                return Err(CoreError::Validation(format!(
                    "player {id} is not a one-shot solution for the selected pair"
                )));
            }
        }
        self.selection.solution = solution;
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.submission().is_ok()
    }

    fn submission(&self) -> CoreResult<(&CreatorId, PlayerId, PlayerId, PlayerId)> {
        let s = &self.selection;
        let creator = s
            .creator
            .as_ref()
            .ok_or_else(|| CoreError::Validation("creator id is required".to_string()))?;
        let (Some(start), Some(end)) = (s.start, s.end) else {
            return Err(CoreError::Validation("select a start and an end player".to_string()));
        };
        if start == end {
            return Err(CoreError::Validation("start and end player must differ".to_string()));
        }
        let solution = s
            .solution
            .ok_or_else(|| CoreError::Validation("select a solution player".to_string()))?;
        Ok((creator, start, end, solution))
    }

    /// Save the selected triple. Clears the solution so the same puzzle is
    /// not submitted twice by accident.
    pub fn submit(&mut self) -> CoreResult<Puzzle> {
        let (creator, start, end, solution) = self.submission()?;
        let puzzle = self.puzzles.create(creator, start, end, solution)?;
        self.selection.solution = None;
        Ok(puzzle)
    }

    /// Puzzles of the current creator, newest first.
    pub fn my_puzzles(&self) -> CoreResult<Vec<PuzzleSummary>> {
        let creator = self
            .selection
            .creator
            .as_ref()
            .ok_or_else(|| CoreError::Validation("creator id is required".to_string()))?;

        let summaries = self
            .puzzles
            .list_for_creator(creator)?
            .into_iter()
            .map(|puzzle| {
                PuzzleSummary {
                    id: puzzle.id,
                    created_at: puzzle.created_at,
                    start: self.badge(puzzle.id, puzzle.start_player_id),
                    end: self.badge(puzzle.id, puzzle.end_player_id),
                    solution: self.badge(puzzle.id, puzzle.solution_player_id),
                }
            })
            .collect();
        Ok(summaries)
    }

    /// Players missing from the catalog get a placeholder so the row stays
    /// listed and deletable.
    fn badge(&self, puzzle_id: PuzzleId, id: PlayerId) -> PlayerBadge {
        match self.catalog.get(id) {
            Some(player) => PlayerBadge {
                id,
                display_name: player.display_name.clone(),
                headshot_url: self.headshots.url_for(player, HeadshotSize::Large),
            },
            None => {
                warn!(puzzle_id, player_id = id, "puzzle references a player missing from the catalog");
                PlayerBadge {
                    id,
                    display_name: format!("Unknown player #{id}"),
                    headshot_url: headshot_url(self.headshots.base_url(), id, false, HeadshotSize::Large),
                }
            }
        }
    }

    pub fn select_puzzle(&mut self, puzzle: Option<PuzzleId>) {
        self.selection.selected_puzzle = puzzle;
    }

    pub fn can_delete(&self) -> bool {
        self.selection.selected_puzzle.is_some()
    }

    pub fn delete_selected(&mut self) -> CoreResult<PuzzleId> {
        let id = self
            .selection
            .selected_puzzle
            .ok_or_else(|| CoreError::Validation("no puzzle selected".to_string()))?;
        self.puzzles.delete(id)?;
        self.selection.selected_puzzle = None;
        Ok(id)
    }
}
