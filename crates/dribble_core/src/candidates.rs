//! One-shot solution candidates.
//!
//! A candidate is a player who was a teammate of both the start and the end
//! player. Candidates are enriched with the shared-season details from both
//! sides and ranked by popularity, most notable first.

use crate::catalog::PlayerCatalog;
use crate::error::CoreResult;
use crate::gateway::TableGateway;
use crate::models::{Player, PlayerId, TeammateRecord};
use crate::teammates::TeammateIndex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Shared-season details between a candidate and one endpoint of the puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SharedSeasons {
    pub last_season: Option<String>,
    pub seasons: Vec<String>,
    pub years: u32,
}

impl From<&TeammateRecord> for SharedSeasons {
    fn from(record: &TeammateRecord) -> Self {
        Self {
            last_season: record.last_season_teammates.clone(),
            seasons: record.seasons_teammates.clone(),
            years: record.years_teammates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCandidate {
    pub player: Player,
    pub with_start: SharedSeasons,
    pub with_end: SharedSeasons,
    pub total_shared_seasons: u32,
}

impl EnrichedCandidate {
    pub fn id(&self) -> PlayerId {
        self.player.id
    }
}

/// First record per teammate; later duplicates are ignored.
fn by_teammate(records: &[TeammateRecord]) -> FxHashMap<PlayerId, &TeammateRecord> {
    let mut map = FxHashMap::default();
    for record in records {
        map.entry(record.player_b).or_insert(record);
    }
    map
}

/// Teammate ids present on both sides, in start-side order, each once.
pub fn intersect_teammates(start: &[TeammateRecord], end: &[TeammateRecord]) -> Vec<PlayerId> {
    let end_ids: FxHashSet<PlayerId> = end.iter().map(|r| r.player_b).collect();
    let mut seen = FxHashSet::default();
    start
        .iter()
        .map(|r| r.player_b)
        .filter(|id| end_ids.contains(id) && seen.insert(*id))
        .collect()
}

/// Join the intersection with the catalog and both teammate slices, then rank.
pub fn rank_candidates(
    catalog: &PlayerCatalog,
    start: &[TeammateRecord],
    end: &[TeammateRecord],
) -> CoreResult<Vec<EnrichedCandidate>> {
    let start_by_id = by_teammate(start);
    let end_by_id = by_teammate(end);

    let mut candidates = intersect_teammates(start, end)
        .into_iter()
        .map(|id| {
            let player = catalog.require(id)?.clone();
            let with_start = SharedSeasons::from(start_by_id[&id]);
            let with_end = SharedSeasons::from(end_by_id[&id]);
            let total_shared_seasons = with_start.years + with_end.years;
            Ok(EnrichedCandidate { player, with_start, with_end, total_shared_seasons })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    // Stable: equal ranks keep start-side order.
    candidates.sort_by(|a, b| b.player.search_rank.cmp(&a.player.search_rank));
    Ok(candidates)
}

/// One-shot solutions for a start/end pair.
///
/// Both ids must be in the catalog. An empty result is a normal outcome.
/// `start_id == end_id` is accepted and yields the teammates of that player.
pub fn compute_candidates<G>(
    catalog: &PlayerCatalog,
    teammates: &TeammateIndex<'_, G>,
    start_id: PlayerId,
    end_id: PlayerId,
) -> CoreResult<Vec<EnrichedCandidate>>
where
    G: TableGateway + ?Sized,
{
    catalog.require(start_id)?;
    catalog.require(end_id)?;

    let start = teammates.teammates_of(start_id)?;
    let end = teammates.teammates_of(end_id)?;

    rank_candidates(catalog, &start, &end)
}
