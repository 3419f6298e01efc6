//! Player catalog.
//!
//! Loaded once per session from the players resource and kept as an
//! immutable snapshot: an id index for lookups plus a name-sorted id list
//! for pickers.

use crate::config::ResourceNames;
use crate::error::{CoreError, CoreResult};
use crate::gateway::{fetch_all, TableGateway};
use crate::models::{Player, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

/// Rank a player needs to be picked for a random puzzle.
pub const RANDOM_PUZZLE_MIN_RANK: u32 = 200;

#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: FxHashMap<PlayerId, Player>,
    /// Ids ordered by `(sort_name, id)`
    sorted_ids: Vec<PlayerId>,
}

impl PlayerCatalog {
    pub fn load<G>(gateway: &G, resources: &ResourceNames, page_size: usize) -> CoreResult<Self>
    where
        G: TableGateway + ?Sized,
    {
        let players: Vec<Player> = fetch_all(gateway, &resources.players, None, page_size)?;
        let catalog = Self::from_players(players);
        info!(players = catalog.len(), "loaded player catalog");
        Ok(catalog)
    }

    /// Later rows win on duplicate ids.
    pub fn from_players<I>(players: I) -> Self
    where
        I: IntoIterator<Item = Player>,
    {
        let mut index = FxHashMap::default();
        for player in players {
            if let Some(previous) = index.insert(player.id, player) {
                warn!(id = previous.id, "duplicate player id in catalog, keeping last row");
            }
        }

        let mut sorted_ids: Vec<PlayerId> = index.keys().copied().collect();
        sorted_ids.sort_by(|a, b| {
            let (pa, pb) = (&index[a], &index[b]);
            pa.sort_name().cmp(pb.sort_name()).then(pa.id.cmp(&pb.id))
        });

        Self { players: index, sorted_ids }
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn require(&self, id: PlayerId) -> CoreResult<&Player> {
        self.get(id).ok_or_else(|| CoreError::player_not_found(id))
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in name order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &Player> + '_ {
        self.sorted_ids.iter().filter_map(|id| self.players.get(id))
    }

    /// Case-insensitive substring match on display name, in name order.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Player> + 'a {
        let needle = query.trim().to_lowercase();
        self.iter_sorted().filter(move |p| p.display_name.to_lowercase().contains(&needle))
    }

    /// Two distinct players ranked above `min_rank`, or `None` if fewer than two qualify.
    pub fn random_pair<R: Rng + ?Sized>(&self, rng: &mut R, min_rank: u32) -> Option<(PlayerId, PlayerId)> {
        let eligible: Vec<PlayerId> = self
            .iter_sorted()
            .filter(|p| p.search_rank > min_rank)
            .map(|p| p.id)
            .collect();

        let picked: Vec<PlayerId> = eligible.choose_multiple(rng, 2).copied().collect();
        match picked.as_slice() {
            [start, end] => Some((*start, *end)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    fn player(id: PlayerId, name: &str, rank: u32) -> Player {
        Player {
            id,
            name: name.to_string(),
            display_name: name.to_string(),
            last_name: name.split(' ').last().unwrap_or_default().to_string(),
            has_headshot: true,
            search_rank: rank,
        }
    }

    #[test]
    fn test_load_indexes_and_sorts_by_name() {
        let gateway = MemoryGateway::new();
        gateway.seed(
            "players",
            [
                json!({ "id": 3, "name": "Zach LaVine", "display_name": "Zach LaVine", "last_name": "LaVine", "has_headshot": true, "search_rank": 400 }),
                json!({ "id": 1, "name": "Allen Iverson", "display_name": "Allen Iverson", "last_name": "Iverson", "has_headshot": false, "search_rank": 700 }),
                json!({ "id": 2, "name": "Kobe Bryant", "display_name": "Kobe Bryant", "last_name": "Bryant", "has_headshot": true, "search_rank": 745 }),
            ],
        ).unwrap();

        let catalog = PlayerCatalog::load(&gateway, &ResourceNames::default(), 2).unwrap();

        assert_eq!(catalog.len(), 3);
        let names: Vec<&str> = catalog.iter_sorted().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, ["Allen Iverson", "Kobe Bryant", "Zach LaVine"]);
        assert_eq!(catalog.require(2).unwrap().last_name, "Bryant");
        assert_eq!(gateway.page_requests(), 2);
    }

    #[test]
    fn test_require_missing_player() {
        let catalog = PlayerCatalog::from_players([player(1, "A", 0)]);
        assert!(matches!(catalog.require(9), Err(CoreError::NotFound { .. })));
    }

    #[test]
    fn test_reload_is_equivalent_snapshot() {
        let gateway = MemoryGateway::new();
        gateway.seed("players", (1..=5).map(|i| json!({ "id": i, "display_name": format!("P{i}") }))).unwrap();

        let first = PlayerCatalog::load(&gateway, &ResourceNames::default(), 1000).unwrap();
        let second = PlayerCatalog::load(&gateway, &ResourceNames::default(), 1000).unwrap();

        let ids = |c: &PlayerCatalog| c.iter_sorted().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_duplicate_ids_keep_last_row() {
        let catalog = PlayerCatalog::from_players([player(1, "Old", 1), player(1, "New", 2)]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.require(1).unwrap().display_name, "New");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = PlayerCatalog::from_players([
            player(1, "LeBron James", 745),
            player(2, "Mike James", 100),
            player(3, "Stephen Curry", 740),
        ]);
        let hits: Vec<PlayerId> = catalog.search("JAMES").map(|p| p.id).collect();
        assert_eq!(hits, [1, 2]);
    }

    #[test]
    fn test_random_pair_respects_rank_threshold() {
        let catalog = PlayerCatalog::from_players([
            player(1, "A", 201),
            player(2, "B", 200),
            player(3, "C", 500),
            player(4, "D", 10),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            let (start, end) = catalog.random_pair(&mut rng, RANDOM_PUZZLE_MIN_RANK).unwrap();
            assert_ne!(start, end);
            assert!([1, 3].contains(&start) && [1, 3].contains(&end));
        }
    }

    #[test]
    fn test_random_pair_needs_two_candidates() {
        let catalog = PlayerCatalog::from_players([player(1, "A", 300), player(2, "B", 5)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(catalog.random_pair(&mut rng, RANDOM_PUZZLE_MIN_RANK), None);
    }
}
