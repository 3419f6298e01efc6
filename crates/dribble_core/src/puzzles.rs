//! Puzzle records keyed by creator.

use crate::error::{CoreError, CoreResult};
use crate::gateway::{fetch_all, Filter, TableGateway};
use crate::models::{NewPuzzle, PlayerId, Puzzle, PuzzleId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

const USERNAME_COLUMN: &str = "username";

/// Free-text creator label, trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CreatorId(String);

impl CreatorId {
    pub fn new(raw: &str) -> CoreResult<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(CoreError::Validation("creator id must not be empty".to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CreatorId {
    type Error = CoreError;

    fn try_from(raw: String) -> CoreResult<Self> {
        Self::new(&raw)
    }
}

impl From<CreatorId> for String {
    fn from(id: CreatorId) -> Self {
        id.0
    }
}

impl fmt::Display for CreatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct PuzzleStore<'g, G: TableGateway + ?Sized> {
    gateway: &'g G,
    resource: String,
    page_size: usize,
}

impl<'g, G: TableGateway + ?Sized> PuzzleStore<'g, G> {
    pub fn new(gateway: &'g G, resource: impl Into<String>, page_size: usize) -> Self {
        Self { gateway, resource: resource.into(), page_size }
    }

    /// Store a new puzzle. Start and end must differ; membership of the
    /// solution in the candidate set is checked by the session.
    pub fn create(
        &self,
        creator: &CreatorId,
        start_id: PlayerId,
        end_id: PlayerId,
        solution_id: PlayerId,
    ) -> CoreResult<Puzzle> {
        if start_id == end_id {
            return Err(CoreError::Validation(format!(
                "start and end player must differ (both {start_id})"
            )));
        }

        let record = NewPuzzle {
            username: creator.as_str().to_string(),
            start_player_id: start_id,
            end_player_id: end_id,
            solution_player_id: solution_id,
        };
        let stored = self.gateway.insert(&self.resource, serde_json::to_value(&record)?)?;
        let puzzle: Puzzle = serde_json::from_value(stored)?;

        info!(id = puzzle.id, creator = %creator, start_id, end_id, solution_id, "created puzzle");
        Ok(puzzle)
    }

    /// Puzzles of one creator, newest first.
    pub fn list_for_creator(&self, creator: &CreatorId) -> CoreResult<Vec<Puzzle>> {
        let filter = Filter::eq(USERNAME_COLUMN, creator.as_str());
        let mut puzzles: Vec<Puzzle> = fetch_all(self.gateway, &self.resource, Some(&filter), self.page_size)?;
        puzzles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(puzzles)
    }

    /// Deleting an id that no longer exists is not an error.
    pub fn delete(&self, puzzle_id: PuzzleId) -> CoreResult<()> {
        self.gateway.delete(&self.resource, puzzle_id)?;
        info!(id = puzzle_id, "deleted puzzle");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use serde_json::json;

    const RESOURCE: &str = "user_puzzles";

    #[test]
    fn test_creator_id_normalization() {
        assert_eq!(CreatorId::new("  jordan23 ").unwrap().as_str(), "JORDAN23");
        assert!(matches!(CreatorId::new("   "), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_creator_id_serde() {
        let id: CreatorId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(id.as_str(), "ABC");
        assert!(serde_json::from_value::<CreatorId>(json!("")).is_err());
    }

    #[test]
    fn test_create_list_delete_lifecycle() {
        let gateway = MemoryGateway::new();
        let store = PuzzleStore::new(&gateway, RESOURCE, 1000);
        let creator = CreatorId::new("mj").unwrap();

        let created = store.create(&creator, 1, 2, 3).unwrap();
        assert_eq!(created.username, "MJ");
        assert!(created.created_at.is_some());

        let listed = store.list_for_creator(&creator).unwrap();
        assert_eq!(listed, vec![created.clone()]);

        store.delete(created.id).unwrap();
        assert!(store.list_for_creator(&creator).unwrap().is_empty());
    }

    #[test]
    fn test_list_filters_by_creator_and_orders_newest_first() {
        let gateway = MemoryGateway::new();
        gateway.seed(
            RESOURCE,
            [
                json!({ "id": 1, "created_at": "2024-01-01T00:00:00+00:00", "username": "A", "start_player_id": 1, "end_player_id": 2, "solution_player_id": 3 }),
                json!({ "id": 2, "created_at": "2024-02-01T00:00:00+00:00", "username": "B", "start_player_id": 1, "end_player_id": 2, "solution_player_id": 3 }),
                json!({ "id": 3, "created_at": "2024-03-01T00:00:00+00:00", "username": "A", "start_player_id": 4, "end_player_id": 5, "solution_player_id": 6 }),
            ],
        ).unwrap();
        let store = PuzzleStore::new(&gateway, RESOURCE, 1);

        let ids: Vec<PuzzleId> = store
            .list_for_creator(&CreatorId::new("a").unwrap())
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, [3, 1]);
    }

    #[test]
    fn test_create_rejects_same_start_and_end() {
        let gateway = MemoryGateway::new();
        let store = PuzzleStore::new(&gateway, RESOURCE, 1000);
        let creator = CreatorId::new("x").unwrap();

        assert!(matches!(store.create(&creator, 5, 5, 6), Err(CoreError::Validation(_))));
        assert_eq!(gateway.row_count(RESOURCE), 0);
    }

    #[test]
    fn test_delete_missing_puzzle_is_tolerated() {
        let gateway = MemoryGateway::new();
        let store = PuzzleStore::new(&gateway, RESOURCE, 1000);
        store.delete(12345).unwrap();
    }
}
