//! Per-player slices of the teammate relation.

use crate::error::CoreResult;
use crate::gateway::{fetch_all, Filter, TableGateway};
use crate::models::{PlayerId, TeammateRecord};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

const PLAYER_A_COLUMN: &str = "player_a";

/// Teammate lookups memoized by player id for the lifetime of the index.
pub struct TeammateIndex<'g, G: TableGateway + ?Sized> {
    gateway: &'g G,
    resource: String,
    page_size: usize,
    memo: RefCell<FxHashMap<PlayerId, Rc<[TeammateRecord]>>>,
}

impl<'g, G: TableGateway + ?Sized> TeammateIndex<'g, G> {
    pub fn new(gateway: &'g G, resource: impl Into<String>, page_size: usize) -> Self {
        Self {
            gateway,
            resource: resource.into(),
            page_size,
            memo: RefCell::new(FxHashMap::default()),
        }
    }

    /// Every row with `player_a == player_id`. A failed fetch is not memoized.
    pub fn teammates_of(&self, player_id: PlayerId) -> CoreResult<Rc<[TeammateRecord]>> {
        if let Some(records) = self.memo.borrow().get(&player_id) {
            return Ok(Rc::clone(records));
        }

        let filter = Filter::eq(PLAYER_A_COLUMN, player_id);
        let records: Rc<[TeammateRecord]> =
            fetch_all::<TeammateRecord, _>(self.gateway, &self.resource, Some(&filter), self.page_size)?.into();
        debug!(player_id, teammates = records.len(), "fetched teammates");

        self.memo.borrow_mut().insert(player_id, Rc::clone(&records));
        Ok(records)
    }

    /// Drop memoized lookups so the next call reads the store again.
    pub fn clear(&self) {
        self.memo.borrow_mut().clear();
    }

    pub fn cached_players(&self) -> usize {
        self.memo.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::gateway::{MemoryGateway, Page};
    use serde_json::{json, Value};

    const RESOURCE: &str = "teammates_season_details";

    fn gateway_with_rows() -> MemoryGateway {
        let gateway = MemoryGateway::new();
        gateway.seed(
            RESOURCE,
            (0..7u32).map(|i| {
                json!({
                    "player_a": if i < 5 { 1 } else { 2 },
                    "player_b": 100 + i,
                    "last_season_teammates": 2020,
                    "seasons_teammates": [2019, 2020],
                    "years_teammates": 2
                })
            }),
        ).unwrap();
        gateway
    }

    #[test]
    fn test_teammates_of_returns_complete_set() {
        let gateway = gateway_with_rows();
        let index = TeammateIndex::new(&gateway, RESOURCE, 2);

        let records = index.teammates_of(1).unwrap();
        let ids: Vec<PlayerId> = records.iter().map(|r| r.player_b).collect();
        assert_eq!(ids, [100, 101, 102, 103, 104]);
        assert!(records.iter().all(|r| r.player_a == 1));
    }

    #[test]
    fn test_teammates_of_is_memoized() {
        let gateway = gateway_with_rows();
        let index = TeammateIndex::new(&gateway, RESOURCE, 1000);

        index.teammates_of(2).unwrap();
        index.teammates_of(2).unwrap();
        assert_eq!(gateway.page_requests(), 1);
        assert_eq!(index.cached_players(), 1);

        index.clear();
        index.teammates_of(2).unwrap();
        assert_eq!(gateway.page_requests(), 2);
    }

    #[test]
    fn test_unknown_player_has_no_teammates() {
        let gateway = gateway_with_rows();
        let index = TeammateIndex::new(&gateway, RESOURCE, 1000);
        assert!(index.teammates_of(999).unwrap().is_empty());
    }

    struct FailingGateway;

    impl TableGateway for FailingGateway {
        fn fetch_page(&self, _: &str, _: Option<&Filter>, _: usize, _: usize) -> CoreResult<Page> {
            Err(CoreError::DataAccess("connection refused".to_string()))
        }

        fn insert(&self, _: &str, _: Value) -> CoreResult<Value> {
            Err(CoreError::DataAccess("connection refused".to_string()))
        }

        fn delete(&self, _: &str, _: i64) -> CoreResult<()> {
            Err(CoreError::DataAccess("connection refused".to_string()))
        }
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let index = TeammateIndex::new(&FailingGateway, RESOURCE, 1000);
        assert!(matches!(index.teammates_of(1), Err(CoreError::DataAccess(_))));
        assert_eq!(index.cached_players(), 0);
    }
}
