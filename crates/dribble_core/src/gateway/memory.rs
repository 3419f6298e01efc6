//! In-process table store.
//!
//! Backs the tests and the CLI's `--offline` mode. Behaves like the REST
//! store for the operations the tool uses: server order is insertion order,
//! inserts get an `id` and `created_at`, deleting a missing id is a no-op.

use super::{Filter, Page, TableGateway};
use crate::error::{CoreError, CoreResult};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<FxHashMap<String, Vec<Value>>>,
    page_requests: AtomicUsize,
    report_totals: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self { report_totals: true, ..Self::default() }
    }

    /// Behave like a backend that does not report exact counts.
    pub fn without_totals(mut self) -> Self {
        self.report_totals = false;
        self
    }

    /// Build from a JSON object mapping resource names to arrays of rows.
    pub fn from_fixture_json(content: &str) -> CoreResult<Self> {
        let fixture: FxHashMap<String, Vec<Value>> = serde_json::from_str(content)?;
        let gateway = Self::new();
        for (resource, rows) in fixture {
            gateway.seed(&resource, rows)?;
        }
        Ok(gateway)
    }

    pub fn from_fixture_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_fixture_json(&content)
    }

    /// Append rows to `resource` as-is.
    pub fn seed<I>(&self, resource: &str, rows: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = Value>,
    {
        self.lock()?.entry(resource.to_string()).or_default().extend(rows);
        Ok(())
    }

    /// Number of `fetch_page` calls served so far.
    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    pub fn row_count(&self, resource: &str) -> usize {
        self.lock().map(|tables| tables.get(resource).map_or(0, Vec::len)).unwrap_or(0)
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, FxHashMap<String, Vec<Value>>>> {
        self.tables
            .lock()
            .map_err(|_| CoreError::DataAccess("memory store lock poisoned".to_string()))
    }
}

fn column_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let cell = row.get(filter.column()).unwrap_or(&Value::Null);
    match filter {
        Filter::Eq { value, .. } => column_text(cell).as_deref() == Some(value.as_str()),
        Filter::IsNull { .. } => cell.is_null(),
        Filter::NotNull { .. } => !cell.is_null(),
    }
}

fn row_id(row: &Value) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

impl TableGateway for MemoryGateway {
    fn fetch_page(
        &self,
        resource: &str,
        filter: Option<&Filter>,
        offset: usize,
        limit: usize,
    ) -> CoreResult<Page> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);

        let tables = self.lock()?;
        let matching: Vec<&Value> = tables
            .get(resource)
            .map(|rows| rows.iter().filter(|row| filter.map_or(true, |f| matches(row, f))).collect())
            .unwrap_or_default();

        let rows = matching.iter().skip(offset).take(limit).map(|row| (*row).clone()).collect();
        Ok(Page { rows, total: self.report_totals.then_some(matching.len()) })
    }

    fn insert(&self, resource: &str, record: Value) -> CoreResult<Value> {
        let Value::Object(mut fields) = record else {
            return Err(CoreError::DataAccess(format!("insert into '{resource}' expects an object")));
        };

        let mut tables = self.lock()?;
        let rows = tables.entry(resource.to_string()).or_default();

        if !fields.contains_key("id") {
            let next_id = rows.iter().filter_map(row_id).max().unwrap_or(0) + 1;
            fields.insert("id".to_string(), Value::from(next_id));
        }
        if !fields.contains_key("created_at") {
            fields.insert("created_at".to_string(), Value::from(chrono::Utc::now().to_rfc3339()));
        }

        let stored = Value::Object(fields);
        rows.push(stored.clone());
        Ok(stored)
    }

    fn delete(&self, resource: &str, id: i64) -> CoreResult<()> {
        let mut tables = self.lock()?;
        if let Some(rows) = tables.get_mut(resource) {
            rows.retain(|row| row_id(row) != Some(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_assigns_id_and_timestamp() {
        let gateway = MemoryGateway::new();
        gateway.seed("t", [json!({ "id": 41 })]).unwrap();

        let stored = gateway.insert("t", json!({ "name": "x" })).unwrap();
        assert_eq!(stored["id"], 42);
        assert!(stored["created_at"].is_string());
        assert_eq!(gateway.row_count("t"), 2);
    }

    #[test]
    fn test_insert_rejects_non_objects() {
        let gateway = MemoryGateway::new();
        assert!(gateway.insert("t", json!([1, 2])).is_err());
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let gateway = MemoryGateway::new();
        gateway.seed("t", [json!({ "id": 1 }), json!({ "id": 2 })]).unwrap();

        gateway.delete("t", 99).unwrap();
        gateway.delete("missing_table", 1).unwrap();
        assert_eq!(gateway.row_count("t"), 2);

        gateway.delete("t", 1).unwrap();
        assert_eq!(gateway.row_count("t"), 1);
    }

    #[test]
    fn test_null_filters() {
        let gateway = MemoryGateway::new();
        gateway.seed("t", [json!({ "id": 1, "v": null }), json!({ "id": 2, "v": 5 }), json!({ "id": 3 })]).unwrap();

        let nulls = gateway.fetch_page("t", Some(&Filter::is_null("v")), 0, 10).unwrap();
        let present = gateway.fetch_page("t", Some(&Filter::not_null("v")), 0, 10).unwrap();

        assert_eq!(nulls.rows.len(), 2);
        assert_eq!(present.rows.len(), 1);
        assert_eq!(present.total, Some(1));
    }

    #[test]
    fn test_eq_filter_compares_text() {
        let gateway = MemoryGateway::new();
        gateway.seed("t", [json!({ "username": "ABC" }), json!({ "username": "abc" })]).unwrap();

        let page = gateway.fetch_page("t", Some(&Filter::eq("username", "ABC")), 0, 10).unwrap();
        assert_eq!(page.rows.len(), 1);
    }

    #[test]
    fn test_fixture_loading() {
        let gateway = MemoryGateway::from_fixture_json(
            r#"{ "players": [{ "id": 1 }, { "id": 2 }], "user_puzzles": [] }"#,
        )
        .unwrap();
        assert_eq!(gateway.row_count("players"), 2);
        assert_eq!(gateway.row_count("user_puzzles"), 0);
    }

    #[test]
    fn test_seed_reports_poisoned_lock() {
        let gateway = MemoryGateway::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _tables = gateway.tables.lock().unwrap();
            panic!("poison the table lock");
        }));

        let err = gateway.seed("t", [json!({ "id": 1 })]).unwrap_err();
        assert!(matches!(err, CoreError::DataAccess(_)));
    }
}
