//! Data access gateway.
//!
//! `TableGateway` is the seam to the remote tabular store: one page read,
//! one insert, one delete. `fetch_all` pages through a resource until the
//! data runs out and decodes every row into a typed record.

pub mod memory;
pub mod rest;

pub use memory::MemoryGateway;
pub use rest::RestGateway;

use crate::error::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Single-column row filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    Eq { column: String, value: String },
    IsNull { column: String },
    NotNull { column: String },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Filter::Eq { column: column.into(), value: value.to_string() }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Filter::IsNull { column: column.into() }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Filter::NotNull { column: column.into() }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::IsNull { column } | Filter::NotNull { column } => column,
        }
    }
}

/// One page of raw rows.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub rows: Vec<Value>,
    /// Exact row count of the filtered resource, when the backend reports it
    pub total: Option<usize>,
}

pub trait TableGateway {
    /// Rows `offset..offset + limit` of `resource` in server order.
    fn fetch_page(
        &self,
        resource: &str,
        filter: Option<&Filter>,
        offset: usize,
        limit: usize,
    ) -> CoreResult<Page>;

    /// Insert one record and return it as stored (with generated columns).
    fn insert(&self, resource: &str, record: Value) -> CoreResult<Value>;

    /// Delete by primary key `id`. Missing ids are not an error.
    fn delete(&self, resource: &str, id: i64) -> CoreResult<()>;
}

impl<G: TableGateway + ?Sized> TableGateway for &G {
    fn fetch_page(
        &self,
        resource: &str,
        filter: Option<&Filter>,
        offset: usize,
        limit: usize,
    ) -> CoreResult<Page> {
        (**self).fetch_page(resource, filter, offset, limit)
    }

    fn insert(&self, resource: &str, record: Value) -> CoreResult<Value> {
        (**self).insert(resource, record)
    }

    fn delete(&self, resource: &str, id: i64) -> CoreResult<()> {
        (**self).delete(resource, id)
    }
}

/// Raw rows of `resource`, all pages concatenated.
///
/// Stops once the reported total has been read, or on a short page when the
/// backend reports no total. Nothing is returned unless every page succeeded.
pub fn fetch_all_rows<G>(
    gateway: &G,
    resource: &str,
    filter: Option<&Filter>,
    page_size: usize,
) -> CoreResult<Vec<Value>>
where
    G: TableGateway + ?Sized,
{
    if page_size == 0 {
        return Err(CoreError::Validation("page size must be greater than zero".to_string()));
    }

    let mut rows = Vec::new();
    let mut offset = 0;
    loop {
        let page = gateway.fetch_page(resource, filter, offset, page_size)?;
        let fetched = page.rows.len();
        debug!(resource, offset, fetched, total = ?page.total, "fetched page");

        rows.extend(page.rows);
        offset += fetched;

        // Servers may cap a page below `page_size`, so a reported total wins
        // over the short-page rule.
        let done = match page.total {
            Some(total) => fetched == 0 || offset >= total,
            None => fetched < page_size,
        };
        if done {
            break;
        }
    }
    Ok(rows)
}

/// Typed variant of [`fetch_all_rows`]; a row that does not decode fails the whole fetch.
pub fn fetch_all<T, G>(
    gateway: &G,
    resource: &str,
    filter: Option<&Filter>,
    page_size: usize,
) -> CoreResult<Vec<T>>
where
    T: DeserializeOwned,
    G: TableGateway + ?Sized,
{
    fetch_all_rows(gateway, resource, filter, page_size)?
        .into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| CoreError::DataAccess(format!("Malformed row in '{resource}': {e}")))
        })
        .collect()
}
