//! PostgREST (Supabase) backend.

use super::{Filter, Page, TableGateway};
use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct RestGateway {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl RestGateway {
    pub fn new(config: &StoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Ok(Self {
            agent,
            base_url: config.rest_base_url(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: &str, resource: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}/{}", self.base_url, resource))
            .set("apikey", &self.api_key)
            .set("Authorization", &format!("Bearer {}", self.api_key))
    }
}

/// PostgREST query parameter for a filter, as `(column, operator.value)`.
pub(crate) fn filter_param(filter: &Filter) -> (&str, String) {
    match filter {
        Filter::Eq { column, value } => (column.as_str(), format!("eq.{value}")),
        Filter::IsNull { column } => (column.as_str(), "is.null".to_string()),
        Filter::NotNull { column } => (column.as_str(), "not.is.null".to_string()),
    }
}

/// Total from a `Content-Range` header such as `0-999/2345` or `*/0`.
pub(crate) fn parse_content_range_total(header: &str) -> Option<usize> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}

impl TableGateway for RestGateway {
    fn fetch_page(
        &self,
        resource: &str,
        filter: Option<&Filter>,
        offset: usize,
        limit: usize,
    ) -> CoreResult<Page> {
        let mut request = self
            .request("GET", resource)
            .set("Prefer", "count=exact")
            .query("select", "*")
            .query("offset", &offset.to_string())
            .query("limit", &limit.to_string());
        if let Some(filter) = filter {
            let (column, expr) = filter_param(filter);
            request = request.query(column, &expr);
        }

        let response = request.call()?;
        let total = response.header("Content-Range").and_then(parse_content_range_total);
        let rows: Vec<Value> = response.into_json()?;
        debug!(resource, offset, rows = rows.len(), "GET page");

        Ok(Page { rows, total })
    }

    fn insert(&self, resource: &str, record: Value) -> CoreResult<Value> {
        let response = self
            .request("POST", resource)
            .set("Prefer", "return=representation")
            .send_json(Value::Array(vec![record]))?;
        inserted_row(resource, response)
    }

    fn delete(&self, resource: &str, id: i64) -> CoreResult<()> {
        self.request("DELETE", resource).query("id", &format!("eq.{id}")).call()?;
        Ok(())
    }
}

/// First row of a `return=representation` insert response.
fn inserted_row(resource: &str, response: ureq::Response) -> CoreResult<Value> {
    let mut inserted: Vec<Value> = response.into_json()?;
    if inserted.is_empty() {
        return Err(CoreError::DataAccess(format!("insert into '{resource}' returned no rows")));
    }
    Ok(inserted.swap_remove(0))
}
