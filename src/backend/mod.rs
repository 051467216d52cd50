//! Remote table holding part rows.
//!
//! [`PartsTable`] is the whole contract the inventory needs from the hosted
//! backend: filtered select, insert, update by id and delete by id. Row-level
//! access control is applied by the backend from the caller's identity.

pub mod memory;
pub mod rest;

pub use memory::MemoryTable;
pub use rest::RestTable;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::middleware::Identity;
use crate::models::{NewPart, Part, PartPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    CreatedAtAsc,
    CreatedAtDesc,
}

/// Select filter. All set conditions must hold; the search term matches
/// `part_id` OR `name`, case-insensitively, anywhere in the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartQuery {
    pub id: Option<String>,
    pub search: Option<String>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl PartQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            limit: Some(1),
            ..Default::default()
        }
    }

    pub fn matching(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `part` satisfies the id and search conditions.
    pub fn matches(&self, part: &Part) -> bool {
        if let Some(id) = &self.id {
            if &part.id != id {
                return false;
            }
        }
        match &self.search {
            Some(term) => {
                contains_ignore_case(&part.part_id, term) || contains_ignore_case(&part.name, term)
            }
            None => true,
        }
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
pub trait PartsTable: Send + Sync {
    async fn select(&self, identity: &Identity, query: &PartQuery) -> AppResult<Vec<Part>>;

    /// Create a row and return it with its backend-assigned fields.
    async fn insert(&self, identity: &Identity, part: NewPart) -> AppResult<Part>;

    /// Overwrite the patched columns of the row with `id`. Matching no row is not an error.
    async fn update(&self, identity: &Identity, id: &str, patch: PartPatch) -> AppResult<()>;

    async fn delete(&self, identity: &Identity, id: &str) -> AppResult<()>;
}
