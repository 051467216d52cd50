use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::middleware::Identity;
use crate::models::{NewPart, Part, PartPatch};

use super::{Order, PartQuery, PartsTable};

/// In-process table used in local mode. Rows are scoped to their owner the
/// way the hosted table's row-level policies scope them.
pub struct MemoryTable {
    name: String,
    rows: RwLock<Vec<Part>>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PartsTable for MemoryTable {
    async fn select(&self, identity: &Identity, query: &PartQuery) -> AppResult<Vec<Part>> {
        let rows = self.rows.read().await;

        // (insertion index, row) so equal timestamps keep insertion order
        let mut selected: Vec<(usize, &Part)> = rows
            .iter()
            .enumerate()
            .filter(|(_, p)| p.user_id == identity.user_id && query.matches(p))
            .collect();

        match query.order {
            Some(Order::CreatedAtAsc) => {
                selected.sort_by(|a, b| (a.1.created_at, a.0).cmp(&(b.1.created_at, b.0)))
            }
            Some(Order::CreatedAtDesc) => {
                selected.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)))
            }
            None => {}
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(selected
            .into_iter()
            .take(limit)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn insert(&self, identity: &Identity, part: NewPart) -> AppResult<Part> {
        if part.user_id != identity.user_id {
            return Err(AppError::Backend(format!(
                "new row violates row-level security policy for table \"{}\"",
                self.name
            )));
        }

        let now = Utc::now();
        let row = Part {
            id: uuid::Uuid::new_v4().to_string(),
            part_id: part.part_id,
            name: part.name,
            quantity: part.quantity,
            price: part.price,
            image_url: part.image_url,
            created_at: now,
            updated_at: now,
            user_id: part.user_id,
        };

        self.rows.write().await.push(row.clone());
        tracing::debug!(table = %self.name, id = %row.id, "Inserted part");
        Ok(row)
    }

    async fn update(&self, identity: &Identity, id: &str, patch: PartPatch) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        if let Some(row) = rows
            .iter_mut()
            .find(|p| p.id == id && p.user_id == identity.user_id)
        {
            if let Some(quantity) = patch.quantity {
                row.quantity = quantity;
            }
            if let Some(price) = patch.price {
                row.price = price;
            }
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, identity: &Identity, id: &str) -> AppResult<()> {
        self.rows
            .write()
            .await
            .retain(|p| !(p.id == id && p.user_id == identity.user_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(user_id: &str) -> Identity {
        Identity {
            user_id: user_id.to_string(),
            access_token: "token".to_string(),
            email: None,
        }
    }

    fn new_part(part_id: &str, user_id: &str) -> NewPart {
        NewPart {
            part_id: part_id.to_string(),
            name: "Brake Pad".to_string(),
            quantity: 1,
            price: 10.0,
            image_url: None,
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_rows_are_scoped_to_owner() {
        let table = MemoryTable::new("spare_parts");
        let alice = identity("alice");
        let bob = identity("bob");
        table.insert(&alice, new_part("BRK-001", "alice")).await.unwrap();

        assert_eq!(table.select(&alice, &PartQuery::all()).await.unwrap().len(), 1);
        assert!(table.select(&bob, &PartQuery::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_for_other_user_is_rejected() {
        let table = MemoryTable::new("spare_parts");
        let err = table
            .insert(&identity("alice"), new_part("BRK-001", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
    }

    #[tokio::test]
    async fn test_order_and_limit() {
        let table = MemoryTable::new("spare_parts");
        let alice = identity("alice");
        for code in ["A-1", "A-2", "A-3"] {
            table.insert(&alice, new_part(code, "alice")).await.unwrap();
        }

        let newest = table
            .select(&alice, &PartQuery::all().order(Order::CreatedAtDesc).limit(2))
            .await
            .unwrap();
        let codes: Vec<_> = newest.iter().map(|p| p.part_id.as_str()).collect();
        assert_eq!(codes, vec!["A-3", "A-2"]);

        let oldest = table
            .select(&alice, &PartQuery::all().order(Order::CreatedAtAsc).limit(1))
            .await
            .unwrap();
        assert_eq!(oldest[0].part_id, "A-1");
    }

    #[tokio::test]
    async fn test_search_treats_like_wildcards_literally() {
        let table = MemoryTable::new("spare_parts");
        let alice = identity("alice");
        table.insert(&alice, new_part("PAD_50%", "alice")).await.unwrap();
        table.insert(&alice, new_part("PADX50", "alice")).await.unwrap();

        let found = table
            .select(&alice, &PartQuery::matching("d_50%"))
            .await
            .unwrap();
        let codes: Vec<_> = found.iter().map(|p| p.part_id.as_str()).collect();
        assert_eq!(codes, vec!["PAD_50%"]);
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at() {
        let table = MemoryTable::new("spare_parts");
        let alice = identity("alice");
        let part = table.insert(&alice, new_part("BRK-001", "alice")).await.unwrap();

        table
            .update(&alice, &part.id, PartPatch::price(12.5))
            .await
            .unwrap();
        let updated = table
            .select(&alice, &PartQuery::by_id(&part.id))
            .await
            .unwrap()
            .remove(0);
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.quantity, 1);
        assert_eq!(updated.created_at, part.created_at);
        assert!(updated.updated_at >= part.updated_at);
    }
}
