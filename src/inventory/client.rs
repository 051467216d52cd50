use std::sync::Arc;

use chrono::Utc;

use crate::backend::{Order, PartQuery, PartsTable};
use crate::compress::ImageFile;
use crate::error::{AppError, AppResult};
use crate::inventory::stock::valid_price;
use crate::middleware::Identity;
use crate::models::{NewPart, Part, PartPatch};
use crate::storage::{object_key, StorageBackend};

/// Fields of a new part as entered by the user, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct PartDraft {
    pub part_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

/// Typed access to the parts table and the part-image bucket.
///
/// Every call takes the caller's [`Identity`]; the client keeps no session
/// state and no cache, so each call reflects the backend's current rows.
/// Updates overwrite unconditionally: concurrent writers to one row race and
/// the last write wins.
#[derive(Clone)]
pub struct InventoryClient {
    table: Arc<dyn PartsTable>,
    storage: Arc<dyn StorageBackend>,
}

impl InventoryClient {
    pub fn new(table: Arc<dyn PartsTable>, storage: Arc<dyn StorageBackend>) -> Self {
        Self { table, storage }
    }

    /// All parts visible to the caller, newest first.
    pub async fn list_parts(&self, identity: &Identity) -> AppResult<Vec<Part>> {
        self.table
            .select(identity, &PartQuery::all().order(Order::CreatedAtDesc))
            .await
    }

    /// First part (oldest by creation time) whose `part_id` or `name`
    /// contains `term`, ignoring case.
    pub async fn search_one(&self, identity: &Identity, term: &str) -> AppResult<Part> {
        let query = PartQuery::matching(term.trim())
            .order(Order::CreatedAtAsc)
            .limit(1);
        self.table
            .select(identity, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Part not found".to_string()))
    }

    pub async fn get(&self, identity: &Identity, id: &str) -> AppResult<Part> {
        self.table
            .select(identity, &PartQuery::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Part not found".to_string()))
    }

    /// Store the image (if any) then create the row pointing at it.
    ///
    /// A failed upload fails the whole insert and no row is created. A failed
    /// row insert after a successful upload leaves the object behind.
    pub async fn insert(
        &self,
        identity: &Identity,
        draft: PartDraft,
        image: Option<ImageFile>,
    ) -> AppResult<Part> {
        if !valid_price(draft.price) {
            return Err(AppError::Validation(
                "Price must be a non-negative number".to_string(),
            ));
        }

        let image_url = match image {
            Some(file) => {
                let key = object_key(
                    &identity.user_id,
                    &file.file_name,
                    Utc::now().timestamp_millis(),
                );
                let key = self
                    .storage
                    .upload(identity, &key, &file.data, &file.content_type)
                    .await?;
                Some(self.storage.public_url(&key))
            }
            None => None,
        };

        self.table
            .insert(
                identity,
                NewPart {
                    part_id: draft.part_id,
                    name: draft.name,
                    quantity: draft.quantity,
                    price: draft.price,
                    image_url,
                    user_id: identity.user_id.clone(),
                },
            )
            .await
    }

    pub async fn update_quantity(
        &self,
        identity: &Identity,
        id: &str,
        new_quantity: u32,
    ) -> AppResult<()> {
        self.table
            .update(identity, id, PartPatch::quantity(new_quantity))
            .await
    }

    pub async fn update_price(&self, identity: &Identity, id: &str, new_price: f64) -> AppResult<()> {
        if !valid_price(new_price) {
            return Err(AppError::Validation(
                "Price must be a non-negative number".to_string(),
            ));
        }
        self.table
            .update(identity, id, PartPatch::price(new_price))
            .await
    }

    /// Remove the row. Its stored image, if any, stays in the bucket.
    pub async fn delete(&self, identity: &Identity, id: &str) -> AppResult<()> {
        self.table.delete(identity, id).await
    }
}
