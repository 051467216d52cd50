use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::compress::{self, ImageFile};
use crate::error::{AppError, AppResult, FormError};
use crate::inventory::{
    apply_delta, filter_parts, parse_delta, parse_price, parse_quantity, DashboardStats,
    PartDraft, StockOperation,
};
use crate::middleware::Identity;
use crate::models::Part;

use super::{require_identity, AppState, FormInput, FormResponse};

#[derive(Debug, Default, Deserialize)]
pub struct ListPartsQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStockReq {
    pub operation: StockOperation,
    pub change: FormInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriceReq {
    pub price: FormInput,
}

/// Raw fields of the add-part form.
#[derive(Debug, Default)]
struct AddPartForm {
    part_id: String,
    name: String,
    quantity: String,
    price: String,
    image: Option<ImageFile>,
}

impl AddPartForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = AddPartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?;
                    // An empty file input still submits a nameless, empty part
                    if !data.is_empty() {
                        form.image = Some(ImageFile {
                            file_name,
                            content_type,
                            data: data.to_vec(),
                        });
                    }
                }
                _ => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?;
                    match name.as_str() {
                        "part_id" => form.part_id = value,
                        "name" => form.name = value,
                        "quantity" => form.quantity = value,
                        "price" => form.price = value,
                        other => tracing::debug!("Ignoring unknown form field {}", other),
                    }
                }
            }
        }

        Ok(form)
    }

    fn draft(&self) -> AppResult<PartDraft> {
        let part_id = self.part_id.trim();
        let name = self.name.trim();
        if part_id.is_empty() || name.is_empty() {
            return Err(AppError::Validation(
                "Part ID and name are required".to_string(),
            ));
        }

        Ok(PartDraft {
            part_id: part_id.to_string(),
            name: name.to_string(),
            quantity: parse_quantity(&self.quantity)?,
            price: parse_price(&self.price)?,
        })
    }
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<Identity>>,
) -> Result<Json<DashboardStats>, FormError> {
    load_dashboard(&state, identity)
        .await
        .map(Json)
        .map_err(|e| e.or_notice("Error loading stats"))
}

async fn load_dashboard(
    state: &AppState,
    identity: Option<Extension<Identity>>,
) -> AppResult<DashboardStats> {
    let identity = require_identity(identity)?;
    let parts = state.inventory.list_parts(&identity).await?;
    Ok(DashboardStats::from_parts(&parts))
}

pub async fn list_parts(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<Identity>>,
    Query(query): Query<ListPartsQuery>,
) -> Result<Json<Vec<Part>>, FormError> {
    load_parts(&state, identity, query.search.as_deref().unwrap_or_default())
        .await
        .map(Json)
        .map_err(|e| e.or_notice("Error loading inventory"))
}

async fn load_parts(
    state: &AppState,
    identity: Option<Extension<Identity>>,
    search: &str,
) -> AppResult<Vec<Part>> {
    let identity = require_identity(identity)?;
    let parts = state.inventory.list_parts(&identity).await?;
    Ok(filter_parts(parts, search))
}

pub async fn search_part(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<Identity>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Part>, FormError> {
    let identity = require_identity(identity).map_err(|e| e.or_notice("Part not found"))?;
    state
        .inventory
        .search_one(&identity, &query.term)
        .await
        .map(Json)
        .map_err(|e| e.or_notice("Part not found"))
}

/// Add-part form: validate, compress the photo, upload it, then insert the row.
pub async fn add_part(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<Identity>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FormResponse>), FormError> {
    let part = create_part(&state, identity, multipart)
        .await
        .map_err(|e| e.or_notice("Error adding part"))?;

    tracing::info!(id = %part.id, part_id = %part.part_id, "Part added");
    Ok((
        StatusCode::CREATED,
        Json(FormResponse::with_part("Part added successfully!", part)),
    ))
}

async fn create_part(
    state: &AppState,
    identity: Option<Extension<Identity>>,
    multipart: Multipart,
) -> AppResult<Part> {
    let identity = require_identity(identity)?;
    let form = AddPartForm::read(multipart).await?;
    let draft = form.draft()?;

    let image = match form.image {
        Some(file) => Some(compress::compress(file, state.max_image_size_mb).await),
        None => None,
    };

    state.inventory.insert(&identity, draft, image).await
}

/// Update-stock form. The delta is validated before any backend call.
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStockReq>,
) -> Result<Json<FormResponse>, FormError> {
    let part = adjust_stock(&state, identity, &id, &req)
        .await
        .map_err(|e| e.or_notice("Error updating stock"))?;

    Ok(Json(FormResponse::with_part(
        format!("Stock updated successfully! New quantity: {}", part.quantity),
        part,
    )))
}

async fn adjust_stock(
    state: &AppState,
    identity: Option<Extension<Identity>>,
    id: &str,
    req: &UpdateStockReq,
) -> AppResult<Part> {
    let identity = require_identity(identity)?;
    let delta = parse_delta(&req.change.as_text())?;

    let mut part = state.inventory.get(&identity, id).await?;
    let new_quantity = apply_delta(part.quantity, req.operation, delta);
    state
        .inventory
        .update_quantity(&identity, id, new_quantity)
        .await?;

    part.quantity = new_quantity;
    Ok(part)
}

pub async fn update_price(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePriceReq>,
) -> Result<Json<FormResponse>, FormError> {
    set_price(&state, identity, &id, &req)
        .await
        .map_err(|e| e.or_notice("Error updating price"))?;

    Ok(Json(FormResponse::new("Price updated successfully!")))
}

async fn set_price(
    state: &AppState,
    identity: Option<Extension<Identity>>,
    id: &str,
    req: &UpdatePriceReq,
) -> AppResult<()> {
    let identity = require_identity(identity)?;
    let price = parse_price(&req.price.as_text())?;
    state.inventory.update_price(&identity, id, price).await
}

pub async fn delete_part(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
) -> Result<Json<FormResponse>, FormError> {
    let identity = require_identity(identity).map_err(|e| e.or_notice("Error deleting part"))?;
    state
        .inventory
        .delete(&identity, &id)
        .await
        .map_err(|e| e.or_notice("Error deleting part"))?;

    Ok(Json(FormResponse::new("Part deleted successfully")))
}
