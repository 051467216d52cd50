use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Parts with fewer units than this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// One inventory row, validated at the backend boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub id: String,
    pub part_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

impl Part {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }

    /// Validate a raw row as returned by the table endpoint.
    pub fn from_value(value: serde_json::Value) -> AppResult<Self> {
        let row: PartRow = serde_json::from_value(value)
            .map_err(|e| AppError::Backend(format!("Malformed part row: {}", e)))?;
        Part::try_from(row)
    }

    pub fn from_values(values: Vec<serde_json::Value>) -> AppResult<Vec<Self>> {
        values.into_iter().map(Part::from_value).collect()
    }
}

/// Row shape as stored by the backend, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartRow {
    pub id: String,
    pub part_id: String,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl TryFrom<PartRow> for Part {
    type Error = AppError;

    fn try_from(row: PartRow) -> Result<Self, Self::Error> {
        if row.id.is_empty() {
            return Err(AppError::Backend("Malformed part row: empty id".to_string()));
        }
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            AppError::Backend(format!(
                "Malformed part row {}: quantity {} out of range",
                row.id, row.quantity
            ))
        })?;
        if !row.price.is_finite() || row.price < 0.0 {
            return Err(AppError::Backend(format!(
                "Malformed part row {}: invalid price {}",
                row.id, row.price
            )));
        }

        Ok(Part {
            id: row.id,
            part_id: row.part_id,
            name: row.name,
            quantity,
            price: row.price,
            image_url: row.image_url.filter(|u| !u.is_empty()),
            updated_at: row.updated_at.unwrap_or(row.created_at),
            created_at: row.created_at,
            user_id: row.user_id,
        })
    }
}

/// Payload for creating a row. `id` and timestamps are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPart {
    pub part_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub image_url: Option<String>,
    pub user_id: String,
}

/// Columns overwritten by an update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl PartPatch {
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }
}
