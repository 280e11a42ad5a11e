use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Canonical food attributes, without store-assigned metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FoodFields {
    pub food_code: Option<String>,
    pub food_name: Option<String>,
    pub group_name: Option<String>,
    pub research_year: Option<String>,
    pub maker_name: Option<String>,
    pub reference_name: Option<String>,
    pub serving_size: Option<String>,

    pub calorie: Option<f64>,
    pub carbohydrate: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub sugars: Option<f64>,
    pub sodium: Option<f64>,
    pub cholesterol: Option<f64>,
    pub saturated_fatty_acids: Option<f64>,
    pub trans_fat: Option<f64>,
}

impl FoodFields {
    /// A record needs a name or a code to be addressable.
    pub fn has_identity(&self) -> bool {
        self.food_name.is_some() || self.food_code.is_some()
    }

    /// Human-readable handle for logs and failure reports.
    pub fn label(&self) -> Option<&str> {
        self.food_name.as_deref().or(self.food_code.as_deref())
    }
}

/// Persisted food record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FoodRecord {
    pub id: Uuid, // assigned by the store, immutable
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: FoodFields,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
