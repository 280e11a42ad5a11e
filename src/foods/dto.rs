use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, FieldError};
use crate::foods::query::FoodFilter;
use crate::foods::repo_types::{FoodFields, FoodRecord};
use crate::import::numeric;
use crate::import::sheet::CellValue;

/// Query string for `GET /foods`. Pagination stays raw so bad values get a field-level 400.
#[derive(Debug, Default, Deserialize)]
pub struct ListFoodsParams {
    pub food_name: Option<String>,
    pub research_year: Option<String>,
    pub maker_name: Option<String>,
    pub food_code: Option<String>,
    pub page: Option<String>,
    #[serde(alias = "perPage")]
    pub per_page: Option<String>,
}

impl ListFoodsParams {
    pub fn filter(&self) -> FoodFilter {
        FoodFilter {
            food_name: self.food_name.clone(),
            maker_name: self.maker_name.clone(),
            research_year: self.research_year.clone(),
            food_code: self.food_code.clone(),
        }
        .normalized()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FoodPage {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub items: Vec<FoodRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: Uuid,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Body for create and full replace. Accepts the legacy `food_cd`/`ref_name` keys.
#[derive(Debug, Default, Deserialize)]
pub struct FoodPayload {
    #[serde(default, alias = "food_cd", deserialize_with = "de_text")]
    pub food_code: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub food_name: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub group_name: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub research_year: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub maker_name: Option<String>,
    #[serde(default, alias = "ref_name", deserialize_with = "de_text")]
    pub reference_name: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub serving_size: Option<String>,

    #[serde(default)]
    pub calorie: Option<Value>,
    #[serde(default)]
    pub carbohydrate: Option<Value>,
    #[serde(default)]
    pub protein: Option<Value>,
    #[serde(default)]
    pub fat: Option<Value>,
    #[serde(default)]
    pub sugars: Option<Value>,
    #[serde(default)]
    pub sodium: Option<Value>,
    #[serde(default)]
    pub cholesterol: Option<Value>,
    #[serde(default)]
    pub saturated_fatty_acids: Option<Value>,
    #[serde(default)]
    pub trans_fat: Option<Value>,
}

/// Strings are trimmed (blank becomes absent). Numbers render the way imported
/// cells do, so `2024.0` is stored as `"2024"`.
fn de_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => CellValue::Number(f).as_text(),
            None => Some(n.to_string()),
        },
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn nutrient(name: &str, v: Option<Value>, errors: &mut Vec<FieldError>) -> Option<f64> {
    match v {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match n.as_f64().filter(|f| f.is_finite()) {
            Some(f) => Some(f),
            None => {
                errors.push(FieldError::new(name, format!("{name} must be a finite number")));
                None
            }
        },
        Some(Value::String(s)) if numeric::is_sentinel(&s) => None,
        Some(Value::String(s)) => match numeric::normalize_text(&s) {
            Some(f) => Some(f),
            None => {
                errors.push(FieldError::new(name, format!("{name} must be numeric")));
                None
            }
        },
        Some(_) => {
            errors.push(FieldError::new(name, format!("{name} must be numeric")));
            None
        }
    }
}

impl FoodPayload {
    /// Validates the body. Creation insists on `food_name`; replace only on name-or-code.
    pub fn into_fields(self, require_name: bool) -> Result<FoodFields, AppError> {
        let mut errors = Vec::new();

        if require_name && self.food_name.is_none() {
            errors.push(FieldError::new("food_name", "food_name is required"));
        } else if self.food_name.is_none() && self.food_code.is_none() {
            errors.push(FieldError::new(
                "food_name",
                "food_name or food_code is required",
            ));
        }

        let fields = FoodFields {
            calorie: nutrient("calorie", self.calorie, &mut errors),
            carbohydrate: nutrient("carbohydrate", self.carbohydrate, &mut errors),
            protein: nutrient("protein", self.protein, &mut errors),
            fat: nutrient("fat", self.fat, &mut errors),
            sugars: nutrient("sugars", self.sugars, &mut errors),
            sodium: nutrient("sodium", self.sodium, &mut errors),
            cholesterol: nutrient("cholesterol", self.cholesterol, &mut errors),
            saturated_fatty_acids: nutrient(
                "saturated_fatty_acids",
                self.saturated_fatty_acids,
                &mut errors,
            ),
            trans_fat: nutrient("trans_fat", self.trans_fat, &mut errors),

            food_code: self.food_code,
            food_name: self.food_name,
            group_name: self.group_name,
            research_year: self.research_year,
            maker_name: self.maker_name,
            reference_name: self.reference_name,
            serving_size: self.serving_size,
        };

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(AppError::Validation(errors))
        }
    }
}
