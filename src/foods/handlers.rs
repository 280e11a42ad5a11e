use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    foods::{
        dto::{DeletedResponse, FoodPage, FoodPayload, ListFoodsParams},
        query::PageRequest,
        repo_types::FoodRecord,
        services,
    },
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route(
            "/foods/:id",
            get(get_food).put(replace_food).delete(delete_food),
        )
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    path.map(|Path(id)| id).map_err(|e| {
        warn!(error = %e, "malformed food id");
        AppError::invalid("id", "id must be a UUID")
    })
}

fn json_body(body: Result<Json<FoodPayload>, JsonRejection>) -> Result<FoodPayload, AppError> {
    body.map(|Json(p)| p)
        .map_err(|e| AppError::invalid("body", e.body_text()))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    params: Result<Query<ListFoodsParams>, QueryRejection>,
) -> Result<Json<FoodPage>, AppError> {
    let Query(params) = params.map_err(|e| AppError::invalid("query", e.body_text()))?;
    let page = PageRequest::parse(params.page.as_deref(), params.per_page.as_deref())?;
    let page = services::query_foods(state.store.as_ref(), &params.filter(), page).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<FoodRecord>, AppError> {
    let id = path_id(id)?;
    let record = services::get_food(state.store.as_ref(), id).await?;
    Ok(Json(record))
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    body: Result<Json<FoodPayload>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<FoodRecord>), AppError> {
    let fields = json_body(body)?.into_fields(true)?;
    let record = services::create_food(state.store.as_ref(), fields).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/foods/{}", record.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(record)))
}

#[instrument(skip(state, body))]
pub async fn replace_food(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<FoodPayload>, JsonRejection>,
) -> Result<Json<FoodRecord>, AppError> {
    let id = path_id(id)?;
    let fields = json_body(body)?.into_fields(false)?;
    let record = services::replace_food(state.store.as_ref(), id, fields).await?;
    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = path_id(id)?;
    let deleted = services::delete_food(state.store.as_ref(), id).await?;
    Ok(Json(DeletedResponse { deleted }))
}
