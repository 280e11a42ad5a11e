pub mod field_mapper;
pub mod handlers;
pub mod numeric;
pub mod pipeline;
pub mod sheet;

use crate::state::AppState;
use axum::Router;

pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new().merge(handlers::import_routes(max_bytes))
}
