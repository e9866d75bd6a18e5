mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod schema;
pub mod validation;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
