use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    envelope::{Envelope, Meta},
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::{body_object, ListQuery},
        repo_types::User,
        validation::validate,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .post(create_user)
                .fallback(route_not_found),
        )
        .route(
            "/users/:id",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user)
                .fallback(route_not_found),
        )
}

/// Known path, unsupported method.
async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

#[instrument(skip(state, query))]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<Envelope<Vec<User>>>> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let users = state.users.list().await?;
    let total = users.len();
    let matched: Vec<User> = users.into_iter().filter(|u| query.matches(u)).collect();
    let meta = Meta {
        total,
        returned: matched.len(),
    };
    Ok(Json(Envelope::success(matched).with_meta(meta)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<User>>> {
    let user = state.users.find(&id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(Envelope::success(user)))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<Envelope<User>>)> {
    let fields = validate(&body_object(payload)?)?;
    let user = User::new(Uuid::new_v4().to_string(), fields, OffsetDateTime::now_utc());
    let user = state.users.insert(user).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/v1/users/{}", user.id)) {
        headers.insert(header::LOCATION, location);
    }

    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, headers, Json(Envelope::success(user))))
}

#[instrument(skip(state, payload))]
pub async fn replace_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Envelope<User>>> {
    let fields = validate(&body_object(payload)?)?;
    let user = state
        .users
        .update(&id, |user| {
            user.apply(fields, OffsetDateTime::now_utc());
            Ok(())
        })
        .await?;

    info!(user_id = %user.id, "user replaced");
    Ok(Json(Envelope::success(user)))
}

#[instrument(skip(state, payload))]
pub async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Envelope<User>>> {
    let changes = body_object(payload)?;
    let user = state
        .users
        .update(&id, |user| {
            let mut merged = match serde_json::to_value(user.fields()) {
                Ok(Value::Object(map)) => map,
                Ok(_) => serde_json::Map::new(),
                Err(e) => return Err(AppError::Internal(e.into())),
            };
            merged.extend(changes);
            let fields = validate(&merged)?;
            user.apply(fields, OffsetDateTime::now_utc());
            Ok(())
        })
        .await?;

    info!(user_id = %user.id, "user patched");
    Ok(Json(Envelope::success(user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<User>>> {
    let user = state.users.remove(&id).await?;
    info!(user_id = %user.id, "user deleted");
    Ok(Json(
        Envelope::success(user).with_message("User deleted successfully"),
    ))
}
