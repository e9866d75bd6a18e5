use axum::{extract::rejection::JsonRejection, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{error::AppError, users::repo_types::User};

/// Filters accepted by `GET /users`; all supplied filters must match.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub is_active: Option<String>,
}

impl ListQuery {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            if !user.first_name.to_lowercase().contains(&q)
                && !user.last_name.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if let Some(city) = self.city.as_deref().filter(|c| !c.is_empty()) {
            match &user.city {
                Some(c) if c.to_lowercase() == city.to_lowercase() => {}
                _ => return false,
            }
        }
        if let Some(active) = self.active_flag() {
            if user.is_active != active {
                return false;
            }
        }
        true
    }

    /// Only the literals `true` and `false` filter; anything else is ignored.
    fn active_flag(&self) -> Option<bool> {
        match self.is_active.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}

/// Unwraps a JSON body that must be an object.
pub fn body_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    match payload {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(AppError::BadRequest(
            "Request body must be a JSON object".into(),
        )),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}
