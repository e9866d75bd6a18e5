use serde::Serialize;

use crate::users::validation::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Meta {
    pub total: usize,
    pub returned: usize,
}

/// JSON wrapper returned on every response.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            message: None,
            meta: None,
            errors: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl Envelope<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(message.into()),
            meta: None,
            errors: None,
        }
    }

    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::error("Validation failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_omits_absent_parts() {
        let body = serde_json::to_value(Envelope::success(json!({"id": "1"}))).unwrap();
        assert_eq!(body, json!({"status": "success", "data": {"id": "1"}}));
    }

    #[test]
    fn list_envelope_carries_meta() {
        let body = serde_json::to_value(
            Envelope::success(vec![1, 2]).with_meta(Meta {
                total: 5,
                returned: 2,
            }),
        )
        .unwrap();
        assert_eq!(body["meta"], json!({"total": 5, "returned": 2}));
    }

    #[test]
    fn error_envelope_has_no_data() {
        let body = serde_json::to_value(Envelope::error("Route not found")).unwrap();
        assert_eq!(body, json!({"status": "error", "message": "Route not found"}));
    }
}
