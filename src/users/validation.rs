use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    error::AppError,
    users::{
        repo_types::UserFields,
        schema::{FieldKind, FieldRule, USER_SCHEMA},
    },
};

/// One rejected field and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Checks `candidate` against [`USER_SCHEMA`], collecting every violation.
///
/// On success the returned fields carry defaults for anything omitted; keys
/// outside the schema are dropped. `null` is treated the same as a missing key.
pub fn validate(candidate: &Map<String, Value>) -> Result<UserFields, AppError> {
    let mut normalized = Map::new();
    let mut errors = Vec::new();

    for rule in USER_SCHEMA {
        match candidate.get(rule.name).filter(|v| !v.is_null()) {
            Some(value) => match check(rule, value) {
                Ok(()) => {
                    normalized.insert(rule.name.to_string(), value.clone());
                }
                Err(message) => errors.push(FieldError::new(rule.name, message)),
            },
            None if rule.required => {
                errors.push(FieldError::new(
                    rule.name,
                    format!("\"{}\" is required", rule.name),
                ));
            }
            None => {
                if let Some(default) = rule.default {
                    normalized.insert(rule.name.to_string(), default());
                }
            }
        }
    }

    if !errors.is_empty() {
        warn!(fields = ?errors.iter().map(|e| &e.field).collect::<Vec<_>>(), "validation failed");
        return Err(AppError::Validation(errors));
    }

    // every key was checked above; a mismatch here is a schema/struct bug, not bad input
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| {
            AppError::Internal(anyhow::Error::new(e).context("schema does not match UserFields"))
        })
}

fn check(rule: &FieldRule, value: &Value) -> Result<(), String> {
    let name = rule.name;
    match rule.kind {
        FieldKind::Text { min_len, max_len } => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("\"{name}\" must be a string"))?;
            // UTF-16 code units, so "😀" counts as 2
            let len = s.encode_utf16().count();
            if len < min_len {
                return Err(format!(
                    "\"{name}\" length must be at least {min_len} characters long"
                ));
            }
            if len > max_len {
                return Err(format!(
                    "\"{name}\" length must be less than or equal to {max_len} characters long"
                ));
            }
            Ok(())
        }
        FieldKind::Number { min, max } => {
            let n = value
                .as_f64()
                .ok_or_else(|| format!("\"{name}\" must be a number"))?;
            if n < min {
                return Err(format!("\"{name}\" must be greater than or equal to {min}"));
            }
            if n > max {
                return Err(format!("\"{name}\" must be less than or equal to {max}"));
            }
            Ok(())
        }
        FieldKind::Email => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("\"{name}\" must be a string"))?;
            if !is_valid_email(s) {
                return Err(format!("\"{name}\" must be a valid email"));
            }
            Ok(())
        }
        FieldKind::TextList => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("\"{name}\" must be an array"))?;
            if let Some(i) = items.iter().position(|item| !item.is_string()) {
                return Err(format!("\"{name}[{i}]\" must be a string"));
            }
            Ok(())
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                return Err(format!("\"{name}\" must be a boolean"));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn violations(candidate: Value) -> Vec<FieldError> {
        match validate(&object(candidate)) {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    fn fields_of(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn minimal_valid_user_gets_defaults() {
        let fields = validate(&object(json!({
            "firstName": "Ann",
            "lastName": "Lee",
            "age": 30,
            "email": "a@b.com"
        })))
        .expect("valid");

        assert_eq!(fields.first_name, "Ann");
        assert_eq!(fields.age.as_u64(), Some(30));
        assert!(fields.hobbies.is_empty());
        assert!(fields.is_active);
        assert_eq!(fields.city, None);
    }

    #[test]
    fn unknown_and_server_fields_are_dropped() {
        let fields = validate(&object(json!({
            "id": "forged",
            "createdAt": "yesterday",
            "firstName": "Ann",
            "lastName": "Lee",
            "age": 30,
            "email": "a@b.com",
            "nickname": "annie"
        })))
        .expect("valid");

        let out = serde_json::to_value(&fields).unwrap();
        assert!(out.get("id").is_none());
        assert!(out.get("createdAt").is_none());
        assert!(out.get("nickname").is_none());
    }

    #[test]
    fn reports_every_violated_field() {
        let errors = violations(json!({
            "firstName": "A",
            "age": 200,
            "email": "bad"
        }));

        assert_eq!(fields_of(&errors), ["firstName", "lastName", "age", "email"]);
        assert_eq!(
            errors[0].message,
            "\"firstName\" length must be at least 2 characters long"
        );
        assert_eq!(errors[1].message, "\"lastName\" is required");
        assert_eq!(errors[2].message, "\"age\" must be less than or equal to 120");
        assert_eq!(errors[3].message, "\"email\" must be a valid email");
    }

    #[test]
    fn type_mismatches_are_reported() {
        let errors = violations(json!({
            "firstName": 12,
            "lastName": "Lee",
            "age": "thirty",
            "email": "a@b.com",
            "city": "P",
            "hobbies": ["chess", 3],
            "isActive": "yes"
        }));

        assert_eq!(
            fields_of(&errors),
            ["firstName", "age", "city", "hobbies", "isActive"]
        );
        assert_eq!(errors[3].message, "\"hobbies[1]\" must be a string");
        assert_eq!(errors[4].message, "\"isActive\" must be a boolean");
    }

    #[test]
    fn boundaries_are_inclusive() {
        let long = "x".repeat(50);
        let fields = validate(&object(json!({
            "firstName": "Al",
            "lastName": long,
            "age": 120,
            "email": "a@b.co",
            "city": "Oz"
        })))
        .expect("valid at the edges");
        assert_eq!(fields.city.as_deref(), Some("Oz"));

        let errors = violations(json!({
            "firstName": "x".repeat(51),
            "lastName": "Lee",
            "age": 0,
            "email": "a@b.com"
        }));
        assert_eq!(
            errors[0].message,
            "\"firstName\" length must be less than or equal to 50 characters long"
        );
        assert_eq!(errors[1].message, "\"age\" must be greater than or equal to 1");
    }

    #[test]
    fn length_counts_utf16_units() {
        // one astral-plane char is two units: long enough for min 2
        let fields = validate(&object(json!({
            "firstName": "😀",
            "lastName": "Lee",
            "age": 30,
            "email": "a@b.com"
        })))
        .expect("emoji meets the minimum");
        assert_eq!(fields.first_name, "😀");

        // 26 emoji = 52 units, over the 50 limit despite being 26 chars
        let errors = violations(json!({
            "firstName": "Ann",
            "lastName": "😀".repeat(26),
            "age": 30,
            "email": "a@b.com"
        }));
        assert_eq!(fields_of(&errors), ["lastName"]);
    }

    #[test]
    fn null_counts_as_missing() {
        let errors = violations(json!({
            "firstName": null,
            "lastName": "Lee",
            "age": 30,
            "email": "a@b.com",
            "city": null
        }));

        assert_eq!(errors, vec![FieldError::new("firstName", "\"firstName\" is required")]);
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("bad"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
    }
}
