use serde_json::Value;

/// Type and bounds of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text { min_len: usize, max_len: usize },
    Number { min: f64, max: f64 },
    Email,
    TextList,
    Boolean,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<fn() -> Value>,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: true,
        default: None,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: false,
        default: None,
    }
}

const fn defaulted(name: &'static str, kind: FieldKind, default: fn() -> Value) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: false,
        default: Some(default),
    }
}

const NAME: FieldKind = FieldKind::Text {
    min_len: 2,
    max_len: 50,
};

/// Writable user fields, in the order errors are reported.
pub static USER_SCHEMA: &[FieldRule] = &[
    required("firstName", NAME),
    required("lastName", NAME),
    required("age", FieldKind::Number { min: 1.0, max: 120.0 }),
    required("email", FieldKind::Email),
    optional("city", NAME),
    defaulted("hobbies", FieldKind::TextList, no_hobbies),
    defaulted("isActive", FieldKind::Boolean, active),
];

fn no_hobbies() -> Value {
    Value::Array(Vec::new())
}

fn active() -> Value {
    Value::Bool(true)
}
