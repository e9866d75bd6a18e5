use serde::{Deserialize, Serialize};
use serde_json::Number;
use time::OffsetDateTime;

/// User record as persisted in the data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: Number, // kept as given so 30 stays 30, not 30.0
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The mutable part of a user, produced by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub age: Number,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Builds a fresh record; `createdAt` and `updatedAt` share the same instant.
    pub fn new(id: String, fields: UserFields, now: OffsetDateTime) -> Self {
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            age: fields.age,
            email: fields.email,
            city: fields.city,
            hobbies: fields.hobbies,
            is_active: fields.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field; `id` and `createdAt` are left alone.
    pub fn apply(&mut self, fields: UserFields, now: OffsetDateTime) {
        let UserFields {
            first_name,
            last_name,
            age,
            email,
            city,
            hobbies,
            is_active,
        } = fields;
        self.first_name = first_name;
        self.last_name = last_name;
        self.age = age;
        self.email = email;
        self.city = city;
        self.hobbies = hobbies;
        self.is_active = is_active;
        self.updated_at = now;
    }

    pub fn fields(&self) -> UserFields {
        UserFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age.clone(),
            email: self.email.clone(),
            city: self.city.clone(),
            hobbies: self.hobbies.clone(),
            is_active: self.is_active,
        }
    }
}
