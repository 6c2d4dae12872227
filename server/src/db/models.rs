/// Request/response bodies for the table API.
use serde::{Deserialize, Serialize};

/// Tables the backend accepts. Anything else is a 404.
pub const KNOWN_TABLES: [&str; 8] = [
    "users",
    "quizzes",
    "questions",
    "results",
    "attempts",
    "attendance",
    "payments",
    "appointments",
];

pub fn is_known_table(name: &str) -> bool {
    KNOWN_TABLES.contains(&name)
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UpsertResponse {
    pub upserted: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Identity returned by a successful password check. Never includes the password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: String,
}
