/// User model for the class portal.
/// Teachers administer quizzes and students; students take quizzes.

use super::{Collection, Entity, Mutable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_code: Option<String>,
}

impl User {
    pub fn new(name: &str, username: &str, password: &str, role: Role) -> Self {
        User {
            id: String::new(),
            name: name.to_string(),
            username: username.to_string(),
            password: Some(password.to_string()),
            role,
            grade: None,
            phone: None,
            email: None,
            blocked: false,
            reset_code: None,
        }
    }

    pub fn student(name: &str, username: &str, password: &str, grade: &str) -> Self {
        User {
            grade: Some(grade.to_string()),
            ..User::new(name, username, password, Role::Student)
        }
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }
}

impl Entity for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.username)
    }
}

impl Mutable for User {}
