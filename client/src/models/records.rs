/// Tutoring bookkeeping: attendance, payments and appointments per student.

use super::{Collection, Entity, Mutable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub content: String,
}

impl Attendance {
    pub fn new(user_id: &str, date: &str, content: &str) -> Self {
        Attendance {
            id: String::new(),
            user_id: user_id.to_string(),
            date: date.to_string(),
            content: content.to_string(),
        }
    }
}

impl Entity for Attendance {
    const COLLECTION: Collection = Collection::Attendance;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Mutable for Attendance {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Payment {
    pub fn new(user_id: &str, amount: f64, date: &str) -> Self {
        Payment {
            id: String::new(),
            user_id: user_id.to_string(),
            amount,
            date: date.to_string(),
            method: None,
            notes: None,
        }
    }
}

impl Entity for Payment {
    const COLLECTION: Collection = Collection::Payments;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Mutable for Payment {}

/// A scheduled lesson. Created once, never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    /// ISO local date-time, e.g. `2026-03-02T14:00`
    pub date_time: String,
    pub duration_min: u32,
    #[serde(default)]
    pub created_at: String,
}

impl Appointment {
    pub fn new(user_id: &str, date_time: &str, duration_min: u32) -> Self {
        Appointment {
            id: String::new(),
            user_id: user_id.to_string(),
            date_time: date_time.to_string(),
            duration_min,
            created_at: String::new(),
        }
    }
}

impl Entity for Appointment {
    const COLLECTION: Collection = Collection::Appointments;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_create(&mut self, now: &str) {
        self.created_at = now.to_string();
    }
}
