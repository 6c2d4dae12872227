/// Data models for the class portal.
/// Defines the eight persisted entities and the collection they live in.

pub mod quiz;
pub mod records;
pub mod result;
pub mod user;

pub use quiz::{OptionLetter, Question, QuestionOptions, QuestionType, Quiz, Subject};
pub use records::{Appointment, Attendance, Payment};
pub use result::{AnswerDetail, Attempt, QuizResult};
pub use user::{Role, User};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Key under which setup completion is recorded
pub const SETUP_MARKER: &str = "setupDone";

/// Named collection of same-typed records, persisted as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Quizzes,
    Questions,
    Results,
    Attempts,
    Attendance,
    Payments,
    Appointments,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Users,
        Collection::Quizzes,
        Collection::Questions,
        Collection::Results,
        Collection::Attempts,
        Collection::Attendance,
        Collection::Payments,
        Collection::Appointments,
    ];

    /// Storage key and remote table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Quizzes => "quizzes",
            Collection::Questions => "questions",
            Collection::Results => "results",
            Collection::Attempts => "attempts",
            Collection::Attendance => "attendance",
            Collection::Payments => "payments",
            Collection::Appointments => "appointments",
        }
    }

    pub fn from_name(name: &str) -> Option<Collection> {
        Collection::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Check that `record` decodes as this collection's entity type
    pub fn check_record(&self, record: &Value) -> serde_json::Result<()> {
        match self {
            Collection::Users => decode_as::<User>(record),
            Collection::Quizzes => decode_as::<Quiz>(record),
            Collection::Questions => decode_as::<Question>(record),
            Collection::Results => decode_as::<QuizResult>(record),
            Collection::Attempts => decode_as::<Attempt>(record),
            Collection::Attendance => decode_as::<Attendance>(record),
            Collection::Payments => decode_as::<Payment>(record),
            Collection::Appointments => decode_as::<Appointment>(record),
        }
    }
}

fn decode_as<T: Entity>(record: &Value) -> serde_json::Result<()> {
    T::deserialize(record).map(|_| ())
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type bound to one collection
pub trait Entity: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Secondary key that must be unique within the collection, if any
    fn unique_key(&self) -> Option<&str> {
        None
    }

    /// Stamp creation-time fields
    fn on_create(&mut self, _now: &str) {}
}

/// Entities that may be updated and deleted after creation.
/// Results and appointments deliberately do not implement it.
pub trait Mutable: Entity {}

/// Fresh opaque record identifier
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// ISO-8601 UTC timestamp with millisecond precision
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    timestamp(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_generation() {
        let id1 = new_id();
        let id2 = new_id();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 32);
    }

    #[test]
    fn test_collection_names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_name(collection.as_str()), Some(collection));
        }
        assert_eq!(Collection::from_name(SETUP_MARKER), None);
    }

    #[test]
    fn test_collection_serializes_as_table_name() {
        let json = serde_json::to_string(&Collection::Attendance).unwrap();
        assert_eq!(json, "\"attendance\"");
    }

    #[test]
    fn test_check_record_uses_entity_shape() {
        let user = serde_json::to_value(User::student("Ana", "ana", "pw", "9EF")).unwrap();
        assert!(Collection::Users.check_record(&user).is_ok());
        assert!(Collection::Payments.check_record(&user).is_err());

        let partial = serde_json::json!({"id": "x", "name": "X"});
        assert!(Collection::Users.check_record(&partial).is_err());
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap();
        assert_eq!(timestamp(at), "2026-03-02T14:30:00.000Z");
    }
}
