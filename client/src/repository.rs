/// Entity repository over the local store.
///
/// Typed CRUD plus the portal's domain rules: unique usernames, quiz → question
/// cascade, one live attempt per (user, quiz). Every successful create/update is
/// mirrored to the cloud through the sync queue when one is attached.

use crate::error::{PortalError, Result};
use crate::models::{
    new_id, now_timestamp, Appointment, Attempt, Attendance, Collection, Entity, Mutable,
    OptionLetter, Payment, Question, Quiz, QuizResult, Role, Subject, User, SETUP_MARKER,
};
use crate::queue::SyncQueue;
use crate::storage::LocalStore;
use crate::text_import;

/// Id of the seeded administrator account
pub const ADMIN_ID: &str = "teacher-1";

/// Credentials for the administrator created on first run
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

/// Headline numbers for the teacher dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardCounts {
    pub students: usize,
    pub quizzes: usize,
    pub questions: usize,
    pub results: usize,
}

pub struct Repository {
    store: LocalStore,
    sync: Option<SyncQueue>,
}

impl Repository {
    pub fn new(store: LocalStore) -> Self {
        Self { store, sync: None }
    }

    /// Repository whose writes are mirrored through `queue`
    pub fn with_sync(store: LocalStore, queue: SyncQueue) -> Self {
        Self {
            store,
            sync: Some(queue),
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn sync_queue(&self) -> Option<&SyncQueue> {
        self.sync.as_ref()
    }

    fn mirror<T: Entity>(&self, record: &T) {
        let Some(queue) = &self.sync else {
            return;
        };
        match serde_json::to_value(record) {
            Ok(row) => queue.enqueue_upsert(T::COLLECTION, row),
            Err(e) => log::warn!("Skipping mirror of {} {}: {}", T::COLLECTION, record.id(), e),
        }
    }

    fn read_all<T: Entity>(&self) -> Result<Vec<T>> {
        self.store.read(T::COLLECTION.as_str())
    }

    fn write_all<T: Entity>(&self, records: &[T]) -> Result<()> {
        self.store.write(T::COLLECTION.as_str(), records)
    }

    // Generic operations

    /// Assign a fresh id, stamp creation fields, append and persist
    pub fn create<T: Entity>(&self, mut record: T) -> Result<T> {
        let mut records: Vec<T> = self.read_all()?;

        if let Some(key) = record.unique_key() {
            if records.iter().any(|existing| existing.unique_key() == Some(key)) {
                return Err(PortalError::DuplicateUsername(key.to_string()));
            }
        }

        record.set_id(new_id());
        record.on_create(&now_timestamp());
        records.push(record.clone());
        self.write_all(&records)?;

        log::debug!("Created {} {}", T::COLLECTION, record.id());
        self.mirror(&record);
        Ok(record)
    }

    /// Apply `patch` to the record with `id`. A missing id is a silent no-op.
    pub fn update<T: Mutable>(&self, id: &str, patch: impl FnOnce(&mut T)) -> Result<Option<T>> {
        let mut records: Vec<T> = self.read_all()?;
        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            log::debug!("Update of missing {} {} ignored", T::COLLECTION, id);
            return Ok(None);
        };

        patch(record);
        record.set_id(id.to_string());
        let updated = record.clone();
        self.write_all(&records)?;

        self.mirror(&updated);
        Ok(Some(updated))
    }

    /// Remove the record with `id`; returns whether anything was removed.
    /// Deleting a quiz also deletes its questions, as a second write.
    pub fn delete<T: Mutable>(&self, id: &str) -> Result<bool> {
        let mut records: Vec<T> = self.read_all()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records)?;
        log::debug!("Deleted {} {}", T::COLLECTION, id);

        if T::COLLECTION == Collection::Quizzes {
            let mut questions: Vec<Question> = self.read_all()?;
            let before = questions.len();
            questions.retain(|q| q.quiz_id != id);
            if questions.len() != before {
                self.write_all(&questions)?;
                log::debug!("Cascade removed {} questions of quiz {}", before - questions.len(), id);
            }
        }

        Ok(true)
    }

    pub fn get<T: Entity>(&self, id: &str) -> Result<Option<T>> {
        Ok(self.read_all::<T>()?.into_iter().find(|r| r.id() == id))
    }

    pub fn list<T: Entity>(&self) -> Result<Vec<T>> {
        self.read_all()
    }

    pub fn list_where<T: Entity>(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        Ok(self.read_all::<T>()?.into_iter().filter(|r| predicate(r)).collect())
    }

    /// Last `n` records in insertion order, newest first
    pub fn recent<T: Entity>(&self, n: usize) -> Result<Vec<T>> {
        Ok(self.read_all::<T>()?.into_iter().rev().take(n).collect())
    }

    // Setup

    /// Seed the administrator on first run. Returns true if seeding happened.
    pub fn init(&self, seed: &AdminSeed) -> Result<bool> {
        if self.store.get_raw(SETUP_MARKER)?.is_some() {
            return Ok(false);
        }

        self.reset_users_and_quizzes(&seed.username, &seed.password)?;
        self.store.set_raw(SETUP_MARKER, "true")?;
        log::info!("Initial setup done; administrator is {}", seed.username);
        Ok(true)
    }

    /// Replace all users with a single administrator and drop every quiz and question.
    /// Local only: the remote copy of the administrator is never overwritten from here.
    pub fn reset_users_and_quizzes(&self, username: &str, password: &str) -> Result<()> {
        let mut admin = User::new("Administrador", username, password, Role::Teacher);
        admin.id = ADMIN_ID.to_string();

        self.write_all(std::slice::from_ref(&admin))?;
        self.write_all::<Quiz>(&[])?;
        self.write_all::<Question>(&[])?;
        Ok(())
    }

    // Users

    /// Self-registration of a student account
    pub fn register_student(&self, name: &str, username: &str, password: &str, grade: &str) -> Result<User> {
        if name.trim().is_empty() || username.trim().is_empty() || password.is_empty() {
            return Err(PortalError::Validation(
                "name, username and password are required".to_string(),
            ));
        }

        self.create(User::student(name.trim(), username.trim(), password, grade))
    }

    /// Local credential check
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .list_where::<User>(|u| u.username == username && u.password.as_deref() == Some(password))?
            .into_iter()
            .next()
            .ok_or(PortalError::InvalidCredentials)?;

        if user.blocked {
            return Err(PortalError::Blocked(user.username));
        }
        Ok(user)
    }

    pub fn set_blocked(&self, user_id: &str, blocked: bool) -> Result<Option<User>> {
        self.update::<User>(user_id, |u| u.blocked = blocked)
    }

    pub fn set_grade(&self, user_id: &str, grade: &str) -> Result<Option<User>> {
        self.update::<User>(user_id, |u| u.grade = Some(grade.to_string()))
    }

    // Per-owner queries

    pub fn questions_for_quiz(&self, quiz_id: &str) -> Result<Vec<Question>> {
        self.list_where::<Question>(|q| q.quiz_id == quiz_id)
    }

    pub fn results_for_user(&self, user_id: &str) -> Result<Vec<QuizResult>> {
        self.list_where::<QuizResult>(|r| r.user_id == user_id)
    }

    pub fn results_for_quiz(&self, quiz_id: &str) -> Result<Vec<QuizResult>> {
        self.list_where::<QuizResult>(|r| r.quiz_id == quiz_id)
    }

    pub fn attempts_for_quiz(&self, quiz_id: &str) -> Result<Vec<Attempt>> {
        self.list_where::<Attempt>(|a| a.quiz_id == quiz_id)
    }

    pub fn attendance_for_user(&self, user_id: &str) -> Result<Vec<Attendance>> {
        self.list_where::<Attendance>(|a| a.user_id == user_id)
    }

    pub fn payments_for_user(&self, user_id: &str) -> Result<Vec<Payment>> {
        self.list_where::<Payment>(|p| p.user_id == user_id)
    }

    /// Appointments whose `dateTime` starts with `date_prefix` (e.g. `2026-03-02`)
    pub fn appointments_on(&self, date_prefix: &str) -> Result<Vec<Appointment>> {
        self.list_where::<Appointment>(|a| a.date_time.starts_with(date_prefix))
    }

    pub fn dashboard_counts(&self) -> Result<DashboardCounts> {
        Ok(DashboardCounts {
            students: self.list_where::<User>(|u| u.role == Role::Student)?.len(),
            quizzes: self.list::<Quiz>()?.len(),
            questions: self.list::<Question>()?.len(),
            results: self.list::<QuizResult>()?.len(),
        })
    }

    // Attempts

    /// Return the live attempt for (user, quiz), creating it only if none exists
    pub fn start_attempt(&self, user_id: &str, quiz_id: &str) -> Result<Attempt> {
        let existing = self
            .list_where::<Attempt>(|a| a.user_id == user_id && a.quiz_id == quiz_id)?
            .into_iter()
            .next();

        match existing {
            Some(attempt) => Ok(attempt),
            None => self.create(Attempt::new(user_id, quiz_id)),
        }
    }

    /// Store an answer and the player's position
    pub fn record_answer(
        &self,
        attempt_id: &str,
        question_id: &str,
        chosen: OptionLetter,
        last_index: usize,
    ) -> Result<Option<Attempt>> {
        self.update::<Attempt>(attempt_id, |a| {
            a.answers.insert(question_id.to_string(), chosen.as_str().to_string());
            a.last_index = last_index;
        })
    }

    /// Remove the attempt and hand back its final state for scoring
    pub fn finish_attempt(&self, attempt_id: &str) -> Result<Option<Attempt>> {
        let mut attempts: Vec<Attempt> = self.read_all()?;
        let Some(position) = attempts.iter().position(|a| a.id == attempt_id) else {
            return Ok(None);
        };

        let attempt = attempts.remove(position);
        self.write_all(&attempts)?;
        Ok(Some(attempt))
    }

    pub fn save_result(&self, result: QuizResult) -> Result<QuizResult> {
        self.create(result)
    }

    // Text import

    /// Create one question per well-formed block; returns how many were created
    pub fn import_questions(&self, quiz_id: &str, text: &str) -> Result<usize> {
        let parsed = text_import::parse_questions(text);
        let count = parsed.len();
        for question in parsed {
            self.create(question.into_question(quiz_id))?;
        }
        log::info!("Imported {} questions into quiz {}", count, quiz_id);
        Ok(count)
    }

    /// Create a quiz from imported text. Nothing is written unless the title is
    /// non-empty and at least one block parses.
    pub fn import_quiz(
        &self,
        title: &str,
        grade: &str,
        subject: Subject,
        text: &str,
    ) -> Result<Option<(Quiz, usize)>> {
        let parsed = text_import::parse_questions(text);
        if title.trim().is_empty() || parsed.is_empty() {
            return Ok(None);
        }

        let description = format!("Importado ({} questões)", parsed.len());
        let quiz = self.create(Quiz::new(title.trim(), &description, ADMIN_ID, grade, subject))?;

        let count = parsed.len();
        for question in parsed {
            self.create(question.into_question(&quiz.id))?;
        }
        Ok(Some((quiz, count)))
    }
}
