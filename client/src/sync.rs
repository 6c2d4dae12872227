/// Whole-collection transfer between the local store and the remote backend.

use crate::cloud::CloudSync;
use crate::error::{PortalError, Result};
use crate::models::Collection;
use crate::storage::LocalStore;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// Local collection overwritten with this many remote rows
    Replaced(usize),
    /// Remote returned no rows; local data kept
    RemoteEmpty,
    Pushed(usize),
    /// Nothing stored locally to push
    Skipped,
    Failed(String),
    Disabled,
}

impl fmt::Display for CollectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionOutcome::Replaced(n) => write!(f, "replaced with {} remote rows", n),
            CollectionOutcome::RemoteEmpty => write!(f, "remote empty, local kept"),
            CollectionOutcome::Pushed(n) => write!(f, "pushed {} rows", n),
            CollectionOutcome::Skipped => write!(f, "nothing to push"),
            CollectionOutcome::Failed(message) => write!(f, "failed: {}", message),
            CollectionOutcome::Disabled => write!(f, "cloud sync disabled"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub outcomes: Vec<(Collection, CollectionOutcome)>,
}

impl SyncReport {
    fn disabled() -> Self {
        SyncReport {
            outcomes: Collection::ALL
                .into_iter()
                .map(|c| (c, CollectionOutcome::Disabled))
                .collect(),
        }
    }

    pub fn outcome(&self, collection: Collection) -> Option<&CollectionOutcome> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, outcome)| outcome)
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, CollectionOutcome::Failed(_)))
            .count()
    }
}

/// Pull every collection from the remote. A failed or empty remote listing
/// leaves the local collection as it was.
pub async fn sync_down(store: &LocalStore, cloud: &CloudSync) -> SyncReport {
    if !cloud.enabled() {
        return SyncReport::disabled();
    }

    let mut report = SyncReport::default();
    for collection in Collection::ALL {
        let outcome = match cloud.try_list(collection).await {
            Err(e) => {
                cloud.record_error(&format!("sync down {}", collection), &e);
                CollectionOutcome::Failed(e.to_string())
            }
            Ok(rows) if rows.is_empty() => CollectionOutcome::RemoteEmpty,
            Ok(rows) => match check_rows(collection, &rows) {
                Err(e) => {
                    cloud.record_error(&format!("sync down {}", collection), &e);
                    CollectionOutcome::Failed(e.to_string())
                }
                Ok(()) => match store.write(collection.as_str(), &rows) {
                    Ok(()) => CollectionOutcome::Replaced(rows.len()),
                    Err(e) => {
                        log::error!("Failed to store {} from remote: {}", collection, e);
                        CollectionOutcome::Failed(e.to_string())
                    }
                },
            },
        };
        log::info!("sync down {}: {}", collection, outcome);
        report.outcomes.push((collection, outcome));
    }
    report
}

/// Every remote row must decode as the collection's entity before local data is replaced
fn check_rows(collection: Collection, rows: &[Value]) -> Result<()> {
    for (i, row) in rows.iter().enumerate() {
        collection.check_record(row).map_err(|e| {
            PortalError::ServerError(format!("Remote row {} of {} is malformed: {}", i, collection, e))
        })?;
    }
    Ok(())
}

/// Push every local record to the remote, one collection at a time
pub async fn sync_up(store: &LocalStore, cloud: &CloudSync) -> SyncReport {
    if !cloud.enabled() {
        return SyncReport::disabled();
    }

    let mut report = SyncReport::default();
    for collection in Collection::ALL {
        let outcome = match store.read::<Value>(collection.as_str()) {
            Err(e) => {
                log::error!("Failed to read local {}: {}", collection, e);
                CollectionOutcome::Failed(e.to_string())
            }
            Ok(rows) if rows.is_empty() => CollectionOutcome::Skipped,
            Ok(rows) => match cloud.try_bulk_upsert(collection, &rows).await {
                Ok(_) => CollectionOutcome::Pushed(rows.len()),
                Err(e) => {
                    cloud.record_error(&format!("sync up {}", collection), &e);
                    CollectionOutcome::Failed(e.to_string())
                }
            },
        };
        log::info!("sync up {}: {}", collection, outcome);
        report.outcomes.push((collection, outcome));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_sync_is_noop() {
        let store = LocalStore::in_memory().unwrap();
        store.set_raw("users", r#"[{"id":"u1"}]"#).unwrap();
        let cloud = CloudSync::disabled();

        let down = sync_down(&store, &cloud).await;
        let up = sync_up(&store, &cloud).await;

        for report in [down, up] {
            assert_eq!(report.outcomes.len(), Collection::ALL.len());
            assert!(report
                .outcomes
                .iter()
                .all(|(_, o)| *o == CollectionOutcome::Disabled));
        }
        assert_eq!(store.get_raw("users").unwrap().as_deref(), Some(r#"[{"id":"u1"}]"#));
    }

    #[test]
    fn test_check_rows_rejects_partial_rows() {
        let rows = vec![serde_json::json!({"id": "x", "name": "X"})];
        let err = check_rows(Collection::Users, &rows).unwrap_err();
        assert!(err.to_string().contains("Remote row 0 of users"));

        assert!(check_rows(Collection::Users, &[]).is_ok());
    }

    #[test]
    fn test_report_lookup() {
        let report = SyncReport {
            outcomes: vec![
                (Collection::Users, CollectionOutcome::Pushed(2)),
                (Collection::Quizzes, CollectionOutcome::Failed("timeout".to_string())),
            ],
        };

        assert_eq!(report.outcome(Collection::Users), Some(&CollectionOutcome::Pushed(2)));
        assert_eq!(report.outcome(Collection::Payments), None);
        assert_eq!(report.failures(), 1);
    }
}
