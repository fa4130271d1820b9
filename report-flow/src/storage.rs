use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::Result, state::WorkflowState, submission::ReportType};

/// Snapshot of one submission's progress, keyed by session id.
///
/// Sessions exist only for the lifetime of the process; nothing in this
/// crate persists reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub report_name: String,
    pub report_type: ReportType,
    pub state: WorkflowState,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, report_name: String, report_type: ReportType) -> Self {
        Self {
            id,
            report_name,
            report_type,
            state: WorkflowState::Idle,
            created_at: Utc::now(),
        }
    }
}

/// Storage seam for session snapshots.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: Session) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Session>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of SessionStorage.
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let storage = InMemorySessionStorage::new();
        let session = Session::new(
            "session1".to_string(),
            "Annual blood work".to_string(),
            ReportType::BloodTest,
        );
        storage.save(session.clone()).await.unwrap();

        let loaded = storage.get("session1").await.unwrap().unwrap();
        assert_eq!(loaded.state, WorkflowState::Idle);
        assert_eq!(loaded.report_name, "Annual blood work");

        storage.delete("session1").await.unwrap();
        assert!(storage.get("session1").await.unwrap().is_none());
    }
}
