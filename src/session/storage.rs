// Session storage backends

use super::types::{SessionConfig, SessionRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Trait for session storage backends
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Store a new session record
    async fn insert(&self, record: SessionRecord) -> Result<(), String>;

    /// Get a session record by ID
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, String>;

    /// Overwrite an existing session record
    async fn update(&self, record: SessionRecord) -> Result<(), String>;

    /// Remove a session record, returning whether it existed
    async fn remove(&self, session_id: &str) -> Result<bool, String>;

    /// Snapshot of all stored records
    async fn all(&self) -> Result<Vec<SessionRecord>, String>;

    /// Number of stored records
    async fn count(&self) -> Result<usize, String>;

    /// Drop every record idle beyond the configured timeout
    async fn cleanup_expired(&self, config: &SessionConfig) -> Result<usize, String>;
}

/// In-memory session storage; the whole registry is lost on restart
pub struct MemorySessionStorage {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn insert(&self, record: SessionRecord) -> Result<(), String> {
        let mut sessions = self.sessions.write().await;
        info!(
            "Storing session {} for {} <{}>",
            record.session_id, record.nickname, record.email
        );
        sessions.insert(record.session_id.clone(), record);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, String> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn update(&self, record: SessionRecord) -> Result<(), String> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(record.session_id.clone(), record);
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<bool, String> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(session_id).is_some())
    }

    async fn all(&self) -> Result<Vec<SessionRecord>, String> {
        let sessions = self.sessions.read().await;
        let mut records: Vec<SessionRecord> = sessions.values().cloned().collect();
        // Stable listing order regardless of map iteration
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn count(&self) -> Result<usize, String> {
        let sessions = self.sessions.read().await;
        Ok(sessions.len())
    }

    async fn cleanup_expired(&self, config: &SessionConfig) -> Result<usize, String> {
        if config.idle_timeout_secs == 0 {
            return Ok(0);
        }

        let mut sessions = self.sessions.write().await;

        let expired: Vec<String> = sessions
            .values()
            .filter(|record| record.is_expired(config))
            .map(|record| record.session_id.clone())
            .collect();

        let count = expired.len();

        for session_id in expired {
            sessions.remove(&session_id);
        }

        if count > 0 {
            debug!("Cleaned up {} expired sessions", count);
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::{ClientInfo, ServerInfo};
    use chrono::{Duration, Utc};

    fn record(email: &str) -> SessionRecord {
        SessionRecord::new(
            email.to_string(),
            "tester".to_string(),
            ClientInfo {
                ip: "192.168.1.1".to_string(),
                mac: "AA:BB:CC:DD:EE:FF".to_string(),
            },
            ServerInfo {
                ip: Some("10.0.0.2".to_string()),
                mac: Some("11:22:33:44:55:66".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let storage = MemorySessionStorage::new();
        let rec = record("a@x.com");
        let session_id = rec.session_id.clone();

        storage.insert(rec).await.unwrap();

        let retrieved = storage.get(&session_id).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().email, "a@x.com");
    }

    #[tokio::test]
    async fn test_remove_reports_existence() {
        let storage = MemorySessionStorage::new();
        let rec = record("a@x.com");
        let session_id = rec.session_id.clone();

        storage.insert(rec).await.unwrap();

        assert!(storage.remove(&session_id).await.unwrap());
        assert!(!storage.remove(&session_id).await.unwrap());
        assert!(storage.get(&session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let storage = MemorySessionStorage::new();
        let mut rec = record("a@x.com");
        let session_id = rec.session_id.clone();

        storage.insert(rec.clone()).await.unwrap();

        rec.client_info.ip = "203.0.113.9".to_string();
        storage.update(rec).await.unwrap();

        let retrieved = storage.get(&session_id).await.unwrap().unwrap();
        assert_eq!(retrieved.client_info.ip, "203.0.113.9");
    }

    #[tokio::test]
    async fn test_all_and_count() {
        let storage = MemorySessionStorage::new();
        assert_eq!(storage.count().await.unwrap(), 0);
        assert!(storage.all().await.unwrap().is_empty());

        for i in 0..3 {
            storage.insert(record(&format!("u{}@x.com", i))).await.unwrap();
        }

        assert_eq!(storage.count().await.unwrap(), 3);
        assert_eq!(storage.all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let storage = MemorySessionStorage::new();
        let config = SessionConfig {
            idle_timeout_secs: 60,
            ..SessionConfig::default()
        };

        let fresh = record("fresh@x.com");
        let fresh_id = fresh.session_id.clone();
        storage.insert(fresh).await.unwrap();

        let mut stale = record("stale@x.com");
        stale.last_accessed = Utc::now() - Duration::hours(2);
        let stale_id = stale.session_id.clone();
        storage.insert(stale).await.unwrap();

        let removed = storage.cleanup_expired(&config).await.unwrap();
        assert_eq!(removed, 1);
        assert!(storage.get(&fresh_id).await.unwrap().is_some());
        assert!(storage.get(&stale_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_noop_when_expiry_disabled() {
        let storage = MemorySessionStorage::new();
        let config = SessionConfig {
            idle_timeout_secs: 0,
            ..SessionConfig::default()
        };

        let mut stale = record("stale@x.com");
        stale.last_accessed = Utc::now() - Duration::days(30);
        storage.insert(stale).await.unwrap();

        assert_eq!(storage.cleanup_expired(&config).await.unwrap(), 0);
        assert_eq!(storage.count().await.unwrap(), 1);
    }
}
