// Session registry: high-level session lifecycle operations

use super::storage::SessionStorage;
use super::types::{
    ClientInfo, InactivityTime, RegistryError, SessionConfig, SessionRecord,
};
use crate::netinfo;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns the session map and applies the lifecycle rules. Constructed once
/// at startup and shared with handlers through axum state.
pub struct SessionRegistry {
    storage: Arc<dyn SessionStorage>,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(storage: Arc<dyn SessionStorage>, config: SessionConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create a new session. Identity fields were presence-checked by the
    /// caller; every login yields a fresh record, identical inputs included.
    pub async fn login(
        &self,
        email: String,
        nickname: String,
        mac_address: String,
        peer: Option<IpAddr>,
    ) -> Result<SessionRecord, RegistryError> {
        let server_info = netinfo::server_info();
        let ip = netinfo::client_ip(peer, &server_info);

        let record = SessionRecord::new(
            email,
            nickname,
            ClientInfo {
                ip,
                mac: mac_address,
            },
            server_info,
        );

        self.storage
            .insert(record.clone())
            .await
            .map_err(RegistryError::Internal)?;

        info!(
            "Created session {} for {}",
            record.session_id, record.nickname
        );

        Ok(record)
    }

    /// Read a session. Not read-only: the stored record's server info and
    /// client IP are re-derived and its access time refreshed. The returned
    /// inactivity reflects the gap up to this read, not after it.
    pub async fn status(
        &self,
        session_id: &str,
        peer: Option<IpAddr>,
    ) -> Result<(SessionRecord, InactivityTime), RegistryError> {
        let mut record = self.live(session_id).await?;

        let inactivity = InactivityTime::since(record.last_accessed);

        record.server_info = netinfo::server_info();
        record.client_info.ip = netinfo::client_ip(peer, &record.server_info);
        record.touch();

        self.storage
            .update(record.clone())
            .await
            .map_err(RegistryError::Internal)?;

        Ok((record, inactivity))
    }

    /// Refresh a session: advance its access time and re-derive network
    /// metadata.
    pub async fn refresh(
        &self,
        session_id: &str,
        peer: Option<IpAddr>,
    ) -> Result<SessionRecord, RegistryError> {
        let mut record = self.live(session_id).await?;

        record.server_info = netinfo::server_info();
        record.client_info.ip = netinfo::client_ip(peer, &record.server_info);
        record.touch();

        self.storage
            .update(record.clone())
            .await
            .map_err(RegistryError::Internal)?;

        debug!("Refreshed session {}", session_id);

        Ok(record)
    }

    /// Terminate a session. Unknown and already-expired ids both report
    /// `NotFound`.
    pub async fn logout(&self, session_id: &str) -> Result<(), RegistryError> {
        self.live(session_id).await?;

        let removed = self
            .storage
            .remove(session_id)
            .await
            .map_err(RegistryError::Internal)?;

        if !removed {
            return Err(RegistryError::NotFound);
        }

        info!("Terminated session {}", session_id);

        Ok(())
    }

    /// Snapshot every live session with its inactivity. Server info is
    /// resolved once for the whole listing; each record keeps its own
    /// stored client IP.
    pub async fn list(&self) -> Result<Vec<(SessionRecord, InactivityTime)>, RegistryError> {
        let records = self.storage.all().await.map_err(RegistryError::Internal)?;
        let server_info = netinfo::server_info();

        let mut live = Vec::with_capacity(records.len());

        for mut record in records {
            if record.is_expired(&self.config) {
                continue;
            }

            let inactivity = InactivityTime::since(record.last_accessed);
            record.server_info = server_info.clone();
            live.push((record, inactivity));
        }

        Ok(live)
    }

    /// Evict every expired session; returns the number removed
    pub async fn sweep(&self) -> Result<usize, RegistryError> {
        self.storage
            .cleanup_expired(&self.config)
            .await
            .map_err(RegistryError::Internal)
    }

    /// Fetch a record, lazily evicting it when expired
    async fn live(&self, session_id: &str) -> Result<SessionRecord, RegistryError> {
        let record = self
            .storage
            .get(session_id)
            .await
            .map_err(RegistryError::Internal)?
            .ok_or(RegistryError::NotFound)?;

        if record.is_expired(&self.config) {
            debug!("Session {} expired, evicting", session_id);
            self.storage
                .remove(session_id)
                .await
                .map_err(RegistryError::Internal)?;
            return Err(RegistryError::NotFound);
        }

        Ok(record)
    }
}
