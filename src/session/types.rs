// Session record types, timing configuration and registry errors

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session timing configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle timeout in seconds; a session untouched for longer is expired.
    /// Zero disables expiry entirely.
    pub idle_timeout_secs: i64,
    /// Interval between expired-session sweeps; zero disables the sweep task
    pub sweep_interval_secs: u64,
    /// Timezone used when rendering timestamps in responses
    pub display_timezone: Tz,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 300, // 5 minute idle timeout
            sweep_interval_secs: 60,
            display_timezone: chrono_tz::America::Mexico_City,
        }
    }
}

/// Errors surfaced by registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A required request field was absent or empty
    MissingField(&'static str),
    /// No live session with the given identifier
    NotFound,
    /// Storage backend failure
    Internal(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::MissingField(field) => write!(f, "missing required field: {}", field),
            RegistryError::NotFound => write!(f, "no active session found"),
            RegistryError::Internal(detail) => write!(f, "session storage failure: {}", detail),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Network identity of the client that opened the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Observed peer address, re-derived on every read/refresh
    pub ip: String,
    /// Hardware address as reported by the client at login, never re-derived
    pub mac: String,
}

/// Network identity of the host serving the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub ip: Option<String>,
    pub mac: Option<String>,
}

/// One tracked session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier, immutable, doubles as the registry key
    pub session_id: String,
    pub email: String,
    pub nickname: String,
    pub client_info: ClientInfo,
    pub server_info: ServerInfo,
    /// Captured once at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful status read or refresh
    pub last_accessed: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        email: String,
        nickname: String,
        client_info: ClientInfo,
        server_info: ServerInfo,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            email,
            nickname,
            client_info,
            server_info,
            created_at: now,
            last_accessed: now,
        }
    }

    /// Mark the session as accessed now
    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    /// Whether the session has sat idle beyond the configured timeout
    pub fn is_expired(&self, config: &SessionConfig) -> bool {
        if config.idle_timeout_secs == 0 {
            return false;
        }

        (Utc::now() - self.last_accessed).num_seconds() > config.idle_timeout_secs
    }

    /// Render the record for a response, timestamps localized for display
    pub fn to_view(&self, tz: Tz, inactivity_time: Option<InactivityTime>) -> SessionView {
        SessionView {
            session_id: self.session_id.clone(),
            email: self.email.clone(),
            nickname: self.nickname.clone(),
            client_info: self.client_info.clone(),
            server_info: self.server_info.clone(),
            created_at: format_local(self.created_at, tz),
            last_accessed: format_local(self.last_accessed, tz),
            inactivity_time,
        }
    }
}

/// Wire shape of a session in responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub email: String,
    pub nickname: String,
    pub client_info: ClientInfo,
    pub server_info: ServerInfo,
    #[serde(rename = "createAt")]
    pub created_at: String,
    // clients read this exact (misspelled) key
    #[serde(rename = "lastAccesed")]
    pub last_accessed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactivity_time: Option<InactivityTime>,
}

/// Elapsed time since a session's last access, decomposed for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InactivityTime {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub formatted: String,
}

impl InactivityTime {
    /// Inactivity accumulated since `last_accessed`
    pub fn since(last_accessed: DateTime<Utc>) -> Self {
        Self::from_duration(Utc::now() - last_accessed)
    }

    /// Decompose a duration into wrapped hours/minutes/seconds.
    /// Negative durations clamp to zero rather than erroring.
    pub fn from_duration(diff: Duration) -> Self {
        let total_seconds = diff.num_seconds().max(0);
        let total_minutes = total_seconds / 60;
        let total_hours = total_minutes / 60;

        let hours = total_hours % 24;
        let minutes = total_minutes % 60;
        let seconds = total_seconds % 60;

        Self {
            hours,
            minutes,
            seconds,
            formatted: format!("{}h {}m {}s", hours, minutes, seconds),
        }
    }
}

/// Render a canonical instant in the display timezone,
/// `DD-MM-YYYY HH:mm:ss <tz>` layout
pub fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .format("%d-%m-%Y %H:%M:%S %Z")
        .to_string()
}

/// Login request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub mac_address: Option<String>,
}

/// Body for logout and refresh requests
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdRequest {
    pub session_id: Option<String>,
}

/// Query parameters for status reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> SessionRecord {
        SessionRecord::new(
            "a@x.com".to_string(),
            "a".to_string(),
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

    #[test]
    fn test_new_record_ids_are_unique() {
        let a = record();
        let b = record();
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.created_at, a.last_accessed);
    }

    #[test]
    fn test_touch_advances_last_accessed() {
        let mut rec = record();
        let before = rec.last_accessed;
        rec.touch();
        assert!(rec.last_accessed >= before);
        assert_eq!(rec.created_at, before);
    }

    #[test]
    fn test_inactivity_decomposition() {
        let inactivity = InactivityTime::from_duration(Duration::seconds(3661));
        assert_eq!(inactivity.hours, 1);
        assert_eq!(inactivity.minutes, 1);
        assert_eq!(inactivity.seconds, 1);
        assert_eq!(inactivity.formatted, "1h 1m 1s");
    }

    #[test]
    fn test_inactivity_zero_and_negative() {
        let zero = InactivityTime::from_duration(Duration::seconds(0));
        assert_eq!(zero.formatted, "0h 0m 0s");

        let negative = InactivityTime::from_duration(Duration::seconds(-42));
        assert_eq!(negative.formatted, "0h 0m 0s");
    }

    #[test]
    fn test_inactivity_wraps_hours() {
        let inactivity = InactivityTime::from_duration(Duration::seconds(25 * 3600 + 1));
        assert_eq!(inactivity.hours, 1);
        assert_eq!(inactivity.minutes, 0);
        assert_eq!(inactivity.seconds, 1);
    }

    #[test]
    fn test_is_expired_respects_disabled_timeout() {
        let mut rec = record();
        rec.last_accessed = Utc::now() - Duration::hours(48);

        let disabled = SessionConfig {
            idle_timeout_secs: 0,
            ..SessionConfig::default()
        };
        assert!(!rec.is_expired(&disabled));

        let short = SessionConfig {
            idle_timeout_secs: 60,
            ..SessionConfig::default()
        };
        assert!(rec.is_expired(&short));
    }

    #[test]
    fn test_format_local_layout() {
        // 2024-06-15 18:00:00 UTC is 12:00:00 in Mexico City (UTC-6, no DST)
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap();
        let rendered = format_local(instant, chrono_tz::America::Mexico_City);
        assert!(rendered.starts_with("15-06-2024 12:00:00"));
        assert!(rendered.ends_with("CST"));
    }

    #[test]
    fn test_view_wire_field_names() {
        let rec = record();
        let view = rec.to_view(chrono_tz::America::Mexico_City, None);
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("sessionId").is_some());
        assert!(json.get("createAt").is_some());
        assert!(json.get("lastAccesed").is_some());
        assert!(json.get("inactivityTime").is_none());
        assert_eq!(json["clientInfo"]["mac"], "AA:BB:CC:DD:EE:FF");
    }
}
