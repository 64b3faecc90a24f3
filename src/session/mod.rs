// Session registry module
// Owns the in-memory session map and the session lifecycle rules

pub mod manager;
pub mod storage;
pub mod types;

pub use manager::SessionRegistry;
pub use storage::{MemorySessionStorage, SessionStorage};
pub use types::{
    ClientInfo, InactivityTime, RegistryError, SessionConfig, SessionRecord, ServerInfo,
    SessionView,
};
