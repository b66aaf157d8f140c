//! Presence registry: bidirectional user ↔ connection mapping.
//!
//! One registry instance exists per namespace, owned by whoever wires
//! the service together and injected into the relay and handlers.
//! Entries live only in process memory; a restart clears all presence
//! and clients re-register on reconnect.

use dashmap::DashMap;
use uuid::Uuid;

/// Transport namespaces, mirroring the chat and video socket spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Chat/notification connections.
    Chat,
    /// Video call signaling connections.
    Video,
}

impl Namespace {
    /// Return the namespace as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Symmetric dual map between user ids and connection ids.
///
/// At most one live connection exists per user; registering again
/// silently overwrites the previous mapping. The displaced connection
/// is not notified; callers handle stale state.
#[derive(Debug)]
pub struct PresenceRegistry {
    namespace: Namespace,
    user_to_conn: DashMap<Uuid, String>,
    conn_to_user: DashMap<String, Uuid>,
}

impl PresenceRegistry {
    /// Create an empty registry for a namespace.
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            user_to_conn: DashMap::new(),
            conn_to_user: DashMap::new(),
        }
    }

    /// The namespace this registry serves.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Register a user's live connection, overwriting any previous one.
    ///
    /// Both directions are kept consistent: the stale reverse entry for
    /// a displaced connection is removed so `user_for` never resolves
    /// through it.
    pub fn register(&self, user_id: Uuid, connection_id: impl Into<String>) {
        let connection_id = connection_id.into();

        if let Some(old_conn) = self.user_to_conn.insert(user_id, connection_id.clone()) {
            if old_conn != connection_id {
                self.conn_to_user
                    .remove_if(&old_conn, |_, uid| *uid == user_id);
            }
        }
        if let Some(prev_user) = self.conn_to_user.insert(connection_id.clone(), user_id) {
            if prev_user != user_id {
                self.user_to_conn
                    .remove_if(&prev_user, |_, conn| *conn == connection_id);
            }
        }

        tracing::debug!(
            namespace = %self.namespace,
            user_id = %user_id,
            connection_id = %connection_id,
            "Presence registered"
        );
    }

    /// Remove the entry for a connection. No-op for unknown ids.
    ///
    /// Returns the user that was mapped to the connection, if any.
    pub fn remove_by_connection(&self, connection_id: &str) -> Option<Uuid> {
        let (_, user_id) = self.conn_to_user.remove(connection_id)?;
        self.user_to_conn
            .remove_if(&user_id, |_, conn| conn == connection_id);

        tracing::debug!(
            namespace = %self.namespace,
            user_id = %user_id,
            connection_id = %connection_id,
            "Presence removed"
        );
        Some(user_id)
    }

    /// The live connection for a user, if any.
    pub fn connection_for(&self, user_id: Uuid) -> Option<String> {
        self.user_to_conn.get(&user_id).map(|r| r.value().clone())
    }

    /// The user behind a connection, if any.
    pub fn user_for(&self, connection_id: &str) -> Option<Uuid> {
        self.conn_to_user.get(connection_id).map(|r| *r.value())
    }

    /// Snapshot of all live (user, connection) pairs, for the debug
    /// introspection surface.
    pub fn snapshot(&self) -> Vec<(Uuid, String)> {
        self.user_to_conn
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.user_to_conn.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.user_to_conn.is_empty()
    }

    /// Drop all entries, used at shutdown.
    pub fn clear(&self) {
        self.user_to_conn.clear();
        self.conn_to_user.clear();
    }
}
