use chronos_domain::{NotificationPayload, ID};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Presence registry for the realtime socket transport. The websocket
/// gateway registers every connection together with a sender half; the
/// dispatcher only sees `send_to_user`. A user can hold several live
/// connections at once (multiple tabs/devices).
pub struct SocketChannel {
    inner: Mutex<SocketChannelInner>,
}

struct SocketChannelInner {
    connections: HashMap<String, Connection>,
    users: HashMap<ID, HashSet<String>>,
}

struct Connection {
    user_id: ID,
    sender: UnboundedSender<NotificationPayload>,
}

impl SocketChannel {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SocketChannelInner {
                connections: HashMap::new(),
                users: HashMap::new(),
            }),
        }
    }

    pub fn connect(
        &self,
        user_id: &ID,
        connection_id: &str,
        sender: UnboundedSender<NotificationPayload>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.connections.insert(
            connection_id.to_string(),
            Connection {
                user_id: user_id.clone(),
                sender,
            },
        );
        inner
            .users
            .entry(user_id.clone())
            .or_insert_with(HashSet::new)
            .insert(connection_id.to_string());
        debug!("Client connected: {}", connection_id);
    }

    pub fn disconnect(&self, connection_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(connection) = inner.connections.remove(connection_id) {
            if let Some(connection_ids) = inner.users.get_mut(&connection.user_id) {
                connection_ids.remove(connection_id);
                if connection_ids.is_empty() {
                    inner.users.remove(&connection.user_id);
                }
            }
        }
        debug!("Client disconnected: {}", connection_id);
    }

    pub fn connection_count(&self, user_id: &ID) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.users.get(user_id).map(|c| c.len()).unwrap_or(0)
    }

    /// Emits to every live connection of the user. True iff at least one
    /// connection accepted the payload. Connections whose receiving side
    /// is gone are dropped from the registry on the way.
    pub fn send_to_user(&self, user_id: &ID, payload: &NotificationPayload) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let connection_ids: Vec<String> = match inner.users.get(user_id) {
            Some(connection_ids) => connection_ids.iter().cloned().collect(),
            None => return false,
        };

        let mut delivered = 0;
        let mut stale = Vec::new();
        for connection_id in connection_ids {
            match inner.connections.get(&connection_id) {
                Some(connection) if connection.sender.send(payload.clone()).is_ok() => {
                    delivered += 1;
                }
                _ => stale.push(connection_id),
            }
        }

        for connection_id in stale {
            inner.connections.remove(&connection_id);
            if let Some(connection_ids) = inner.users.get_mut(user_id) {
                connection_ids.remove(&connection_id);
                if connection_ids.is_empty() {
                    inner.users.remove(user_id);
                }
            }
        }

        delivered > 0
    }
}

impl Default for SocketChannel {
    fn default() -> Self {
        Self::new()
    }
}
