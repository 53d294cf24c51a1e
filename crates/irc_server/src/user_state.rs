//! Per-connection state: nickname, registration progress, channel
//! membership and the outbound delivery channel.

use std::net::SocketAddr;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashSet;
use tokio::sync::mpsc::Sender;

use crate::types::{ChannelName, ClientId};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// The user-mode flag this server understands. `""` means no flags set.
pub const OPERATOR_MODE: char = 'o';

/// One accepted TCP connection. Cheap to clone via [`ClientHandle`] —
/// construction happens once per connection, in the accept loop.
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    pub addr: SocketAddr,
    pub outbound: Sender<String>,

    nickname: RwLock<Option<String>>,
    ident: RwLock<Option<String>>,
    user_received: AtomicBool,
    registered: AtomicBool,
    disconnected: AtomicBool,
    mode: RwLock<String>,
    pub joined: DashSet<ChannelName>,
}

impl Client {
    pub fn new(addr: SocketAddr, outbound: Sender<String>) -> Self {
        Client {
            id: next_client_id(),
            addr,
            outbound,
            nickname: RwLock::new(None),
            ident: RwLock::new(None),
            user_received: AtomicBool::new(false),
            registered: AtomicBool::new(false),
            disconnected: AtomicBool::new(false),
            mode: RwLock::new(String::new()),
            joined: DashSet::new(),
        }
    }

    pub fn nickname(&self) -> Option<String> {
        self.nickname.read().expect("nickname lock poisoned").clone()
    }

    /// The `<user>` token from the USER command. Falls back to `"user"`
    /// before USER has been received.
    pub fn ident(&self) -> String {
        self.ident
            .read()
            .expect("ident lock poisoned")
            .clone()
            .unwrap_or_else(|| "user".to_owned())
    }

    pub fn set_ident(&self, ident: &str) {
        *self.ident.write().expect("ident lock poisoned") = Some(ident.to_owned());
    }

    /// Display form used as the first argument of numeric replies before a
    /// nickname has been assigned, matching the RFC convention of `*`.
    pub fn nickname_or_star(&self) -> String {
        self.nickname().unwrap_or_else(|| "*".to_owned())
    }

    pub fn set_nickname(&self, nick: &str) {
        *self.nickname.write().expect("nickname lock poisoned") = Some(nick.to_owned());
    }

    pub fn user_received(&self) -> bool {
        self.user_received.load(Ordering::Acquire)
    }

    pub fn mark_user_received(&self) {
        self.user_received.store(true, Ordering::Release);
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub fn mark_registered(&self) {
        self.registered.store(true, Ordering::Release);
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Marks the client disconnected. Returns `true` the first time it is
    /// called for this client, so callers can make QUIT/cleanup idempotent.
    pub fn mark_disconnected(&self) -> bool {
        !self.disconnected.swap(true, Ordering::AcqRel)
    }

    pub fn mode(&self) -> String {
        self.mode.read().expect("mode lock poisoned").clone()
    }

    pub fn has_operator_mode(&self) -> bool {
        self.mode().contains(OPERATOR_MODE)
    }

    pub fn set_operator_mode(&self, enabled: bool) {
        let mut mode = self.mode.write().expect("mode lock poisoned");
        if enabled {
            if !mode.contains(OPERATOR_MODE) {
                mode.push(OPERATOR_MODE);
            }
        } else {
            mode.retain(|c| c != OPERATOR_MODE);
        }
    }

    /// Best-effort enqueue onto this client's outbound channel. A full or
    /// closed channel is logged by the caller and otherwise ignored — one
    /// slow or gone recipient must never block delivery to the rest.
    pub fn try_send(&self, line: String) -> Result<(), String> {
        self.outbound
            .try_send(line)
            .map_err(|err| format!("outbound channel for client {}: {err}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn test_client() -> Client {
        let (tx, _rx) = mpsc::channel(16);
        Client::new("127.0.0.1:1234".parse().unwrap(), tx)
    }

    #[test]
    fn fresh_client_is_unregistered_with_no_nickname() {
        let client = test_client();
        assert_eq!(client.nickname(), None);
        assert_eq!(client.nickname_or_star(), "*");
        assert!(!client.is_registered());
        assert!(!client.user_received());
    }

    #[test]
    fn mark_disconnected_is_idempotent() {
        let client = test_client();
        assert!(client.mark_disconnected());
        assert!(!client.mark_disconnected());
        assert!(client.is_disconnected());
    }

    #[test]
    fn operator_mode_toggles() {
        let client = test_client();
        assert_eq!(client.mode(), "");
        client.set_operator_mode(true);
        assert!(client.has_operator_mode());
        client.set_operator_mode(false);
        assert!(!client.has_operator_mode());
    }

    #[test]
    fn ids_are_unique_across_clients() {
        let a = test_client();
        let b = test_client();
        assert_ne!(a.id, b.id);
    }
}
