//! Process-wide shared state: the channel and nickname registries, the
//! connected-client table and the disconnect cooldown tracker, all held
//! behind per-shard locking (`DashMap`/`DashSet`) rather than one global
//! mutex — the async counterpart of the source's single `clients_lock`.

use std::sync::Arc;

use dashmap::DashMap;
use log::warn;

use crate::channels::ChannelRegistry;
use crate::config::Config;
use crate::cooldown::DisconnectTracker;
use crate::types::{ClientId, Nickname};
use crate::user_state::Client;

struct ServerStateInner {
    config: Config,
    clients: DashMap<ClientId, Arc<Client>>,
    nicknames: DashMap<Nickname, ClientId>,
    channels: ChannelRegistry,
    disconnects: Arc<DisconnectTracker>,
}

/// Cheaply cloneable handle to the server's shared registries, handed to
/// every connection task.
#[derive(Clone)]
pub struct ServerState(Arc<ServerStateInner>);

impl ServerState {
    pub fn new(config: Config) -> Self {
        ServerState(Arc::new(ServerStateInner {
            config,
            clients: DashMap::new(),
            nicknames: DashMap::new(),
            channels: ChannelRegistry::new(),
            disconnects: Arc::new(DisconnectTracker::new()),
        }))
    }

    pub fn config(&self) -> &Config {
        &self.0.config
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.0.channels
    }

    pub fn disconnects(&self) -> &DisconnectTracker {
        &self.0.disconnects
    }

    /// A separately-owned handle to the disconnect tracker, for the
    /// background sweeper task to hold independently of the rest of the
    /// shared state.
    pub fn disconnects_handle(&self) -> Arc<DisconnectTracker> {
        Arc::clone(&self.0.disconnects)
    }

    pub fn register_client(&self, client: Arc<Client>) {
        self.0.clients.insert(client.id, client);
    }

    pub fn deregister_client(&self, id: ClientId) {
        self.0.clients.remove(&id);
    }

    pub fn client(&self, id: ClientId) -> Option<Arc<Client>> {
        self.0.clients.get(&id).map(|entry| Arc::clone(&entry))
    }

    pub fn client_count(&self) -> usize {
        self.0.clients.len()
    }

    /// All currently connected client ids, for `WHO` with no argument and
    /// for shutdown broadcast.
    pub fn all_client_ids(&self) -> Vec<ClientId> {
        self.0.clients.iter().map(|entry| *entry.key()).collect()
    }

    /// Attempts to claim `nick` for `id`. Fails if another client already
    /// holds it — the registry is the single source of truth for the
    /// uniqueness invariant, checked and inserted atomically via `entry`.
    pub fn try_claim_nickname(&self, nick: &str, id: ClientId) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.0.nicknames.entry(nick.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    pub fn release_nickname(&self, nick: &str) {
        self.0.nicknames.remove(nick);
    }

    /// Atomically moves a nickname from `old` to `new`, leaving the
    /// registry untouched if `new` is already taken by someone else.
    pub fn rename_nickname(&self, old: &str, new: &str, id: ClientId) -> bool {
        if !self.try_claim_nickname(new, id) {
            return false;
        }
        self.release_nickname(old);
        true
    }

    pub fn find_by_nickname(&self, nick: &str) -> Option<Arc<Client>> {
        let id = *self.0.nicknames.get(nick)?;
        self.client(id)
    }

    pub fn nickname_count(&self) -> usize {
        self.0.nicknames.len()
    }

    /// Enqueues `line` on the recipient's outbound channel. Logs and moves
    /// on without affecting the sender on a write failure.
    pub fn deliver_to(&self, id: ClientId, line: String) {
        if let Some(client) = self.client(id) {
            if let Err(err) = client.try_send(line) {
                warn!("delivery to client {id} dropped: {err}");
            }
        }
    }

    /// Delivers to every member of `channel` except `except`, snapshotting
    /// the member set before writing so a slow recipient cannot hold up
    /// the sender or race a concurrent JOIN/PART.
    pub fn deliver_to_channel_except(&self, channel: &str, except: ClientId, line: &str) {
        for member in self.0.channels.members_snapshot(channel) {
            if member != except {
                self.deliver_to(member, line.to_owned());
            }
        }
    }

    pub fn deliver_to_channel(&self, channel: &str, line: &str) {
        for member in self.0.channels.members_snapshot(channel) {
            self.deliver_to(member, line.to_owned());
        }
    }

    pub fn broadcast_all(&self, line: &str) {
        for id in self.all_client_ids() {
            self.deliver_to(id, line.to_owned());
        }
    }
}
