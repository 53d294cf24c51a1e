//! Channel registry: lazily-created channels holding a concurrent set of
//! member client ids.

use dashmap::{DashMap, DashSet};

use crate::types::{ChannelName, ClientId};

/// One channel. Topic is a fixed placeholder — `TOPIC` is not a recognised
/// command — kept only so `LIST` has something to report.
#[derive(Debug)]
pub struct Channel {
    pub name: ChannelName,
    pub topic: String,
    pub members: DashSet<ClientId>,
}

impl Channel {
    fn new(name: ChannelName) -> Self {
        Channel {
            name,
            topic: "No topic set".to_owned(),
            members: DashSet::new(),
        }
    }
}

/// Mapping from channel name to [`Channel`]. Channels are never removed on
/// last-leave; `list_visible` filters to non-empty channels at query time.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: DashMap<ChannelName, Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        ChannelRegistry::default()
    }

    /// Returns the existing channel or atomically creates an empty one.
    pub fn get_or_create(&self, name: &str) -> dashmap::mapref::one::RefMut<'_, ChannelName, Channel> {
        self.channels
            .entry(name.to_owned())
            .or_insert_with(|| Channel::new(name.to_owned()))
    }

    pub fn get(&self, name: &str) -> Option<dashmap::mapref::one::Ref<'_, ChannelName, Channel>> {
        self.channels.get(name)
    }

    pub fn is_member(&self, name: &str, client: ClientId) -> bool {
        self.channels
            .get(name)
            .is_some_and(|ch| ch.members.contains(&client))
    }

    /// Removes `client` from every channel it belongs to. Used on disconnect.
    pub fn remove_member_everywhere(&self, client: ClientId) {
        for entry in self.channels.iter() {
            entry.members.remove(&client);
        }
    }

    /// Snapshot of member ids for delivery, taken before releasing any lock
    /// on the channel so a slow recipient write cannot hold up JOIN/PART.
    pub fn members_snapshot(&self, name: &str) -> Vec<ClientId> {
        self.channels
            .get(name)
            .map(|ch| ch.members.iter().map(|id| *id).collect())
            .unwrap_or_default()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Channels with at least one current member, for `LIST`.
    pub fn list_visible(&self) -> Vec<(ChannelName, usize, String)> {
        self.channels
            .iter()
            .filter(|entry| !entry.members.is_empty())
            .map(|entry| (entry.name.clone(), entry.members.len(), entry.topic.clone()))
            .collect()
    }
}
