//! Shared lightweight type aliases used across the registries and handlers.

/// A channel name, always starting with `#`. Kept as an owned `String` rather
/// than a newtype so it can be used directly as a `DashMap`/`DashSet` key.
pub type ChannelName = String;

/// A validated nickname, unique across all registered clients.
pub type Nickname = String;

/// Identifies one connection for the lifetime of the process. Stable even
/// across a nickname change, unlike `Nickname`.
pub type ClientId = u64;
