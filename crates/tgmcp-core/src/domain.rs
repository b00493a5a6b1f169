/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Basic (legacy small-group) chat id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Channel / supergroup id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub i64);

/// Per-session token required alongside a channel id to address it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccessHash(pub i64);

/// Message id within a dialog (numeric, monotonically increasing).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// Adapter-defined peer token produced by free-form name resolution.
///
/// Core never inspects the bytes; the adapter that produced it is the only
/// consumer. Scoped to one request, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaquePeer(pub Vec<u8>);

/// Addressing handle for one fetch, produced by the peer resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerHandle {
    Channel {
        id: ChannelId,
        access_hash: AccessHash,
    },
    Chat(ChatId),
    User(UserId),
    Resolved(OpaquePeer),
}
