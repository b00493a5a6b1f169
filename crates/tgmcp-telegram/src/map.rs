//! TL ⇄ core type mapping.

use grammers_client::grammers_tl_types as tl;
use grammers_client::grammers_tl_types::Deserializable;

use tgmcp_core::{
    domain::{ChannelId, ChatId, MessageId, PeerHandle, UserId},
    errors::Error,
    history::{
        ChatRecord, FromPeer, RawHistoryPage, RawMessage, TextMessage, User, UserRecord,
    },
    Result,
};

/// Build the TL input peer for one fetch.
///
/// Bracketed handles carry everything the wire needs (channels must bring
/// their access hash); an opaque resolved token is just a serialized input
/// peer produced by this same adapter.
pub fn input_peer(peer: &PeerHandle) -> Result<tl::enums::InputPeer> {
    Ok(match peer {
        PeerHandle::Channel { id, access_hash } => tl::types::InputPeerChannel {
            channel_id: id.0,
            access_hash: access_hash.0,
        }
        .into(),
        PeerHandle::Chat(id) => tl::types::InputPeerChat { chat_id: id.0 }.into(),
        PeerHandle::User(id) => tl::types::InputPeerUser {
            user_id: id.0,
            access_hash: 0,
        }
        .into(),
        PeerHandle::Resolved(token) => tl::enums::InputPeer::from_bytes(&token.0)
            .map_err(|e| Error::Fetch(format!("invalid resolved peer token: {e:?}")))?,
    })
}

/// Map the wire-level `messages.Messages` union onto the core page variants,
/// shape for shape. No flattening happens here; the normalizer owns the
/// fail-fast decision on `NotModified`.
pub fn history_page(raw: tl::enums::messages::Messages) -> RawHistoryPage {
    use tl::enums::messages::Messages as M;

    match raw {
        M::Messages(m) => RawHistoryPage::Full {
            messages: messages(m.messages),
            users: users(m.users),
            chats: chats(m.chats),
        },
        M::Slice(m) => RawHistoryPage::Slice {
            count: m.count,
            messages: messages(m.messages),
            users: users(m.users),
            chats: chats(m.chats),
        },
        M::ChannelMessages(m) => RawHistoryPage::Channel {
            count: m.count,
            messages: messages(m.messages),
            users: users(m.users),
            chats: chats(m.chats),
        },
        M::NotModified(m) => RawHistoryPage::NotModified { count: m.count },
    }
}

fn messages(raw: Vec<tl::enums::Message>) -> Vec<RawMessage> {
    raw.into_iter().map(message).collect()
}

fn message(raw: tl::enums::Message) -> RawMessage {
    match raw {
        tl::enums::Message::Message(m) => RawMessage::Text(TextMessage {
            id: MessageId(m.id),
            from: m.from_id.map(from_peer),
            date: i64::from(m.date),
            text: m.message,
        }),
        tl::enums::Message::Service(m) => RawMessage::Service { id: MessageId(m.id) },
        tl::enums::Message::Empty(m) => RawMessage::Empty { id: MessageId(m.id) },
    }
}

fn from_peer(raw: tl::enums::Peer) -> FromPeer {
    match raw {
        tl::enums::Peer::User(p) => FromPeer::User(UserId(p.user_id)),
        tl::enums::Peer::Chat(p) => FromPeer::Chat(ChatId(p.chat_id)),
        tl::enums::Peer::Channel(p) => FromPeer::Channel(ChannelId(p.channel_id)),
    }
}

fn users(raw: Vec<tl::enums::User>) -> Vec<UserRecord> {
    raw.into_iter()
        .map(|u| match u {
            tl::enums::User::User(user) => UserRecord::Full(User {
                id: UserId(user.id),
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
            }),
            tl::enums::User::Empty(stub) => UserRecord::Empty {
                id: UserId(stub.id),
            },
        })
        .collect()
}

fn chats(raw: Vec<tl::enums::Chat>) -> Vec<ChatRecord> {
    raw.into_iter()
        .map(|c| match c {
            tl::enums::Chat::Empty(chat) => ChatRecord {
                id: chat.id,
                title: None,
            },
            tl::enums::Chat::Chat(chat) => ChatRecord {
                id: chat.id,
                title: Some(chat.title),
            },
            tl::enums::Chat::Forbidden(chat) => ChatRecord {
                id: chat.id,
                title: Some(chat.title),
            },
            tl::enums::Chat::Channel(chat) => ChatRecord {
                id: chat.id,
                title: Some(chat.title),
            },
            tl::enums::Chat::ChannelForbidden(chat) => ChatRecord {
                id: chat.id,
                title: Some(chat.title),
            },
        })
        .collect()
}
