//! History-page normalization.
//!
//! The transport hands back one of several concrete page shapes; all of them
//! reduce to the same triple (messages, users, chats). Normalization keeps
//! only plain text messages, resolves sender names through a per-call user
//! index, and derives the continuation offset for the next page.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    domain::{ChannelId, ChatId, MessageId, UserId},
    errors::Error,
    utils::format_message_date,
    Result,
};

/// Full user record as carried in a history page's user set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// User-set entry. `Empty` is the deleted/placeholder stub the service emits
/// for accounts it no longer knows; it never enters the sender index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserRecord {
    Full(User),
    Empty { id: UserId },
}

/// Chat-set entry. Carried through shape unification but not consumed by
/// normalization itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRecord {
    pub id: i64,
    pub title: Option<String>,
}

/// Sender reference on a message. Only the user case resolves to a name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FromPeer {
    User(UserId),
    Chat(ChatId),
    Channel(ChannelId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMessage {
    pub id: MessageId,
    pub from: Option<FromPeer>,
    /// Epoch seconds as delivered by the service.
    pub date: i64,
    pub text: String,
}

/// One entry of a raw page's message sequence. Only `Text` survives
/// normalization; service notices and empty holes are silently skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawMessage {
    Text(TextMessage),
    Service { id: MessageId },
    Empty { id: MessageId },
}

/// Raw history page as returned by the transport, mirroring the wire-level
/// `messages.Messages` union. Ordering within a page is preserved exactly as
/// delivered (newest-first by service contract), never re-sorted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawHistoryPage {
    Full {
        messages: Vec<RawMessage>,
        users: Vec<UserRecord>,
        chats: Vec<ChatRecord>,
    },
    Slice {
        count: i32,
        messages: Vec<RawMessage>,
        users: Vec<UserRecord>,
        chats: Vec<ChatRecord>,
    },
    Channel {
        count: i32,
        messages: Vec<RawMessage>,
        users: Vec<UserRecord>,
        chats: Vec<ChatRecord>,
    },
    /// Cache-validation variant; carries no message triple. Reaching the
    /// normalizer with it is a collaborator contract violation.
    NotModified { count: i32 },
}

impl RawHistoryPage {
    fn shape_tag(&self) -> &'static str {
        match self {
            Self::Full { .. } => "messages.messages",
            Self::Slice { .. } => "messages.messagesSlice",
            Self::Channel { .. } => "messages.channelMessages",
            Self::NotModified { .. } => "messages.messagesNotModified",
        }
    }
}

/// Display-ready message record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageInfo {
    pub who: String,
    pub when: String,
    pub text: String,
    /// Raw epoch kept for potential future sorting; never serialized.
    #[serde(skip)]
    ts: i64,
}

impl MessageInfo {
    pub fn ts(&self) -> i64 {
        self.ts
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedHistory {
    pub messages: Vec<MessageInfo>,
    /// Id of the oldest text message in the page, 0 when there is none.
    /// Feed back as the next request's offset.
    pub offset: i32,
}

/// Reduce a raw page to display-ready records plus the continuation offset.
pub fn normalize(raw: RawHistoryPage) -> Result<NormalizedHistory> {
    let (messages, users) = match raw {
        RawHistoryPage::Full {
            messages, users, ..
        }
        | RawHistoryPage::Slice {
            messages, users, ..
        }
        | RawHistoryPage::Channel {
            messages, users, ..
        } => (messages, users),
        other @ RawHistoryPage::NotModified { .. } => {
            return Err(Error::UnexpectedShape(other.shape_tag().to_string()));
        }
    };

    // Per-call sender index; deleted-user stubs stay out of it.
    let index: HashMap<i64, &User> = users
        .iter()
        .filter_map(|u| match u {
            UserRecord::Full(user) => Some((user.id.0, user)),
            UserRecord::Empty { .. } => None,
        })
        .collect();

    let mut out = Vec::with_capacity(messages.len());
    for msg in &messages {
        let RawMessage::Text(m) = msg else {
            continue;
        };

        let who = match m.from {
            Some(FromPeer::User(id)) => index
                .get(&id.0)
                .map(|user| display_name(user))
                .unwrap_or_default(),
            // Channel-as-sender, chat-as-sender, or no sender at all: the
            // documented empty-sender case.
            _ => String::new(),
        };

        out.push(MessageInfo {
            who,
            when: format_message_date(m.date),
            text: m.text.clone(),
            ts: m.date,
        });
    }

    Ok(NormalizedHistory {
        messages: out,
        offset: continuation_offset(&messages),
    })
}

/// Id of the chronologically oldest text message, assuming the service
/// delivers pages newest-first. Scanning direction is part of the contract;
/// do not flip it without flipping the assumption.
fn continuation_offset(messages: &[RawMessage]) -> i32 {
    messages
        .iter()
        .rev()
        .find_map(|m| match m {
            RawMessage::Text(t) => Some(t.id.0),
            _ => None,
        })
        .unwrap_or(0)
}

/// Best-effort display string for a sender: username wins, then the
/// concatenated first/last name, then empty.
pub fn display_name(user: &User) -> String {
    if let Some(username) = user.username.as_deref() {
        if !username.is_empty() {
            return username.to_string();
        }
    }

    [user.first_name.as_deref(), user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: i32, from: Option<FromPeer>, date: i64, text: &str) -> RawMessage {
        RawMessage::Text(TextMessage {
            id: MessageId(id),
            from,
            date,
            text: text.to_string(),
        })
    }

    fn full_user(id: i64, username: Option<&str>, first: Option<&str>, last: Option<&str>) -> UserRecord {
        UserRecord::Full(User {
            id: UserId(id),
            username: username.map(str::to_string),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
        })
    }

    fn slice(messages: Vec<RawMessage>, users: Vec<UserRecord>) -> RawHistoryPage {
        RawHistoryPage::Slice {
            count: 1000,
            messages,
            users,
            chats: Vec::new(),
        }
    }

    #[test]
    fn empty_page_normalizes_to_empty_and_zero_offset() {
        let page = RawHistoryPage::Full {
            messages: Vec::new(),
            users: Vec::new(),
            chats: Vec::new(),
        };
        let h = normalize(page).unwrap();
        assert!(h.messages.is_empty());
        assert_eq!(h.offset, 0);
    }

    #[test]
    fn non_text_entries_are_dropped_from_list_and_offset() {
        let page = slice(
            vec![
                text(50, None, 1_700_000_000, "newest"),
                RawMessage::Service { id: MessageId(45) },
                text(40, None, 1_699_999_000, "middle"),
                RawMessage::Empty { id: MessageId(35) },
                text(30, None, 1_699_998_000, "oldest"),
                RawMessage::Service { id: MessageId(20) },
            ],
            Vec::new(),
        );
        let h = normalize(page).unwrap();
        assert_eq!(h.messages.len(), 3);
        assert_eq!(h.messages[0].text, "newest");
        assert_eq!(h.messages[2].text, "oldest");
        // Trailing service entry is invisible: offset is the oldest *text* id.
        assert_eq!(h.offset, 30);
    }

    #[test]
    fn page_of_only_service_messages_yields_zero_offset() {
        let page = slice(
            vec![
                RawMessage::Service { id: MessageId(9) },
                RawMessage::Empty { id: MessageId(8) },
            ],
            Vec::new(),
        );
        let h = normalize(page).unwrap();
        assert!(h.messages.is_empty());
        assert_eq!(h.offset, 0);
    }

    #[test]
    fn username_takes_precedence_over_full_name() {
        let page = slice(
            vec![text(1, Some(FromPeer::User(UserId(7))), 1_700_000_000, "hi")],
            vec![full_user(7, Some("alice"), Some("Alice"), Some("Liddell"))],
        );
        let h = normalize(page).unwrap();
        assert_eq!(h.messages[0].who, "alice");
    }

    #[test]
    fn full_name_is_the_fallback_and_empty_parts_are_skipped() {
        assert_eq!(
            display_name(&User {
                id: UserId(1),
                username: None,
                first_name: Some("Alice".to_string()),
                last_name: Some("Liddell".to_string()),
            }),
            "Alice Liddell"
        );
        assert_eq!(
            display_name(&User {
                id: UserId(1),
                username: Some(String::new()),
                first_name: Some("Alice".to_string()),
                last_name: None,
            }),
            "Alice"
        );
        assert_eq!(
            display_name(&User {
                id: UserId(1),
                username: None,
                first_name: None,
                last_name: None,
            }),
            ""
        );
    }

    #[test]
    fn unknown_or_non_user_senders_yield_empty_who() {
        let page = slice(
            vec![
                text(3, Some(FromPeer::User(UserId(99))), 1_700_000_000, "ghost"),
                text(2, Some(FromPeer::Channel(ChannelId(5))), 1_700_000_000, "cast"),
                text(1, None, 1_700_000_000, "anon"),
            ],
            vec![full_user(7, Some("alice"), None, None)],
        );
        let h = normalize(page).unwrap();
        assert!(h.messages.iter().all(|m| m.who.is_empty()));
    }

    #[test]
    fn deleted_user_stub_is_skipped_without_error() {
        let page = slice(
            vec![text(1, Some(FromPeer::User(UserId(7))), 1_700_000_000, "hi")],
            vec![UserRecord::Empty { id: UserId(7) }],
        );
        let h = normalize(page).unwrap();
        assert_eq!(h.messages[0].who, "");
    }

    #[test]
    fn channel_shape_unifies_like_the_others() {
        let page = RawHistoryPage::Channel {
            count: 2,
            messages: vec![text(10, None, 1_700_000_000, "chan")],
            users: Vec::new(),
            chats: vec![ChatRecord {
                id: 5,
                title: Some("news".to_string()),
            }],
        };
        let h = normalize(page).unwrap();
        assert_eq!(h.messages.len(), 1);
        assert_eq!(h.offset, 10);
    }

    #[test]
    fn not_modified_is_an_unexpected_shape() {
        let err = normalize(RawHistoryPage::NotModified { count: 3 }).unwrap_err();
        match err {
            Error::UnexpectedShape(tag) => {
                assert_eq!(tag, "messages.messagesNotModified");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn normalize_is_idempotent_per_input() {
        let page = slice(
            vec![
                text(50, Some(FromPeer::User(UserId(7))), 1_700_000_000, "a"),
                RawMessage::Service { id: MessageId(45) },
                text(30, None, 1_699_998_000, "b"),
            ],
            vec![full_user(7, Some("alice"), None, None)],
        );
        let first = normalize(page.clone()).unwrap();
        let second = normalize(page).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn text_body_is_carried_verbatim() {
        let body = "  spaced\tand\nraw  ";
        let page = slice(vec![text(1, None, 1_700_000_000, body)], Vec::new());
        let h = normalize(page).unwrap();
        assert_eq!(h.messages[0].text, body);
    }

    #[test]
    fn raw_timestamp_is_retained_but_not_serialized() {
        let page = slice(vec![text(1, None, 1_700_000_000, "hi")], Vec::new());
        let h = normalize(page).unwrap();
        assert_eq!(h.messages[0].ts(), 1_700_000_000);
        let json = serde_json::to_value(&h.messages[0]).unwrap();
        assert!(json.get("ts").is_none());
        assert!(json.get("when").is_some());
    }
}
