//! Identifier grammar + fallback name resolution.
//!
//! Callers address a dialog either with a bracketed, pre-validated form
//! (`chn[<id>:<hash>]`, `cht[<id>]`, `user[<id>]`) copied from an earlier
//! response, or with a free-form name/handle that the messaging service's
//! own directory resolves. Channels need both the numeric id and the
//! access hash, which free-form resolution cannot recover.

use crate::{
    domain::{AccessHash, ChannelId, ChatId, PeerHandle, UserId},
    errors::Error,
    ports::PeerDirectory,
    Result,
};

/// Resolve a user-supplied identifier to an addressing handle.
///
/// Bracketed forms are parsed strictly and fail fast on a malformed payload;
/// there is no silent fallback to name resolution once a recognized prefix
/// and a bracket pair are present. Everything else is delegated to the
/// directory as a whole string.
pub async fn resolve_identifier(
    identifier: &str,
    directory: &dyn PeerDirectory,
) -> Result<PeerHandle> {
    // Both brackets must be present so a plain name that merely starts with
    // "chn"/"cht"/"user" is not misparsed.
    let bracketed = identifier.contains('[') && identifier.contains(']');

    if bracketed && identifier.starts_with("chn") {
        let payload = bracket_payload(identifier, "chn")?;
        let (id, hash) = payload
            .split_once(':')
            .ok_or_else(|| Error::parse(identifier, "expected chn[<id>:<hash>]"))?;
        return Ok(PeerHandle::Channel {
            id: ChannelId(parse_i64(identifier, id)?),
            access_hash: AccessHash(parse_i64(identifier, hash)?),
        });
    }

    if bracketed && identifier.starts_with("cht") {
        let payload = bracket_payload(identifier, "cht")?;
        return Ok(PeerHandle::Chat(ChatId(parse_i64(identifier, payload)?)));
    }

    if bracketed && identifier.starts_with("user") {
        let payload = bracket_payload(identifier, "user")?;
        return Ok(PeerHandle::User(UserId(parse_i64(identifier, payload)?)));
    }

    directory
        .resolve_name(identifier)
        .await
        .map(PeerHandle::Resolved)
}

/// Slice the `<payload>` out of `<prefix>[<payload>]`, requiring the bracket
/// pair to sit exactly around the remainder of the string.
fn bracket_payload<'a>(identifier: &'a str, prefix: &str) -> Result<&'a str> {
    identifier[prefix.len()..]
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::parse(identifier, format!("expected {prefix}[..]")))
}

fn parse_i64(identifier: &str, digits: &str) -> Result<i64> {
    digits
        .parse::<i64>()
        .map_err(|_| Error::parse(identifier, format!("not an integer: {digits:?}")))
}
