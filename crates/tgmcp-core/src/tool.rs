//! `tg_history` tool orchestration: resolve, fetch, normalize.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    errors::Error,
    history::{normalize, MessageInfo},
    peer::resolve_identifier,
    ports::{HistoryFetcher, PeerDirectory},
    Result,
};

/// Tool-boundary input: dialog name plus an optional continuation offset.
#[derive(Clone, Debug, Deserialize)]
pub struct HistoryArgs {
    pub name: String,
    #[serde(default)]
    pub offset: i32,
}

/// Tool-boundary output. A zero offset means "no further page" and is
/// omitted from the serialized form.
#[derive(Clone, Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<MessageInfo>,
    #[serde(skip_serializing_if = "offset_is_zero")]
    pub offset: i32,
}

fn offset_is_zero(offset: &i32) -> bool {
    *offset == 0
}

/// One request-scoped resolve → fetch → normalize sequence.
///
/// The fetch is the sole suspending operation and is bounded by
/// `fetch_timeout`; expiry surfaces as a fetch-layer error, never as a
/// resolver or normalizer one. No retries happen here.
pub async fn get_history(
    args: HistoryArgs,
    directory: &dyn PeerDirectory,
    fetcher: &dyn HistoryFetcher,
    fetch_timeout: Duration,
) -> Result<HistoryResponse> {
    let peer = resolve_identifier(&args.name, directory).await?;

    let raw = tokio::time::timeout(fetch_timeout, fetcher.fetch(&peer, args.offset))
        .await
        .map_err(|_| {
            Error::Fetch(format!(
                "history fetch timed out after {}ms",
                fetch_timeout.as_millis()
            ))
        })??;

    let normalized = normalize(raw)?;

    Ok(HistoryResponse {
        messages: normalized.messages,
        offset: normalized.offset,
    })
}
