use async_trait::async_trait;

use crate::{
    domain::{OpaquePeer, PeerHandle},
    history::RawHistoryPage,
    Result,
};

/// Port for the messaging service's name directory.
///
/// Given a free-form display name or handle, resolve it to an opaque peer
/// token the paired [`HistoryFetcher`] understands. Failures are
/// `Error::Resolution` ("not found" / "ambiguous" style, passed through).
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    async fn resolve_name(&self, name: &str) -> Result<OpaquePeer>;
}

/// Port for the message-fetch service.
///
/// Returns one raw page of history for the peer, starting below `offset_id`
/// (0 means "from the top"). Transport/protocol failures surface as
/// `Error::Fetch`; no retries happen behind this port.
#[async_trait]
pub trait HistoryFetcher: Send + Sync {
    async fn fetch(&self, peer: &PeerHandle, offset_id: i32) -> Result<RawHistoryPage>;
}
