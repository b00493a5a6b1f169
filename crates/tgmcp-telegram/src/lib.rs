//! Telegram MTProto adapter (grammers).
//!
//! Implements the `tgmcp-core` ports over a user-session grammers client:
//! free-form names go through the service directory (`resolve_username`),
//! history pages come from raw `messages.getHistory` invocations.

use async_trait::async_trait;

use grammers_client::grammers_tl_types::Serializable;
use grammers_client::{
    grammers_tl_types as tl, session::Session, Client, Config as ClientConfig, InitParams,
};

pub mod map;

use tgmcp_core::{
    config::Config,
    domain::{OpaquePeer, PeerHandle},
    errors::Error,
    history::RawHistoryPage,
    ports::{HistoryFetcher, PeerDirectory},
    Result,
};

/// Connected, authorized MTProto gateway implementing both core ports.
#[derive(Clone)]
pub struct TelegramGateway {
    client: Client,
    page_limit: i32,
}

impl TelegramGateway {
    /// Connect with the configured credentials and session file.
    ///
    /// Session bootstrap (login) is out of scope; an unauthorized session is
    /// refused so the caller gets a clear config error instead of cryptic
    /// RPC failures on the first fetch.
    pub async fn connect(cfg: &Config) -> Result<Self> {
        let session = Session::load_file_or_create(&cfg.session_file)?;

        let client = Client::connect(ClientConfig {
            session,
            api_id: cfg.app_id,
            api_hash: cfg.app_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| Error::External(format!("telegram connect failed: {e}")))?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| Error::External(format!("authorization check failed: {e}")))?;
        if !authorized {
            return Err(Error::Config(format!(
                "session {} is not authorized; log in with your usual Telegram tooling first",
                cfg.session_file.display()
            )));
        }

        Ok(Self {
            client,
            page_limit: cfg.page_limit as i32,
        })
    }
}

#[async_trait]
impl PeerDirectory for TelegramGateway {
    async fn resolve_name(&self, name: &str) -> Result<OpaquePeer> {
        let query = name.strip_prefix('@').unwrap_or(name);

        let chat = self
            .client
            .resolve_username(query)
            .await
            .map_err(|e| Error::Resolution(format!("resolve {name:?}: {e}")))?
            .ok_or_else(|| {
                Error::Resolution(format!("name does not resolve to a peer: {name:?}"))
            })?;

        Ok(OpaquePeer(chat.pack().to_input_peer().to_bytes()))
    }
}

#[async_trait]
impl HistoryFetcher for TelegramGateway {
    async fn fetch(&self, peer: &PeerHandle, offset_id: i32) -> Result<RawHistoryPage> {
        let request = tl::functions::messages::GetHistory {
            peer: map::input_peer(peer)?,
            offset_id,
            offset_date: 0,
            add_offset: 0,
            limit: self.page_limit,
            max_id: 0,
            min_id: 0,
            hash: 0,
        };

        let raw = self
            .client
            .invoke(&request)
            .await
            .map_err(|e| Error::Fetch(format!("messages.getHistory: {e}")))?;

        Ok(map::history_page(raw))
    }
}
