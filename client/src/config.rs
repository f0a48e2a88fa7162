use std::{env, time::Duration};

use url::Url;

use crate::{ClientError, Result};

/// Path of the game socket on the page's host.
pub const SOCKET_PATH: &str = "/websession";

const DEFAULT_PAGE_URL: &str = "http://localhost:4000";
const DEFAULT_RECONNECT_DELAY_MS: u64 = 1000;

/// Where the game server lives and how to treat a lost connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL of the page serving the game. The socket is opened on its host.
    pub page_url: Url,
    pub socket_path: String,
    /// Fixed pause before every reconnect attempt.
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    pub fn new(page_url: &str) -> Result<Self> {
        Ok(Self {
            page_url: Url::parse(page_url)?,
            socket_path: SOCKET_PATH.to_string(),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
        })
    }

    /// Read `MINESWEEPER_URL` and `MINESWEEPER_RECONNECT_DELAY_MS`.
    pub fn from_env() -> Result<Self> {
        let page_url = env::var("MINESWEEPER_URL").unwrap_or_else(|_| DEFAULT_PAGE_URL.to_string());

        let reconnect_delay_ms: u64 = env::var("MINESWEEPER_RECONNECT_DELAY_MS")
            .unwrap_or_else(|_| DEFAULT_RECONNECT_DELAY_MS.to_string())
            .parse()
            .unwrap_or(DEFAULT_RECONNECT_DELAY_MS);

        Ok(Self::new(&page_url)?.with_reconnect_delay(Duration::from_millis(reconnect_delay_ms)))
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// The socket URL: same host and port as the page, `wss` when the page
    /// was served over `https`.
    pub fn websocket_url(&self) -> Result<String> {
        let scheme = match self.page_url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => return Err(ClientError::UnsupportedScheme(other.to_string())),
        };

        let mut ws_url = self.page_url.clone();
        ws_url
            .set_scheme(scheme)
            .map_err(|_| ClientError::UnsupportedScheme(scheme.to_string()))?;
        ws_url.set_path(&self.socket_path);
        ws_url.set_query(None);
        ws_url.set_fragment(None);

        Ok(ws_url.to_string())
    }
}
