//! Uplink senders for meteonode stations
//!
//! ## Overview
//!
//! The transmission buffer in `meteonode-core` talks to a single
//! [`Sender`]. This crate provides the concrete senders and the glue that
//! picks one from configuration:
//!
//! | Uplink      | Request                          | Delivered on |
//! |-------------|----------------------------------|--------------|
//! | ThingSpeak  | `GET {url}?api_key=..&field1..5` | 200          |
//! | JSON POST   | `POST {url}` + bearer token      | 200, 201     |
//!
//! Both senders bring the link up on demand (bounded by the link timeout)
//! and drop it again when the station goes to sleep.
//!
//! ### Transports
//!
//! Senders are generic over the core [`Network`] port. On the node that is the
//! WiFi radio; on a host the [`http::HttpNetwork`] agent (feature `http`)
//! stands in for it.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meteonode_connectors::http::HttpNetwork;
//! use meteonode_connectors::UplinkConfig;
//! use meteonode_core::config::LinkConfig;
//! use meteonode_core::{StationInfo, SystemClock};
//!
//! let _uplink = UplinkConfig::thingspeak("WRITE_KEY")
//!     .build(
//!         HttpNetwork::new(),
//!         SystemClock::new(),
//!         LinkConfig::default(),
//!         StationInfo::new("Bench", "Lab"),
//!     )?;
//! # Ok::<(), meteonode_connectors::UplinkError>(())
//! ```

pub mod http_post;
pub mod thingspeak;
pub mod transport;

#[cfg(feature = "http")]
pub mod http;

pub use http_post::JsonPostSender;
pub use thingspeak::ThingSpeakSender;
pub use transport::Transport;

#[cfg(feature = "http")]
pub use http::HttpNetwork;

use meteonode_core::config::LinkConfig;
use meteonode_core::{BufferedEntry, Clock, Network, NodeResult, Sender, StationInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors building an uplink from configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UplinkError {
    /// Endpoint is not an http(s) URL
    #[error("Invalid uplink URL: {0}")]
    InvalidUrl(String),

    /// Endpoint requires a key and none was configured
    #[error("Missing API key for {0}")]
    MissingApiKey(&'static str),
}

/// Connection statistics common to all senders
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Number of link associations
    pub reconnections: u32,
    /// Last error message
    pub last_error: Option<String>,
}

/// Which uplink a node publishes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UplinkConfig {
    /// Query-string GET to a ThingSpeak channel
    #[serde(rename = "thingspeak")]
    ThingSpeak {
        /// Update endpoint
        #[serde(default = "default_thingspeak_url")]
        url: String,
        /// Channel write key
        api_key: String,
    },
    /// JSON document POSTed to an ingestion endpoint
    HttpPost {
        /// Endpoint
        url: String,
        /// Bearer token
        api_key: String,
    },
}

fn default_thingspeak_url() -> String {
    thingspeak::DEFAULT_URL.to_string()
}

impl UplinkConfig {
    /// ThingSpeak with the public update endpoint
    pub fn thingspeak(api_key: impl Into<String>) -> Self {
        Self::ThingSpeak { url: default_thingspeak_url(), api_key: api_key.into() }
    }

    /// JSON POST to `url`
    pub fn http_post(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::HttpPost { url: url.into(), api_key: api_key.into() }
    }

    /// Check URL scheme and key presence
    pub fn validate(&self) -> Result<(), UplinkError> {
        let (url, api_key, name) = match self {
            Self::ThingSpeak { url, api_key } => (url, api_key, "thingspeak"),
            Self::HttpPost { url, api_key } => (url, api_key, "http_post"),
        };
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(UplinkError::InvalidUrl(url.clone()));
        }
        if api_key.is_empty() {
            return Err(UplinkError::MissingApiKey(name));
        }
        Ok(())
    }

    /// Validate and build the matching sender
    pub fn build<N: Network, C: Clock>(
        self,
        network: N,
        clock: C,
        link: LinkConfig,
        station: StationInfo,
    ) -> Result<Uplink<N, C>, UplinkError> {
        self.validate()?;
        Ok(match self {
            Self::ThingSpeak { url, api_key } => {
                Uplink::ThingSpeak(ThingSpeakSender::new(url, api_key, network, clock, link))
            }
            Self::HttpPost { url, api_key } => {
                Uplink::HttpPost(JsonPostSender::new(url, &api_key, station, network, clock, link))
            }
        })
    }
}

/// A configured sender of either kind
pub enum Uplink<N: Network, C: Clock> {
    /// Query-string GET sender
    ThingSpeak(ThingSpeakSender<N, C>),
    /// JSON POST sender
    HttpPost(JsonPostSender<N, C>),
}

impl<N: Network, C: Clock> Uplink<N, C> {
    /// Delivery counters of the active sender
    pub fn stats(&self) -> &ConnectionStats {
        match self {
            Self::ThingSpeak(s) => s.stats(),
            Self::HttpPost(s) => s.stats(),
        }
    }
}

impl<N: Network, C: Clock> Sender for Uplink<N, C> {
    fn send(&mut self, entry: &BufferedEntry) -> NodeResult<()> {
        match self {
            Self::ThingSpeak(s) => s.send(entry),
            Self::HttpPost(s) => s.send(entry),
        }
    }

    fn idle(&mut self) {
        match self {
            Self::ThingSpeak(s) => s.idle(),
            Self::HttpPost(s) => s.idle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meteonode_core::sim::{SimClock, SimNetwork};

    fn build(config: UplinkConfig) -> Result<Uplink<SimNetwork, SimClock>, UplinkError> {
        config.build(SimNetwork::online(), SimClock::new(), LinkConfig::default(), StationInfo::default())
    }

    #[test]
    fn rejects_bad_scheme() {
        let err = build(UplinkConfig::http_post("ftp://example.net", "k")).err();
        assert_eq!(err, Some(UplinkError::InvalidUrl("ftp://example.net".into())));
    }

    #[test]
    fn rejects_missing_key() {
        let err = build(UplinkConfig::thingspeak("")).err();
        assert_eq!(err, Some(UplinkError::MissingApiKey("thingspeak")));
    }

    #[test]
    fn builds_matching_sender() {
        assert!(matches!(build(UplinkConfig::thingspeak("k")), Ok(Uplink::ThingSpeak(_))));
        assert!(matches!(
            build(UplinkConfig::http_post("https://example.net/in", "k")),
            Ok(Uplink::HttpPost(_))
        ));
    }

    #[test]
    fn config_from_json() {
        let config: UplinkConfig =
            serde_json::from_str(r#"{"kind":"thingspeak","api_key":"ABC"}"#).unwrap();
        assert_eq!(config, UplinkConfig::thingspeak("ABC"));

        let config: UplinkConfig = serde_json::from_str(
            r#"{"kind":"http_post","url":"https://example.net/in","api_key":"t"}"#,
        )
        .unwrap();
        assert_eq!(config, UplinkConfig::http_post("https://example.net/in", "t"));
    }
}
