//! ThingSpeak-style query-string uplink
//!
//! One GET per record:
//!
//! ```text
//! {url}?api_key=K&field1=<temperature>&field2=<humidity>&field3=<pressure>
//!      &field4=<battery_voltage>&field5=<battery_percent>
//! ```
//!
//! Every field is written with two decimals. Only a 200 counts as delivered;
//! anything else leaves the entry in the transmission buffer.

use meteonode_core::config::LinkConfig;
use meteonode_core::{BufferedEntry, Clock, Network, NodeError, NodeResult, Sender, StationRecord};

use crate::transport::Transport;
use crate::ConnectionStats;

/// Default ThingSpeak update endpoint
pub const DEFAULT_URL: &str = "https://api.thingspeak.com/update";

/// GET sender for ThingSpeak channels and compatible endpoints
pub struct ThingSpeakSender<N: Network, C: Clock> {
    url: String,
    api_key: String,
    transport: Transport<N, C>,
}

impl<N: Network, C: Clock> ThingSpeakSender<N, C> {
    /// Sender for `url` using the channel write key `api_key`
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        network: N,
        clock: C,
        link: LinkConfig,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            transport: Transport::new(network, clock, link),
        }
    }

    /// Full request URL for one record
    pub fn request_url(&self, record: &StationRecord) -> String {
        format!(
            "{}?api_key={}&field1={:.2}&field2={:.2}&field3={:.2}&field4={:.2}&field5={:.2}",
            self.url,
            self.api_key,
            record.temperature,
            record.humidity,
            record.pressure,
            record.battery_voltage,
            record.battery_percent,
        )
    }

    /// Delivery counters
    pub fn stats(&self) -> &ConnectionStats {
        self.transport.stats()
    }

    /// The shared link wrapper
    pub fn transport(&self) -> &Transport<N, C> {
        &self.transport
    }

    /// The shared link wrapper, mutably
    pub fn transport_mut(&mut self) -> &mut Transport<N, C> {
        &mut self.transport
    }

    fn deliver(&mut self, url: &str) -> NodeResult<()> {
        let response = self.transport.get(url)?;
        if response.status == 200 {
            Ok(())
        } else {
            Err(NodeError::Rejected { status: response.status })
        }
    }
}

impl<N: Network, C: Clock> Sender for ThingSpeakSender<N, C> {
    fn send(&mut self, entry: &BufferedEntry) -> NodeResult<()> {
        let url = self.request_url(&entry.record);
        let result = self.deliver(&url);
        match &result {
            Ok(()) => log::debug!("ThingSpeak accepted reading #{}", entry.record.reading_count),
            Err(e) => log::warn!("ThingSpeak send failed: {}", e),
        }
        self.transport.record(&result, url.len());
        result
    }

    fn idle(&mut self) {
        self.transport.disconnect();
    }
}
