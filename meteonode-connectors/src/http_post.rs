//! Generic JSON POST uplink
//!
//! Each record goes out as its own document:
//!
//! ```json
//! {
//!   "station_name": "Bench",
//!   "location": "Lab",
//!   "timestamp": 1200,
//!   "data": { "temperature": 25.08, "humidity": 55.0, "...": "..." }
//! }
//! ```
//!
//! `timestamp` is the capture time in seconds, so a reading drained from the
//! buffer keeps the time it was taken. It is counted from the station
//! clock's origin: Unix seconds when the station runs on
//! `SystemClock::unix()` or an epoch-synced RTC, seconds since boot on a bare
//! MCU timer. The key travels as a bearer token.

use meteonode_core::config::LinkConfig;
use meteonode_core::time::whole_seconds;
use meteonode_core::{BufferedEntry, Clock, Network, NodeError, NodeResult, Sender, StationInfo, StationRecord};
use serde::Serialize;

use crate::transport::Transport;
use crate::ConnectionStats;

/// Wire document for one record
#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    /// Configured station name
    pub station_name: &'a str,
    /// Configured location label
    pub location: &'a str,
    /// Capture time, seconds
    pub timestamp: u64,
    /// The record itself
    pub data: &'a StationRecord,
}

/// POST sender for JSON ingestion endpoints
pub struct JsonPostSender<N: Network, C: Clock> {
    url: String,
    authorization: String,
    station: StationInfo,
    transport: Transport<N, C>,
}

impl<N: Network, C: Clock> JsonPostSender<N, C> {
    /// Sender posting to `url` on behalf of `station`
    pub fn new(
        url: impl Into<String>,
        api_key: &str,
        station: StationInfo,
        network: N,
        clock: C,
        link: LinkConfig,
    ) -> Self {
        Self {
            url: url.into(),
            authorization: format!("Bearer {}", api_key),
            station,
            transport: Transport::new(network, clock, link),
        }
    }

    /// Serialize one entry
    pub fn body(&self, entry: &BufferedEntry) -> NodeResult<String> {
        let payload = Payload {
            station_name: &self.station.name,
            location: &self.station.location,
            timestamp: whole_seconds(entry.timestamp),
            data: &entry.record,
        };
        serde_json::to_string(&payload).map_err(|_| NodeError::Serialization)
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

    fn deliver(&mut self, body: &str) -> NodeResult<()> {
        let headers = [
            ("Content-Type", "application/json"),
            ("Authorization", self.authorization.as_str()),
        ];
        let response = self.transport.post(&self.url, body, &headers)?;
        match response.status {
            200 | 201 => Ok(()),
            status => Err(NodeError::Rejected { status }),
        }
    }
}

impl<N: Network, C: Clock> Sender for JsonPostSender<N, C> {
    fn send(&mut self, entry: &BufferedEntry) -> NodeResult<()> {
        let result = self.body(entry).and_then(|body| {
            let sent = self.deliver(&body);
            self.transport.record(&sent, body.len());
            sent
        });
        if let Err(e) = &result {
            log::warn!("POST to {} failed: {}", self.url, e);
        }
        result
    }

    fn idle(&mut self) {
        self.transport.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meteonode_core::sim::{SimClock, SimNetwork};
    use meteonode_core::BatteryState;

    fn entry() -> BufferedEntry {
        BufferedEntry::new(
            1_200_750,
            StationRecord {
                temperature: 25.08,
                humidity: 55.0,
                pressure: 1006.53,
                dew_point: 15.4,
                sea_level_pressure: 1029.51,
                battery_voltage: 3.9,
                battery_percent: 75.0,
                battery_state: BatteryState::Normal,
                reading_count: 4,
                error_count: 1,
                uptime_s: 1200,
            },
        )
    }

    fn sender(network: SimNetwork) -> JsonPostSender<SimNetwork, SimClock> {
        JsonPostSender::new(
            "https://ingest.example.net/v1/readings",
            "secret",
            StationInfo::new("Bench", "Lab"),
            network,
            SimClock::new(),
            LinkConfig::new("lab", "pw"),
        )
    }

    #[test]
    fn payload_shape() {
        let s = sender(SimNetwork::online());
        let body = s.body(&entry()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value["station_name"], "Bench");
        assert_eq!(value["location"], "Lab");
        assert_eq!(value["timestamp"], 1200);
        assert_eq!(value["data"]["temperature"], 25.08);
        assert_eq!(value["data"]["battery_state"], "NORMAL");
        assert_eq!(value["data"]["error_count"], 1);
        assert_eq!(value["data"]["uptime"], 1200);
    }

    #[test]
    fn epoch_capture_time_passes_through() {
        let s = sender(SimNetwork::online());
        let captured = BufferedEntry { timestamp: 1_700_000_000_750, ..entry() };
        let value: serde_json::Value = serde_json::from_str(&s.body(&captured).unwrap()).unwrap();
        assert_eq!(value["timestamp"], 1_700_000_000u64);
    }

    #[test]
    fn headers_and_method() {
        let mut s = sender(SimNetwork::online());
        s.send(&entry()).unwrap();

        let request = &s.transport().network().requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "https://ingest.example.net/v1/readings");
        assert!(request
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
        assert!(request
            .headers
            .contains(&("Authorization".to_string(), "Bearer secret".to_string())));
        assert!(s.stats().bytes_sent > 0);
    }

    #[test]
    fn created_counts_as_delivered() {
        let mut s = sender(SimNetwork::online());
        s.transport_mut().network_mut().queue_response(Ok(201));
        s.transport_mut().network_mut().queue_response(Ok(500));
        s.transport_mut().network_mut().queue_response(Err(NodeError::Transport { reason: "reset" }));

        assert!(s.send(&entry()).is_ok());
        assert_eq!(s.send(&entry()), Err(NodeError::Rejected { status: 500 }));
        assert_eq!(s.send(&entry()), Err(NodeError::Transport { reason: "reset" }));
        assert_eq!(s.stats().messages_sent, 1);
        assert_eq!(s.stats().messages_failed, 2);
    }
}
