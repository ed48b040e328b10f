//! Connect-on-demand wrapper shared by the uplink senders

use meteonode_core::config::LinkConfig;
use meteonode_core::link::{connect, LinkStats};
use meteonode_core::{Clock, HttpResponse, Network, NodeResult};

use crate::ConnectionStats;

/// A network interface plus the bookkeeping every sender needs
pub struct Transport<N: Network, C: Clock> {
    network: N,
    clock: C,
    link: LinkConfig,
    link_stats: LinkStats,
    stats: ConnectionStats,
}

impl<N: Network, C: Clock> Transport<N, C> {
    /// Wrap an interface; nothing is connected yet
    pub fn new(network: N, clock: C, link: LinkConfig) -> Self {
        Self {
            network,
            clock,
            link,
            link_stats: LinkStats::default(),
            stats: ConnectionStats::default(),
        }
    }

    /// Bring the link up if it is down
    pub fn ensure_connected(&mut self) -> NodeResult<()> {
        let before = self.link_stats.connects;
        connect(&mut self.network, &mut self.clock, &self.link, &mut self.link_stats)?;
        if self.link_stats.connects > before {
            self.stats.reconnections += 1;
        }
        Ok(())
    }

    /// Issue a GET after making sure the link is up
    pub fn get(&mut self, url: &str) -> NodeResult<HttpResponse> {
        self.ensure_connected()?;
        self.network.send_get(url)
    }

    /// Issue a POST after making sure the link is up
    pub fn post(&mut self, url: &str, body: &str, headers: &[(&str, &str)]) -> NodeResult<HttpResponse> {
        self.ensure_connected()?;
        self.network.send_post(url, body, headers)
    }

    /// Count a delivery attempt
    pub fn record(&mut self, result: &NodeResult<()>, bytes: usize) {
        match result {
            Ok(()) => {
                self.stats.messages_sent += 1;
                self.stats.bytes_sent += bytes as u64;
            }
            Err(e) => {
                self.stats.messages_failed += 1;
                self.stats.last_error = Some(e.to_string());
            }
        }
    }

    /// Drop the link
    pub fn disconnect(&mut self) {
        if self.network.is_connected() {
            self.network.disconnect();
        }
    }

    /// Delivery counters
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Association counters
    pub fn link_stats(&self) -> &LinkStats {
        &self.link_stats
    }

    /// The wrapped interface
    pub fn network(&self) -> &N {
        &self.network
    }

    /// The wrapped interface, mutably
    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }
}
