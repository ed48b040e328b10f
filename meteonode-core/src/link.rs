//! Wireless link management
//!
//! Association is the only blocking wait inside a cycle besides the sleep.
//! It is bounded: [`connect`] polls the interface at a fixed interval and
//! gives up after the configured timeout instead of retrying forever.

use crate::config::LinkConfig;
use crate::constants::time::MS_PER_SECOND;
use crate::errors::{NodeError, NodeResult};
use crate::ports::Network;
use crate::time::{elapsed_ms, Clock};

/// Association counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStats {
    /// Associations that completed
    pub connects: u32,
    /// Associations that timed out
    pub timeouts: u32,
    /// Calls that found the link already up
    pub reused: u32,
}

/// Bring the link up, waiting at most `config.connect_timeout_s`
///
/// Returns immediately when already connected.
pub fn connect<N, C>(
    network: &mut N,
    clock: &mut C,
    config: &LinkConfig,
    stats: &mut LinkStats,
) -> NodeResult<()>
where
    N: Network + ?Sized,
    C: Clock + ?Sized,
{
    if network.is_connected() {
        stats.reused = stats.reused.saturating_add(1);
        return Ok(());
    }

    node_info!("Connecting to {}", config.credentials.ssid);
    network.begin_connect(&config.credentials);

    let timeout_ms = config.connect_timeout_s as u64 * MS_PER_SECOND;
    let start = clock.now_ms();

    while !network.is_connected() {
        let waited = elapsed_ms(start, clock.now_ms());
        if waited >= timeout_ms {
            node_warn!("Link timeout after {} ms", waited);
            stats.timeouts = stats.timeouts.saturating_add(1);
            network.disconnect();
            return Err(NodeError::ConnectTimeout { waited_ms: waited });
        }
        clock.sleep_ms(config.poll_interval_ms);
    }

    stats.connects = stats.connects.saturating_add(1);
    node_info!("Link up after {} ms", elapsed_ms(start, clock.now_ms()));
    Ok(())
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimNetwork};

    #[test]
    fn already_connected_returns_immediately() {
        let mut net = SimNetwork::online();
        let mut clock = SimClock::new();
        let mut stats = LinkStats::default();

        connect(&mut net, &mut clock, &LinkConfig::default(), &mut stats).unwrap();
        assert_eq!(clock.now_ms(), 0);
        assert_eq!(stats.reused, 1);
        assert_eq!(net.connect_attempts(), 0);
    }

    #[test]
    fn polls_until_associated() {
        let mut net = SimNetwork::offline().associate_after_polls(3);
        let mut clock = SimClock::new();
        let mut stats = LinkStats::default();

        connect(&mut net, &mut clock, &LinkConfig::default(), &mut stats).unwrap();
        assert_eq!(clock.now_ms(), 3 * 500);
        assert_eq!(stats.connects, 1);
    }

    #[test]
    fn gives_up_after_timeout() {
        let mut net = SimNetwork::offline();
        let mut clock = SimClock::new();
        let mut stats = LinkStats::default();
        let config = LinkConfig::new("lab", "pw").connect_timeout_s(2);

        let err = connect(&mut net, &mut clock, &config, &mut stats).unwrap_err();
        assert_eq!(err, NodeError::ConnectTimeout { waited_ms: 2000 });
        assert_eq!(clock.now_ms(), 2000);
        assert_eq!(stats.timeouts, 1);
        assert!(!net.is_connected());
    }
}
