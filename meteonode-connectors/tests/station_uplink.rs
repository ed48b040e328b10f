//! A simulated station publishing through the configured uplinks

use meteonode_connectors::{Uplink, UplinkConfig};
use meteonode_core::config::{LinkConfig, NodeConfig, StationInfo};
use meteonode_core::sim::{SimAdc, SimBus, SimClock, SimNetwork};
use meteonode_core::station::CycleOutcome;
use meteonode_core::{Station, StationRecord};

type UplinkStation = Station<SimBus, SimAdc, Uplink<SimNetwork, SimClock>, SimClock, 8>;

fn station(uplink: UplinkConfig, network: SimNetwork) -> UplinkStation {
    let info = StationInfo::new("Bench", "Lab").elevation_m(190.0);
    let sender = uplink
        .build(network, SimClock::new(), LinkConfig::new("lab", "pw"), info.clone())
        .unwrap();
    let mut station = Station::new(
        SimBus::default(),
        SimAdc::at_voltage(3.9),
        sender,
        SimClock::new(),
        NodeConfig::default().station(info),
    )
    .unwrap();
    station.init().unwrap();
    station
}

fn network(station: &mut UplinkStation) -> &mut SimNetwork {
    match station.sender_mut() {
        Uplink::ThingSpeak(s) => s.transport_mut().network_mut(),
        Uplink::HttpPost(s) => s.transport_mut().network_mut(),
    }
}

fn cycle(station: &mut UplinkStation) -> CycleOutcome {
    let report = station.run_cycle();
    station.sleep(report.sleep_s);
    report.outcome
}

#[test]
fn thingspeak_backlog_drains_when_link_returns() {
    let mut s = station(UplinkConfig::thingspeak("KEY"), SimNetwork::offline());

    for _ in 0..3 {
        assert!(matches!(cycle(&mut s), CycleOutcome::Buffered(..)));
    }
    assert_eq!(s.buffer().len(), 3);
    assert!(network(&mut s).requests().is_empty());

    network(&mut s).set_online(true);
    assert!(matches!(cycle(&mut s), CycleOutcome::Transmitted(_)));
    assert!(s.buffer().is_empty());

    let requests = network(&mut s).requests().to_vec();
    assert_eq!(requests.len(), 4);
    assert!(requests.iter().all(|r| r.method == "GET"));
    assert!(requests[0].url.starts_with("https://api.thingspeak.com/update?api_key=KEY&field1=25.08"));
    assert_eq!(s.sender().stats().messages_sent, 4);
}

#[test]
fn json_post_keeps_capture_time() {
    let mut s = station(
        UplinkConfig::http_post("https://ingest.example.net/v1/readings", "token"),
        SimNetwork::online(),
    );

    network(&mut s).queue_response(Ok(503));
    network(&mut s).queue_response(Ok(503));
    assert!(matches!(cycle(&mut s), CycleOutcome::Buffered(..)));
    assert!(matches!(cycle(&mut s), CycleOutcome::Transmitted(_)));

    // first attempt rejected, second cycle retries it before the new reading
    let bodies: Vec<serde_json::Value> = network(&mut s)
        .requests()
        .iter()
        .map(|r| serde_json::from_str(&r.body).unwrap())
        .collect();
    assert_eq!(bodies.len(), 3);
    assert_eq!(bodies[0]["timestamp"], bodies[1]["timestamp"]);
    assert!(bodies[2]["timestamp"].as_u64() > bodies[1]["timestamp"].as_u64());
    assert_eq!(bodies[2]["station_name"], "Bench");
}

#[test]
fn radio_released_before_sleep() {
    let mut s = station(UplinkConfig::thingspeak("KEY"), SimNetwork::online());

    cycle(&mut s);
    cycle(&mut s);

    let net = network(&mut s);
    assert_eq!(net.disconnects(), 2);
    assert_eq!(net.connect_attempts(), 1);
}

#[test]
fn full_backlog_on_dead_link_waits_out_one_timeout() {
    use meteonode_connectors::ThingSpeakSender;
    use meteonode_core::{BufferedEntry, TransmissionBuffer};

    let template = station(UplinkConfig::thingspeak("KEY"), SimNetwork::online())
        .acquire_reading()
        .unwrap();
    let mut sender = ThingSpeakSender::new(
        "https://api.thingspeak.com/update",
        "KEY",
        SimNetwork::offline(),
        SimClock::new(),
        LinkConfig::new("lab", "pw"),
    );
    let mut buffer = TransmissionBuffer::<50>::new();
    for n in 0..50u32 {
        buffer.push(BufferedEntry::new(n as u64 * 300_000, StationRecord { reading_count: n, ..template }));
    }

    let outcome = buffer.send_or_buffer(StationRecord { reading_count: 50, ..template }, 15_000_000, &mut sender);

    assert!(!outcome.is_sent());
    assert_eq!(sender.transport().network().connect_attempts(), 1);
    assert_eq!(sender.transport().link_stats().timeouts, 1);
    assert_eq!(buffer.oldest().map(|e| e.record.reading_count), Some(1));
}
