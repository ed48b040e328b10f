//! Simulated Station Example
//!
//! Runs the full read → compensate → annotate → transmit → sleep loop on
//! simulated hardware. The uplink drops out for a few cycles so the
//! transmission buffer fills and then drains, and the battery sags into the
//! low band so the sleep interval doubles.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run -p meteonode-core --example simulated_station
//! ```

use meteonode_core::config::{NodeConfig, StationInfo};
use meteonode_core::sim::{SimAdc, SimBus, SimClock, SimSender};
use meteonode_core::station::CycleOutcome;
use meteonode_core::{Clock, Station};

fn main() {
    println!("meteonode simulated station");
    println!("===========================\n");

    let config = NodeConfig::default()
        .station(StationInfo::new("Bench", "Lab").elevation_m(190.0));

    let built: Result<Station<_, _, _, _, 16>, _> = Station::new(
        SimBus::default(),
        SimAdc::at_voltage(3.9),
        SimSender::online(),
        SimClock::new(),
        config,
    );
    let mut station = match built {
        Ok(station) => station,
        Err(e) => {
            println!("invalid configuration: {e}");
            return;
        }
    };

    if let Err(e) = station.init() {
        println!("sensor init failed: {e}");
        return;
    }

    for cycle in 0..10 {
        // link down for cycles 3..6, battery sagging from cycle 6
        station.sender_mut().set_online(!(3..6).contains(&cycle));
        if cycle == 6 {
            station.battery_mut().adc_mut().set_voltage(3.2);
            station.battery_mut().reset_window();
        }

        let report = station.run_cycle();
        let t = station.clock().now_ms() / 1000;

        match report.outcome {
            CycleOutcome::Transmitted(r) => println!(
                "t={t:>5}s  sent      {:.2} °C  {:.1} %  {:.2} hPa  dew {:.2} °C  batt {:.2} V {}",
                r.temperature, r.humidity, r.pressure, r.dew_point, r.battery_voltage, r.battery_state
            ),
            CycleOutcome::Buffered(r, e) => println!(
                "t={t:>5}s  buffered  reading #{} ({e}), {} waiting",
                r.reading_count,
                station.buffer().len()
            ),
            CycleOutcome::ReadFailed(e) => println!("t={t:>5}s  read failed: {e}"),
        }

        println!("           next sleep {} s", report.sleep_s);
        station.sleep(report.sleep_s);
    }

    let drained = station.shutdown();
    let session = station.session();
    println!();
    println!("Shutdown: drained {drained}, {} left in buffer", station.buffer().len());
    println!(
        "Session: {} readings, {} errors, {} delivered",
        session.reading_count,
        session.error_count,
        station.sender().delivered().len()
    );
}
