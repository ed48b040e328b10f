//! Battery classification, percentage and sleep policy

mod common;

use meteonode_core::config::BatteryConfig;
use meteonode_core::sim::SimAdc;
use meteonode_core::{BatteryMonitor, BatteryState};
use proptest::prelude::*;

fn monitor_at(volts: f32) -> BatteryMonitor<SimAdc> {
    BatteryMonitor::new(SimAdc::at_voltage(volts), BatteryConfig::default())
}

#[test]
fn percentage_endpoints() {
    let m = monitor_at(0.0);
    let c = *m.config();

    assert_eq!(m.percentage(c.critical_voltage), 0.0);
    assert_eq!(m.percentage(c.full_voltage), 100.0);
    assert_eq!(m.percentage(c.full_voltage + 0.5), 100.0);
}

#[test]
fn classification_boundaries() {
    let m = monitor_at(0.0);
    let c = *m.config();

    assert_eq!(m.classify(c.critical_voltage), BatteryState::Critical);
    assert_eq!(m.classify(c.low_voltage), BatteryState::Low);
    assert_eq!(m.classify(0.95 * c.full_voltage), BatteryState::Full);
    assert_eq!(m.classify(3.8), BatteryState::Normal);
}

#[test]
fn suggested_sleep_for_each_state() {
    assert_eq!(monitor_at(2.8).suggested_sleep_seconds(300), 1200);
    assert_eq!(monitor_at(3.2).suggested_sleep_seconds(300), 600);
    assert_eq!(monitor_at(3.7).suggested_sleep_seconds(300), 300);
    assert_eq!(monitor_at(4.2).suggested_sleep_seconds(300), 300);
}

#[test]
fn window_smooths_a_single_dip() {
    let mut m = monitor_at(3.9);
    for _ in 0..9 {
        m.averaged_voltage().unwrap();
    }
    m.adc_mut().set_voltage(2.9);
    let status = m.status().unwrap();

    // one critical sample among ten normal ones
    assert!((status.voltage - 3.8).abs() < 0.01);
    assert_eq!(status.state, BatteryState::Normal);
}

#[test]
fn window_evicts_oldest_sample() {
    let mut m = monitor_at(2.9);
    m.averaged_voltage().unwrap();
    m.adc_mut().set_voltage(3.9);
    for _ in 0..10 {
        m.averaged_voltage().unwrap();
    }
    assert_eq!(m.window_len(), 10);
    assert!((m.averaged_voltage().unwrap() - 3.9).abs() < 0.01);
}

proptest! {
    #[test]
    fn percentage_is_monotonic_and_clamped(a in 0.0f32..6.6, b in 0.0f32..6.6) {
        let m = monitor_at(0.0);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (p_lo, p_hi) = (m.percentage(lo), m.percentage(hi));

        prop_assert!(p_lo <= p_hi);
        prop_assert!((0.0..=100.0).contains(&p_lo));
        prop_assert!((0.0..=100.0).contains(&p_hi));
    }

    #[test]
    fn at_or_above_full_is_always_100(v in 4.2f32..10.0) {
        prop_assert_eq!(monitor_at(0.0).percentage(v), 100.0);
    }
}
