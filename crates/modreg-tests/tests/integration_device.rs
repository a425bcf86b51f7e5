// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Device Integration Tests
//!
//! End-to-end behavior of `ModbusDevice` over the mock transport:
//!
//! - Connection lifecycle and bounded retry timing
//! - Probe-validated registration and rollback
//! - Value pipeline: scaling, two's complement, casting, rounding, overflow
//! - Device-wide reads and display formatting
//!
//! ## Test Categories
//!
//! - `test_connect_*`: Connection lifecycle tests
//! - `test_register_*`: Registration tests
//! - `test_value_*`: Value pipeline tests
//! - `test_read_all_*`: Device-wide read tests

use std::time::Duration;

use modreg_modbus::client::ConnectFailure;
use modreg_modbus::{
    ConnectionError, ConnectionState, DeviceConfig, ModbusError, RegisterReading, RegisterSpec,
    RegisterValue, ValueType,
};
use tokio::time::Instant;

use modreg_tests::common::{
    fixtures::{DeviceFixtures, RegisterFixtures},
    harness::DeviceHarness,
    init_test_logging,
};

// =============================================================================
// Connection Lifecycle Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_connect_sleeps_after_every_failed_attempt() {
    init_test_logging();
    let mut harness = DeviceHarness::new(DeviceFixtures::with_retries(3, Duration::from_secs(2)));
    harness.mock.fail_connection(ConnectFailure::Refused).await;

    let start = Instant::now();
    let err = harness.device.connect().await.unwrap_err();

    assert_eq!(harness.mock.connect_count(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(6));
    assert_eq!(harness.device.state(), ConnectionState::Failed);
    assert!(matches!(
        err,
        ModbusError::Connection(ConnectionError::RetriesExhausted { attempts: 3, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_connect_default_policy_bound() {
    let mut harness = DeviceHarness::new(DeviceFixtures::inverter());
    harness.mock.fail_connection(ConnectFailure::Error).await;

    let start = Instant::now();
    assert!(harness.device.connect().await.is_err());

    assert_eq!(harness.mock.connect_count(), 10);
    assert_eq!(start.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_connect_recovers_within_bound() {
    let mut harness = DeviceHarness::new(DeviceFixtures::with_retries(5, Duration::from_secs(1)));
    harness.mock.fail_connects(3, ConnectFailure::Error).await;

    let start = Instant::now();
    harness.device.connect().await.unwrap();

    assert!(harness.device.is_connected());
    assert_eq!(harness.mock.connect_count(), 4);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_connect_exponential_backoff_is_capped() {
    let config = DeviceConfig::builder()
        .host(DeviceFixtures::HOST)
        .connect_retries(4)
        .retry_backoff(Duration::from_secs(1))
        .exponential_backoff(Duration::from_secs(5), 0.0)
        .build()
        .unwrap();
    let budget = config.retry_config().total_backoff();
    let mut harness = DeviceHarness::new(config);
    harness.mock.fail_connection(ConnectFailure::Refused).await;

    let start = Instant::now();
    assert!(harness.device.connect().await.is_err());

    // 1s + 2s + 4s + 5s (capped)
    assert_eq!(start.elapsed(), Duration::from_secs(12));
    assert_eq!(start.elapsed(), budget);
}

#[tokio::test(start_paused = true)]
async fn test_connect_failed_device_never_reconnects() {
    let mut harness = DeviceHarness::new(DeviceFixtures::with_retries(1, Duration::from_secs(1)));
    harness.mock.fail_connects(1, ConnectFailure::Refused).await;
    assert!(harness.device.connect().await.is_err());

    let err = harness
        .device
        .new_register(RegisterFixtures::status())
        .await
        .unwrap_err();
    assert!(err.is_connection_error());
    assert_eq!(harness.mock.connect_count(), 1);
    assert_eq!(harness.mock.read_count(), 0);
}

#[tokio::test]
async fn test_connect_close_then_operations_fail() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::status(), &[1]).await;

    harness.device.close().await;
    assert_eq!(harness.device.state(), ConnectionState::Disconnected);
    assert!(!harness.mock.is_connected());

    let err = harness.device.read("status").await.unwrap_err();
    assert!(err.is_connection_error());
    // Registry survives a close.
    assert!(harness.device.contains("status"));
}

#[tokio::test]
async fn test_connect_close_is_best_effort() {
    let mut harness = DeviceHarness::connected().await;
    harness.mock.fail_close(true);

    harness.device.close().await;

    assert_eq!(harness.mock.close_count(), 1);
    assert_eq!(harness.device.state(), ConnectionState::Disconnected);
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_register_returns_probe_value() {
    let mut harness = DeviceHarness::connected().await;

    let value = harness.declare(RegisterFixtures::grid_voltage(), &[2301]).await;

    assert_eq!(value, RegisterValue::Float(230.1));
    assert_eq!(harness.mock.read_history().await, vec![(66, 1, 1)]);
}

#[tokio::test]
async fn test_register_rollback_then_retry() {
    let mut harness = DeviceHarness::connected().await;
    harness.mock.fail_next_read();

    let err = harness
        .device
        .new_register(RegisterFixtures::grid_voltage())
        .await
        .unwrap_err();
    assert!(err.is_registration_error());
    assert!(!harness.device.contains("grid_voltage"));
    assert!(harness.device.is_empty());

    let value = harness.declare(RegisterFixtures::grid_voltage(), &[230]).await;
    assert_eq!(value, RegisterValue::Float(23.0));
    assert!(harness.device.contains("grid_voltage"));
}

#[tokio::test]
async fn test_register_probe_word_count_mismatch_rolls_back() {
    let mut harness = DeviceHarness::connected().await;
    harness.mock.short_reads(true);

    let err = harness
        .device
        .new_register(RegisterFixtures::battery_power())
        .await
        .unwrap_err();

    assert!(err.is_registration_error());
    assert!(harness.device.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_name() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::status(), &[1]).await;
    let reads = harness.mock.read_count();

    let err = harness
        .device
        .new_register(RegisterSpec::new("status", 500))
        .await
        .unwrap_err();

    assert!(err.is_duplicate_name());
    assert_eq!(harness.mock.read_count(), reads);
    assert_eq!(harness.device.register("status").unwrap().address(), 0);
}

#[tokio::test]
async fn test_register_remove_and_redeclare() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::status(), &[1]).await;

    harness.device.remove_register("status").unwrap();
    assert!(harness.device.remove_register("status").unwrap_err().is_not_found());

    harness.declare(RegisterSpec::new("status", 5), &[2]).await;
    assert_eq!(harness.device.read("status").await.unwrap(), RegisterValue::Int(2));
}

#[tokio::test]
async fn test_register_unknown_name() {
    let mut harness = DeviceHarness::connected().await;

    assert!(harness.device.read("missing").await.unwrap_err().is_not_found());
    assert!(harness.device.write("missing", 1.0).await.unwrap_err().is_not_found());
    assert_eq!(harness.mock.read_count(), 0);
    assert_eq!(harness.mock.write_count(), 0);
}

// =============================================================================
// Value Pipeline Tests
// =============================================================================

#[tokio::test]
async fn test_value_scaling_read_and_write() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::grid_voltage(), &[230]).await;
    harness.declare(RegisterFixtures::export_limit(), &[0]).await;

    assert_eq!(
        harness.device.read("grid_voltage").await.unwrap(),
        RegisterValue::Float(23.0)
    );

    harness.device.write("export_limit", 12.0).await.unwrap();
    assert_eq!(harness.mock.write_history().await, vec![(300, vec![120])]);
    assert_eq!(harness.mock.words(300, 1).await, vec![120]);
}

#[tokio::test]
async fn test_value_twos_complement_single_word() {
    let mut harness = DeviceHarness::connected().await;
    let spec = RegisterSpec::builder("offset", 10).signed(true).build().unwrap();
    harness.declare(spec, &[0xFFFF]).await;

    assert_eq!(harness.device.read("offset").await.unwrap(), RegisterValue::Int(-1));

    harness.set_words(10, &[0x7FFF]).await;
    assert_eq!(harness.device.read("offset").await.unwrap(), RegisterValue::Int(32767));

    harness.set_words(10, &[0x8000]).await;
    assert_eq!(harness.device.read("offset").await.unwrap(), RegisterValue::Int(-32768));
}

#[tokio::test]
async fn test_value_signed_two_words_big_endian() {
    let mut harness = DeviceHarness::connected().await;
    let value = harness
        .declare(RegisterFixtures::battery_power(), &[0xFFFF, 0xFC18])
        .await;
    assert_eq!(value, RegisterValue::Int(-1000));

    harness.device.write("battery_power", 70000.0).await.unwrap();
    assert_eq!(harness.mock.words(100, 2).await, vec![0x0001, 0x1170]);
    assert_eq!(
        harness.device.read("battery_power").await.unwrap(),
        RegisterValue::Int(70000)
    );
}

#[tokio::test]
async fn test_value_bool_threshold() {
    let mut harness = DeviceHarness::connected().await;
    let value = harness.declare(RegisterFixtures::relay(), &[0]).await;
    assert_eq!(value, RegisterValue::Bool(false));

    harness.set_words(200, &[7]).await;
    assert_eq!(harness.device.read("relay").await.unwrap(), RegisterValue::Bool(true));

    harness.device.write("relay", 0.0).await.unwrap();
    assert_eq!(harness.mock.words(200, 1).await, vec![0]);
}

#[tokio::test]
async fn test_value_int_truncates_scaled_value() {
    let mut harness = DeviceHarness::connected().await;
    let spec = RegisterSpec::builder("half", 20).factor(0.5).build().unwrap();

    let value = harness.declare(spec, &[3]).await;

    assert_eq!(value, RegisterValue::Int(1));
}

#[tokio::test]
async fn test_value_rounded_to_two_decimals() {
    let mut harness = DeviceHarness::connected().await;
    let spec = RegisterSpec::builder("third", 30)
        .factor(1.0 / 3.0)
        .value_type(ValueType::Float)
        .build()
        .unwrap();

    let value = harness.declare(spec, &[2]).await;

    assert_eq!(value, RegisterValue::Float(0.67));
}

#[tokio::test]
async fn test_value_overflow_performs_no_write() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::status(), &[5]).await;

    let err = harness.device.write("status", 65536.0).await.unwrap_err();
    assert!(err.is_value_out_of_range());

    let err = harness.device.write("status", -1.0).await.unwrap_err();
    assert!(err.is_value_out_of_range());

    assert_eq!(harness.mock.write_count(), 0);
    assert_eq!(harness.mock.words(0, 1).await, vec![5]);
}

#[tokio::test]
async fn test_value_read_failure_keeps_cached_value() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::grid_voltage(), &[230]).await;

    harness.set_words(66, &[240]).await;
    harness.mock.fail_next_read();
    let err = harness.device.read("grid_voltage").await.unwrap_err();
    assert!(err.is_read_error());

    let register = harness.device.register("grid_voltage").unwrap();
    assert_eq!(register.last_value(), Some(RegisterValue::Float(23.0)));
    assert!(register.last_error());

    assert_eq!(
        harness.device.read("grid_voltage").await.unwrap(),
        RegisterValue::Float(24.0)
    );
    assert!(!harness.device.register("grid_voltage").unwrap().last_error());
}

#[tokio::test]
async fn test_value_write_failure_is_reported() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::export_limit(), &[0]).await;
    harness.mock.fail_all_writes(true);

    let err = harness.device.write("export_limit", 5.0).await.unwrap_err();

    assert!(err.is_write_error());
    assert!(harness.device.register("export_limit").unwrap().last_error());
}

#[tokio::test]
async fn test_value_read_raw_and_string() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::grid_voltage(), &[230]).await;

    assert_eq!(harness.device.read_raw("grid_voltage").await.unwrap(), vec![230]);
    assert_eq!(
        harness.device.read_string("grid_voltage").await.unwrap(),
        "grid_voltage: 23.0 V"
    );
}

// =============================================================================
// Device-wide Read Tests
// =============================================================================

#[tokio::test]
async fn test_read_all_in_declaration_order() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterSpec::new("a", 1), &[1000]).await;
    let b = RegisterSpec::builder("b", 2)
        .factor(0.5)
        .value_type(ValueType::Float)
        .unit("V")
        .build()
        .unwrap();
    harness.declare(b, &[500]).await;

    let readings = harness.device.read_all().await.unwrap();

    assert_eq!(
        readings,
        vec![
            RegisterReading::new("a", RegisterValue::Int(1000), ""),
            RegisterReading::new("b", RegisterValue::Float(250.0), "V"),
        ]
    );
}

#[tokio::test]
async fn test_read_all_empty_device() {
    let mut harness = DeviceHarness::connected().await;
    assert!(harness.device.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_read_all_fails_on_first_error() {
    let mut harness = DeviceHarness::connected().await;
    harness.declare(RegisterFixtures::status(), &[1]).await;
    harness.declare(RegisterFixtures::grid_voltage(), &[230]).await;
    let reads = harness.mock.read_count();

    harness.mock.fail_all_reads(true);
    let err = harness.device.read_all().await.unwrap_err();

    assert!(err.is_read_error());
    assert_eq!(harness.mock.read_count(), reads + 1);
}
