//! Tests for configuration validation

use surgepool::config::{QueueDiscipline, SimConfig};

fn valid() -> SimConfig {
    SimConfig {
        base_capacity: 5,
        producers: 2,
        tasks_per_producer: 10,
        consumers: 4,
        discipline: QueueDiscipline::Arrival,
        priority_cycle: Vec::new(),
        queue_high_watermark: 5,
        queue_low_watermark: 3,
        grow_step: 1,
        completion_low_watermark: 3,
        service_floor_ms: 1,
        acquire_timeout_ms: 100,
        shrink_wait_ms: 50,
        idle_backoff_ms: 10,
    }
}

#[test]
fn test_valid_config() {
    assert!(valid().validate().is_ok());
}

#[test]
fn test_zero_capacity_rejected() {
    let mut cfg = valid();
    cfg.base_capacity = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_zero_producers_rejected() {
    let mut cfg = valid();
    cfg.producers = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_zero_quota_rejected() {
    let mut cfg = valid();
    cfg.tasks_per_producer = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_watermarks_need_hysteresis() {
    let mut cfg = valid();
    cfg.queue_low_watermark = cfg.queue_high_watermark;
    assert!(cfg.validate().is_err());

    cfg.queue_low_watermark = cfg.queue_high_watermark + 1;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_zero_acquire_timeout_rejected() {
    let mut cfg = valid();
    cfg.acquire_timeout_ms = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_presets_validate() {
    assert!(SimConfig::loading_bays().validate().is_ok());
    assert!(SimConfig::degrading_grid().validate().is_ok());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "base_capacity": 5,
        "producers": 1,
        "tasks_per_producer": 10,
        "consumers": 0,
        "discipline": "arrival",
        "priority_cycle": [],
        "queue_high_watermark": 5,
        "queue_low_watermark": 3,
        "grow_step": 1,
        "completion_low_watermark": 3,
        "service_floor_ms": 1000,
        "acquire_timeout_ms": 10000,
        "shrink_wait_ms": 100,
        "idle_backoff_ms": 100
    }"#;

    let cfg = SimConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.base_capacity, 5);
    assert_eq!(cfg.discipline, QueueDiscipline::Arrival);
}

#[test]
fn test_config_from_json_rejects_bad_watermarks() {
    let json = r#"{
        "base_capacity": 5,
        "producers": 1,
        "tasks_per_producer": 10,
        "consumers": 0,
        "discipline": "priority",
        "priority_cycle": [1, 2],
        "queue_high_watermark": 3,
        "queue_low_watermark": 3,
        "grow_step": 1,
        "completion_low_watermark": 3,
        "service_floor_ms": 1000,
        "acquire_timeout_ms": 10000,
        "shrink_wait_ms": 100,
        "idle_backoff_ms": 100
    }"#;

    assert!(SimConfig::from_json_str(json).is_err());
}
