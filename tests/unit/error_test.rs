//! Tests for error display and conversion

use surgepool::core::{AppResult, PoolError};

#[test]
fn test_unknown_resource_display() {
    let err = PoolError::UnknownResource(7);
    assert_eq!(format!("{err}"), "unknown resource id 7");
}

#[test]
fn test_invalid_config_display() {
    let err = PoolError::InvalidConfig("base_capacity must be greater than 0".into());
    assert_eq!(
        format!("{err}"),
        "invalid configuration: base_capacity must be greater than 0"
    );
}

#[test]
fn test_pool_error_converts_into_anyhow() {
    fn fails() -> AppResult<()> {
        Err(PoolError::UnknownResource(3).into())
    }
    let err = fails().unwrap_err();
    assert!(err.to_string().contains("unknown resource id 3"));
}
