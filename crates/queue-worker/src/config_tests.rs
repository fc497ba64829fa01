//! Tests for consumer configuration.

use super::*;

fn queue() -> QueueName {
    QueueName::new("test-queue".to_string()).unwrap()
}

#[test]
fn test_config_defaults() {
    let config = ConsumerConfig::new(queue());

    assert_eq!(config.queue_name().as_str(), "test-queue");
    assert_eq!(config.max_batch_size(), 5);
    assert_eq!(config.visibility_timeout(), Duration::minutes(2));
    assert_eq!(config.poll_wait(), Duration::seconds(20));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_builder() {
    let config = ConsumerConfig::new(queue())
        .with_max_batch_size(10)
        .with_visibility_timeout(Duration::seconds(45))
        .with_poll_wait(Duration::seconds(1));

    assert_eq!(config.max_batch_size(), 10);
    assert_eq!(config.visibility_timeout(), Duration::seconds(45));
    assert_eq!(config.poll_wait(), Duration::seconds(1));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_rejects_zero_batch_size() {
    let config = ConsumerConfig::new(queue()).with_max_batch_size(0);
    assert!(matches!(
        config.validate(),
        Err(ValidationError::OutOfRange { .. })
    ));
}

#[test]
fn test_config_rejects_batch_size_above_limit() {
    let config = ConsumerConfig::new(queue()).with_max_batch_size(MAX_BATCH_SIZE_LIMIT + 1);
    assert!(matches!(
        config.validate(),
        Err(ValidationError::OutOfRange { .. })
    ));
}

#[test]
fn test_config_accepts_batch_size_at_limit() {
    let config = ConsumerConfig::new(queue()).with_max_batch_size(MAX_BATCH_SIZE_LIMIT);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_rejects_excessive_visibility_timeout() {
    // Unbounded timeouts would overflow transport deadline arithmetic; the
    // queue service cap applies
    let config = ConsumerConfig::new(queue()).with_visibility_timeout(Duration::MAX);
    assert!(matches!(
        config.validate(),
        Err(ValidationError::OutOfRange { .. })
    ));

    let at_limit = ConsumerConfig::new(queue())
        .with_visibility_timeout(Duration::hours(MAX_VISIBILITY_TIMEOUT_HOURS));
    assert!(at_limit.validate().is_ok());
}

#[test]
fn test_config_rejects_negative_durations() {
    let config = ConsumerConfig::new(queue()).with_visibility_timeout(Duration::seconds(-1));
    assert!(config.validate().is_err());

    let config = ConsumerConfig::new(queue()).with_poll_wait(Duration::seconds(-1));
    assert!(config.validate().is_err());
}

#[test]
fn test_config_accepts_zero_poll_wait() {
    // Zero wait means a single non-blocking receive attempt
    let config = ConsumerConfig::new(queue()).with_poll_wait(Duration::zero());
    assert!(config.validate().is_ok());
}
