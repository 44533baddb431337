use std::io::Write;

use holdem_cpu::error::PokerError;
use holdem_cpu::{Advisor, AdvisorConfig};

#[test]
fn loads_config_from_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{"seed": 99, "parallel": true, "deadline_ms": 250, "policy": {{"trials": 300, "bluff_frequency": 0.0}}}}"#
    )?;

    let config = AdvisorConfig::from_path(file.path())?;
    assert_eq!(config.seed, Some(99));
    assert!(config.parallel);
    assert_eq!(config.policy.trials, 300);
    assert_eq!(config.policy.bluff_frequency, 0.0);
    assert_eq!(config.policy.strong_threshold, 0.8);

    let advisor = Advisor::new(config);
    assert_eq!(advisor.seed(), 99);
    Ok(())
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = AdvisorConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, PokerError::ConfigIo { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn default_config_matches_reference_constants() {
    let config = AdvisorConfig::default();
    assert_eq!(config.seed, None);
    assert_eq!(config.policy.trials, 1000);
    assert_eq!(config.policy.raise_amount, 50);
    assert_eq!(config.policy.value_raise_frequency, 0.5);
    assert_eq!(config.policy.bluff_frequency, 0.1);
}
