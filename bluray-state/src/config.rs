//! Coordinator timing configuration

use std::time::Duration;

use crate::{Result, StateError};

/// Timing knobs for polling and command convergence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Interval between scheduled refreshes
    /// Default: 60 seconds
    pub poll_interval: Duration,

    /// Refreshes a command waits for before giving up
    /// Default: 10
    pub convergence_attempts: u32,

    /// Pause between two convergence refreshes
    /// Default: 3 seconds
    pub convergence_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            convergence_attempts: 10,
            convergence_delay: Duration::from_secs(3),
        }
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll more often, for players that are mostly driven from elsewhere
    pub fn fast_polling() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_convergence(mut self, attempts: u32, delay: Duration) -> Self {
        self.convergence_attempts = attempts;
        self.convergence_delay = delay;
        self
    }

    /// Upper bound on how long one command can keep its caller waiting,
    /// not counting device I/O
    pub fn max_convergence_wait(&self) -> Duration {
        self.convergence_delay * self.convergence_attempts.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(StateError::Configuration(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.convergence_attempts == 0 {
            return Err(StateError::Configuration(
                "Convergence attempts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.convergence_attempts, 10);
        assert_eq!(config.convergence_delay, Duration::from_secs(3));
        assert_eq!(config.max_convergence_wait(), Duration::from_secs(27));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let zero_interval = CoordinatorConfig::new().with_poll_interval(Duration::ZERO);
        assert!(zero_interval.validate().is_err());

        let zero_attempts = CoordinatorConfig::new().with_convergence(0, Duration::from_secs(1));
        assert!(zero_attempts.validate().is_err());

        let no_delay = CoordinatorConfig::new().with_convergence(3, Duration::ZERO);
        assert!(no_delay.validate().is_ok());
    }

    #[test]
    fn test_fast_polling_preset() {
        let config = CoordinatorConfig::fast_polling();
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.convergence_attempts, 10);
        assert!(config.validate().is_ok());
    }
}
