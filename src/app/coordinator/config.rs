//! Configuration for a single job run

use std::time::Duration;

use crate::constants::polling;
use crate::errors::{ConfigError, ConfigResult};
use crate::output::OutputPolicy;

/// Settings the coordinator hands to the poller and dispatcher
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Lookups allowed before the final iteration is forced
    pub poll_budget: u32,
    /// Pause between job lookups
    pub poll_interval: Duration,
    /// Output kind selection for final events
    pub output: OutputPolicy,
    /// Show the status spinner while polling
    pub show_status: bool,
    /// Colour the rendered output
    pub color: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_budget: polling::DEFAULT_POLL_BUDGET,
            poll_interval: polling::POLL_INTERVAL,
            output: OutputPolicy::default(),
            show_status: true,
            color: false,
        }
    }
}

impl CoordinatorConfig {
    pub fn with_poll_budget(mut self, budget: u32) -> Self {
        self.poll_budget = budget;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_output(mut self, output: OutputPolicy) -> Self {
        self.output = output;
        self
    }

    /// Enable or disable the status spinner
    pub fn with_status(mut self, enabled: bool) -> Self {
        self.show_status = enabled;
        self
    }

    /// Enable or disable ANSI colour in rendered output
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval".to_string(),
                value: "0".to_string(),
                reason: "Poll interval cannot be zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputKind;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.poll_budget, 30);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.output, OutputPolicy::default());
        assert!(!config.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = CoordinatorConfig::default()
            .with_poll_budget(0)
            .with_poll_interval(Duration::from_millis(1))
            .with_output(OutputPolicy::new(Some(OutputKind::Json)))
            .with_status(false)
            .with_color(true);
        assert_eq!(config.poll_budget, 0);
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert_eq!(config.output.forced, Some(OutputKind::Json));
        assert!(!config.show_status);
        assert!(config.color);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = CoordinatorConfig::default().with_poll_interval(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
