use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::time::Duration;

/// How the dispatcher chooses the execution demand of each job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionModel {
    /// Every job executes for its task's WCET.
    #[default]
    WorstCase,
    /// Uniformly distributed in `[bcet, wcet]`, drawn from the seeded generator.
    Uniform,
}

/// What to do when the synchronous-release bound is below the exact
/// reaction time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantPolicy {
    /// Fail the analysis.
    #[default]
    Enforce,
    /// Log the violation and continue.
    Log,
}

/// Settings threaded through every analysis entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Seed of the execution-time generator.
    pub seed: u64,
    pub execution: ExecutionModel,
    pub invariant_policy: InvariantPolicy,
    /// Longest simulation horizon that is accepted.
    pub max_horizon: Duration,
    /// Largest estimated number of jobs per simulation.
    pub max_jobs: u64,
    /// Largest number of dispatcher events per simulation.
    pub max_events: u64,
    /// Ticks per unit of the floating-point values in LET payloads.
    pub time_scale: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            seed: 0,
            execution: ExecutionModel::WorstCase,
            invariant_policy: InvariantPolicy::Enforce,
            max_horizon: 1 << 40,
            max_jobs: 50_000_000,
            max_events: 200_000_000,
            time_scale: 1.0,
        }
    }
}

impl AnalysisConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields
    /// keep their defaults.
    pub fn from_json(json: &str) -> AnalysisResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::unsupported(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionModel) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_invariant_policy(mut self, policy: InvariantPolicy) -> Self {
        self.invariant_policy = policy;
        self
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(AnalysisError::unsupported(format!(
                "time scale must be positive, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }

    /// Convert a LET payload value into ticks.
    pub fn to_ticks(&self, value: f64) -> AnalysisResult<Duration> {
        let scaled = value * self.time_scale;
        if !scaled.is_finite() || scaled < 0.0 || scaled > u64::MAX as f64 {
            return Err(AnalysisError::unsupported(format!(
                "time value {} is not representable",
                value
            )));
        }
        Ok(scaled.round() as Duration)
    }

    /// Convert ticks back into LET payload units.
    pub fn from_ticks(&self, ticks: Duration) -> f64 {
        ticks as f64 / self.time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let c = AnalysisConfig::from_json(r#"{"seed": 7, "execution": "uniform"}"#).unwrap();
        assert_eq!(c.seed, 7);
        assert_eq!(c.execution, ExecutionModel::Uniform);
        assert_eq!(c.invariant_policy, InvariantPolicy::Enforce);
        assert_eq!(c.max_events, AnalysisConfig::default().max_events);
    }

    #[test]
    fn rejects_bad_time_scale() {
        assert!(matches!(
            AnalysisConfig::from_json(r#"{"time_scale": 0.0}"#),
            Err(AnalysisError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn tick_conversion() {
        let c = AnalysisConfig {
            time_scale: 1000.0,
            ..AnalysisConfig::default()
        };
        assert_eq!(c.to_ticks(1.5), Ok(1500));
        assert!(c.to_ticks(-1.0).is_err());
        assert!(c.to_ticks(f64::NAN).is_err());
        assert_eq!(c.from_ticks(250), 0.25);
    }
}
