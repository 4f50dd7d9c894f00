use crate::error::AnalysisResult;
use crate::model::Task;
use crate::time::Duration;

/// The pessimistic closed-form bound `Σ (T_i + R_i)` of Davare et al.
///
/// Every hop may have to wait for a full period before the data is
/// picked up, and then for a full response time until it is published.
/// The bound holds for both reaction time and data age.
pub fn davare(chain: &[&Task]) -> AnalysisResult<Duration> {
    chain
        .iter()
        .map(|t| t.response_time_bound().map(|r| t.period + r))
        .sum()
}
