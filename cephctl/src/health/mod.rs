// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule-based classification of the cluster state.
//!
//! A health check is a pure function from a normalized summary (either a
//! [`cephctl_types::ClusterReport`] or a [`cephctl_types::ClusterStatus`]) to
//! a single [`ClusterHealthIndicator`]. Callers choose which checks to run and
//! in what order; [`default_report_checks`] and [`default_status_checks`]
//! build the lists `cephctl` itself uses.

mod report_checks;
mod status_checks;

pub use report_checks::*;
pub use status_checks::*;

use cephctl_types::ClusterHealthIndicator;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthCheckError {
    #[error("inconsistent cluster state: {part} {what} out of {total}")]
    InconsistentReport { what: &'static str, part: u64, total: u64 },
}

/// A single health check over `T`.
pub type HealthCheck<T> =
    fn(&T) -> Result<ClusterHealthIndicator, HealthCheckError>;

/// Runs `checks` against `input`, in order.
///
/// The first failing check aborts the evaluation; no indicators are returned
/// in that case.
pub fn evaluate<T>(
    input: &T,
    checks: &[HealthCheck<T>],
) -> Result<Vec<ClusterHealthIndicator>, HealthCheckError> {
    checks.iter().map(|check| check(input)).collect()
}

/// `total - part`, or an error if the summary claims more parts than the
/// whole (e.g. more OSDs up than there are OSDs).
fn remainder<N>(
    what: &'static str,
    total: N,
    part: N,
) -> Result<N, HealthCheckError>
where
    N: Copy + Into<u64> + std::ops::Sub<Output = N> + PartialOrd,
{
    if part > total {
        return Err(HealthCheckError::InconsistentReport {
            what,
            part: part.into(),
            total: total.into(),
        });
    }
    Ok(total - part)
}

/// Renders a count against its denominator.
fn n_of(n: impl std::fmt::Display, total: impl std::fmt::Display) -> String {
    format!("{n} of {total}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cephctl_types::ClusterHealthIndicatorStatus;
    use cephctl_types::ClusterHealthIndicatorType;

    fn good(input: &u32) -> Result<ClusterHealthIndicator, HealthCheckError> {
        Ok(ClusterHealthIndicator::new(
            ClusterHealthIndicatorType::ClusterStatus,
            input.to_string(),
            ClusterHealthIndicatorStatus::Good,
        ))
    }

    fn risky(input: &u32) -> Result<ClusterHealthIndicator, HealthCheckError> {
        Ok(ClusterHealthIndicator::new(
            ClusterHealthIndicatorType::Quorum,
            input.to_string(),
            ClusterHealthIndicatorStatus::AtRisk,
        ))
    }

    fn broken(input: &u32) -> Result<ClusterHealthIndicator, HealthCheckError> {
        Err(HealthCheckError::InconsistentReport {
            what: "widgets",
            part: u64::from(*input) + 1,
            total: u64::from(*input),
        })
    }

    #[test]
    fn test_evaluate_in_order() {
        let indicators = evaluate(&7, &[risky, good, risky]).unwrap();
        let kinds: Vec<_> = indicators.iter().map(|i| i.indicator).collect();
        assert_eq!(
            kinds,
            [
                ClusterHealthIndicatorType::Quorum,
                ClusterHealthIndicatorType::ClusterStatus,
                ClusterHealthIndicatorType::Quorum,
            ]
        );
        assert!(indicators.iter().all(|i| i.current_value == "7"));

        assert!(evaluate::<u32>(&7, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_evaluate_fatal_batch() {
        // A failure anywhere in the batch discards every indicator.
        for checks in [
            &[broken, good, good][..],
            &[good, broken, good][..],
            &[good, good, broken][..],
        ] {
            assert_eq!(
                evaluate(&7, checks),
                Err(HealthCheckError::InconsistentReport {
                    what: "widgets",
                    part: 8,
                    total: 7,
                })
            );
        }
    }

    #[test]
    fn test_remainder() {
        assert_eq!(remainder("OSDs up", 5u16, 3u16), Ok(2));
        assert_eq!(remainder("OSDs up", 5u16, 5u16), Ok(0));
        assert_eq!(
            remainder("OSDs up", 5u16, 6u16),
            Err(HealthCheckError::InconsistentReport {
                what: "OSDs up",
                part: 6,
                total: 5,
            })
        );
    }
}
