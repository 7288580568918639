// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health checks over a [`ClusterStatus`], the much cheaper summary behind
//! `cephctl status`.

use super::n_of;
use super::remainder;
use super::report_checks::health_status;
use super::report_checks::zero_or;
use super::HealthCheck;
use super::HealthCheckError;
use cephctl_types::ClusterHealthIndicator;
use cephctl_types::ClusterHealthIndicatorStatus as Status;
use cephctl_types::ClusterHealthIndicatorType as Indicator;
use cephctl_types::ClusterStatus;

type CheckResult = Result<ClusterHealthIndicator, HealthCheckError>;

pub fn default_status_checks() -> Vec<HealthCheck<ClusterStatus>> {
    vec![
        status_cluster_status,
        status_quorum,
        status_mons_down,
        status_mgrs_down,
        status_mds_down,
        status_osds_down,
        status_mutes_amount,
        status_unclean_pgs,
        status_inactive_pgs,
    ]
}

pub fn status_cluster_status(status: &ClusterStatus) -> CheckResult {
    Ok(ClusterHealthIndicator::new(
        Indicator::ClusterStatus,
        status.health_status.to_string(),
        health_status(status.health_status),
    ))
}

pub fn status_quorum(status: &ClusterStatus) -> CheckResult {
    remainder(
        "monitors in quorum",
        status.num_mons,
        status.num_mons_in_quorum,
    )?;
    Ok(ClusterHealthIndicator::new(
        Indicator::Quorum,
        n_of(status.num_mons_in_quorum, status.num_mons),
        if status.num_mons_in_quorum < status.num_mons {
            Status::AtRisk
        } else {
            Status::Good
        },
    ))
}

pub fn status_mons_down(status: &ClusterStatus) -> CheckResult {
    Ok(ClusterHealthIndicator::new(
        Indicator::MonDown,
        n_of(status.num_mons_down, status.num_mons),
        zero_or(status.num_mons_down, Status::AtRisk),
    ))
}

// There is no total to compare against: only the active manager and its
// availability are reported.
pub fn status_mgrs_down(status: &ClusterStatus) -> CheckResult {
    Ok(ClusterHealthIndicator::new(
        Indicator::MgrDown,
        status.num_mgrs_down.to_string(),
        zero_or(status.num_mgrs_down, Status::AtRisk),
    ))
}

pub fn status_mds_down(status: &ClusterStatus) -> CheckResult {
    Ok(ClusterHealthIndicator::new(
        Indicator::MdsDown,
        status.num_mds_down.to_string(),
        zero_or(status.num_mds_down, Status::AtRisk),
    ))
}

pub fn status_osds_down(status: &ClusterStatus) -> CheckResult {
    Ok(ClusterHealthIndicator::new(
        Indicator::OsdDown,
        n_of(status.num_osds_down, status.num_osds),
        zero_or(status.num_osds_down, Status::AtRisk),
    ))
}

pub fn status_mutes_amount(status: &ClusterStatus) -> CheckResult {
    let muted = status.muted_checks.len() as u64;
    Ok(ClusterHealthIndicator::new(
        Indicator::MutesAmount,
        n_of(muted, status.checks.len()),
        zero_or(muted, Status::AtRisk),
    ))
}

pub fn status_unclean_pgs(status: &ClusterStatus) -> CheckResult {
    Ok(ClusterHealthIndicator::new(
        Indicator::UncleanPgs,
        n_of(status.num_pgs_unclean, status.num_pgs),
        zero_or(status.num_pgs_unclean, Status::AtRisk),
    ))
}

pub fn status_inactive_pgs(status: &ClusterStatus) -> CheckResult {
    Ok(ClusterHealthIndicator::new(
        Indicator::InactivePgs,
        n_of(status.num_pgs_inactive, status.num_pgs),
        zero_or(status.num_pgs_inactive, Status::Dangerous),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::evaluate;
    use assert_matches::assert_matches;
    use cephctl_types::ClusterStatusHealth;

    fn healthy() -> ClusterStatus {
        ClusterStatus {
            health_status: ClusterStatusHealth::Ok,
            checks: Vec::new(),
            muted_checks: Vec::new(),
            num_mons: 3,
            num_mons_in_quorum: 3,
            num_mons_down: 0,
            num_mgrs_down: 0,
            num_mds_down: 0,
            num_osds: 6,
            num_osds_down: 0,
            num_pgs: 128,
            num_pgs_unclean: 0,
            num_pgs_inactive: 0,
        }
    }

    fn render(indicators: &[ClusterHealthIndicator]) -> Vec<String> {
        indicators
            .iter()
            .map(|i| {
                format!("{} {} {}", i.indicator, i.current_value, i.status)
            })
            .collect()
    }

    #[test]
    fn test_healthy_status() {
        let indicators =
            evaluate(&healthy(), &default_status_checks()).unwrap();
        assert_eq!(
            render(&indicators),
            [
                "CLUSTER_STATUS HEALTH_OK GOOD",
                "QUORUM 3 of 3 GOOD",
                "MON_DOWN 0 of 3 GOOD",
                "MGR_DOWN 0 GOOD",
                "MDS_DOWN 0 GOOD",
                "OSD_DOWN 0 of 6 GOOD",
                "MUTES_AMOUNT 0 of 0 GOOD",
                "UNCLEAN_PGS 0 of 128 GOOD",
                "INACTIVE_PGS 0 of 128 GOOD",
            ]
        );
    }

    #[test]
    fn test_degraded_status() {
        let status = ClusterStatus {
            health_status: ClusterStatusHealth::Err,
            num_mons_in_quorum: 2,
            num_mons_down: 1,
            num_mgrs_down: 1,
            num_mds_down: 1,
            num_osds_down: 2,
            num_pgs_unclean: 40,
            num_pgs_inactive: 3,
            ..healthy()
        };
        let indicators =
            evaluate(&status, &default_status_checks()).unwrap();
        assert_eq!(
            render(&indicators),
            [
                "CLUSTER_STATUS HEALTH_ERR DANGEROUS",
                "QUORUM 2 of 3 AT_RISK",
                "MON_DOWN 1 of 3 AT_RISK",
                "MGR_DOWN 1 AT_RISK",
                "MDS_DOWN 1 AT_RISK",
                "OSD_DOWN 2 of 6 AT_RISK",
                "MUTES_AMOUNT 0 of 0 GOOD",
                "UNCLEAN_PGS 40 of 128 AT_RISK",
                "INACTIVE_PGS 3 of 128 DANGEROUS",
            ]
        );
    }

    #[test]
    fn test_inconsistent_quorum() {
        let status = ClusterStatus { num_mons_in_quorum: 5, ..healthy() };
        assert_matches!(
            evaluate(&status, &default_status_checks()),
            Err(HealthCheckError::InconsistentReport {
                what: "monitors in quorum",
                part: 5,
                total: 3,
            })
        );
    }
}
