// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health checks over a [`ClusterReport`].

use super::n_of;
use super::remainder;
use super::HealthCheck;
use super::HealthCheckError;
use cephctl_types::ClusterHealthIndicator;
use cephctl_types::ClusterHealthIndicatorStatus as Status;
use cephctl_types::ClusterHealthIndicatorType as Indicator;
use cephctl_types::ClusterReport;
use cephctl_types::ClusterStatusHealth;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::net::IpAddr;

type CheckResult = Result<ClusterHealthIndicator, HealthCheckError>;

/// Metadata above this share of the raw capacity (in percent) is a risk.
const METADATA_SIZE_AT_RISK: f64 = 15.0;
/// Metadata above this share of the raw capacity (in percent) is dangerous.
const METADATA_SIZE_DANGEROUS: f64 = 20.0;

const WEAROUT_AT_RISK: f64 = 0.5;
const WEAROUT_DANGEROUS: f64 = 0.75;

/// The checks run by `cephctl healthcheck`, in display order.
pub fn default_report_checks() -> Vec<HealthCheck<ClusterReport>> {
    vec![
        cluster_status,
        quorum,
        osds_down,
        osds_out,
        mutes_amount,
        down_pgs,
        unclean_pgs,
        inactive_pgs,
        allow_crimson,
        osds_metadata_size,
        osds_num_daemon_versions,
        ip_collision,
        device_health_wearout,
    ]
}

/// Maps the overall monitor-reported health onto an indicator status.
pub(super) fn health_status(health: ClusterStatusHealth) -> Status {
    match health {
        ClusterStatusHealth::Ok => Status::Good,
        ClusterStatusHealth::Warn => Status::AtRisk,
        ClusterStatusHealth::Err => Status::Dangerous,
        ClusterStatusHealth::Unknown => Status::Unknown,
    }
}

/// `Good` when nothing is counted, `if_any` otherwise.
pub(super) fn zero_or(count: impl Into<u64>, if_any: Status) -> Status {
    if count.into() == 0 {
        Status::Good
    } else {
        if_any
    }
}

pub fn cluster_status(report: &ClusterReport) -> CheckResult {
    Ok(ClusterHealthIndicator::new(
        Indicator::ClusterStatus,
        report.health_status.to_string(),
        health_status(report.health_status),
    ))
}

pub fn quorum(report: &ClusterReport) -> CheckResult {
    // Only validates that the quorum is no larger than the monitor map.
    remainder(
        "monitors in quorum",
        report.num_mons,
        report.num_mons_in_quorum,
    )?;
    let status = if report.num_mons_in_quorum < report.num_mons {
        Status::AtRisk
    } else {
        Status::Good
    };
    Ok(ClusterHealthIndicator::new(
        Indicator::Quorum,
        n_of(report.num_mons_in_quorum, report.num_mons),
        status,
    ))
}

pub fn osds_down(report: &ClusterReport) -> CheckResult {
    let down = remainder("OSDs up", report.num_osds, report.num_osds_up)?;
    Ok(ClusterHealthIndicator::new(
        Indicator::OsdDown,
        n_of(down, report.num_osds),
        zero_or(down, Status::AtRisk),
    ))
}

pub fn osds_out(report: &ClusterReport) -> CheckResult {
    let out = remainder("OSDs in", report.num_osds, report.num_osds_in)?;
    Ok(ClusterHealthIndicator::new(
        Indicator::OsdOut,
        n_of(out, report.num_osds),
        zero_or(out, Status::AtRisk),
    ))
}

pub fn mutes_amount(report: &ClusterReport) -> CheckResult {
    let muted = report.muted_checks.len() as u64;
    Ok(ClusterHealthIndicator::new(
        Indicator::MutesAmount,
        n_of(muted, report.checks.len()),
        zero_or(muted, Status::AtRisk),
    ))
}

pub fn down_pgs(report: &ClusterReport) -> CheckResult {
    let down = report.num_pgs_in_state("down");
    remainder("PGs down", report.num_pgs, down)?;
    Ok(ClusterHealthIndicator::new(
        Indicator::DownPgs,
        n_of(down, report.num_pgs),
        zero_or(down, Status::Dangerous),
    ))
}

pub fn unclean_pgs(report: &ClusterReport) -> CheckResult {
    let unclean = remainder(
        "PGs clean",
        report.num_pgs,
        report.num_pgs_in_state("clean"),
    )?;
    Ok(ClusterHealthIndicator::new(
        Indicator::UncleanPgs,
        n_of(unclean, report.num_pgs),
        zero_or(unclean, Status::AtRisk),
    ))
}

pub fn inactive_pgs(report: &ClusterReport) -> CheckResult {
    let inactive = remainder(
        "PGs active",
        report.num_pgs,
        report.num_pgs_in_state("active"),
    )?;
    Ok(ClusterHealthIndicator::new(
        Indicator::InactivePgs,
        n_of(inactive, report.num_pgs),
        zero_or(inactive, Status::Dangerous),
    ))
}

pub fn allow_crimson(report: &ClusterReport) -> CheckResult {
    let status =
        if report.allow_crimson { Status::AtRisk } else { Status::Good };
    Ok(ClusterHealthIndicator::new(
        Indicator::AllowCrimson,
        report.allow_crimson.to_string(),
        status,
    ))
}

/// Share of the raw OSD capacity taken by BlueStore metadata.
pub fn osds_metadata_size(report: &ClusterReport) -> CheckResult {
    if report.total_osd_capacity_kb == 0 {
        return Ok(ClusterHealthIndicator::new(
            Indicator::OsdMetadataSize,
            "n/a",
            Status::Unknown,
        ));
    }

    // A single division keeps exact thresholds exact.
    let percentage = report.total_osd_used_meta_kb as f64 * 100.0
        / report.total_osd_capacity_kb as f64;
    let status = if percentage > METADATA_SIZE_DANGEROUS {
        Status::Dangerous
    } else if percentage > METADATA_SIZE_AT_RISK {
        Status::AtRisk
    } else if percentage > 0.0 {
        Status::Good
    } else {
        Status::Unknown
    };

    Ok(ClusterHealthIndicator::new(
        Indicator::OsdMetadataSize,
        format!("{percentage:.2}%"),
        status,
    ))
}

/// Number of distinct OSD daemon versions; more than one means an upgrade is
/// in progress or was left unfinished.
pub fn osds_num_daemon_versions(report: &ClusterReport) -> CheckResult {
    let versions = report.num_osds_by_version.len();
    let status = match versions {
        0 => Status::Unknown,
        1 => Status::Good,
        2 => Status::AtRisk,
        _ => Status::Dangerous,
    };
    Ok(ClusterHealthIndicator::new(
        Indicator::OsdNumDaemonVersions,
        versions.to_string(),
        status,
    ))
}

pub fn ip_collision(report: &ClusterReport) -> CheckResult {
    let mut front: BTreeMap<IpAddr, BTreeSet<&str>> = BTreeMap::new();
    let mut back: BTreeMap<IpAddr, BTreeSet<&str>> = BTreeMap::new();
    for daemon in &report.osd_daemons {
        front.entry(daemon.front_ip).or_default().insert(&daemon.hostname);
        back.entry(daemon.back_ip).or_default().insert(&daemon.hostname);
    }

    let collides = |hosts: &BTreeMap<IpAddr, BTreeSet<&str>>| {
        hosts.values().any(|hostnames| hostnames.len() > 1)
    };
    let indicator = if collides(&front) {
        ClusterHealthIndicator::new(
            Indicator::IpCollision,
            "2 or more hosts have the same front IP",
            Status::Dangerous,
        )
    } else if collides(&back) {
        ClusterHealthIndicator::new(
            Indicator::IpCollision,
            "2 or more hosts have the same back IP",
            Status::Dangerous,
        )
    } else {
        ClusterHealthIndicator::new(
            Indicator::IpCollision,
            "all hosts have their own IPs",
            Status::Good,
        )
    };
    Ok(indicator)
}

/// Wear of the devices backing the daemons. Devices no daemon uses, and
/// devices that do not report wear, are not counted.
pub fn device_health_wearout(report: &ClusterReport) -> CheckResult {
    let (mut at_risk, mut dangerous) = (0u64, 0u64);
    for device in &report.devices {
        if device.daemons.is_empty() {
            continue;
        }
        match device.wear_level {
            Some(wear) if wear > WEAROUT_DANGEROUS => dangerous += 1,
            Some(wear) if wear > WEAROUT_AT_RISK => at_risk += 1,
            _ => (),
        }
    }

    let status = if dangerous > 0 {
        Status::Dangerous
    } else if at_risk > 0 {
        Status::AtRisk
    } else {
        Status::Good
    };
    Ok(ClusterHealthIndicator::new(
        Indicator::DeviceHealthWearout,
        format!(
            ">{:.1}%: {at_risk} device(s); >{:.1}%: {dangerous} device(s)",
            WEAROUT_AT_RISK * 100.0,
            WEAROUT_DANGEROUS * 100.0,
        ),
        status,
    ))
}
