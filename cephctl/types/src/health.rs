// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterHealthIndicatorType {
    ClusterStatus,
    Quorum,
    MonDown,
    MgrDown,
    MdsDown,
    OsdDown,
    OsdOut,
    MutesAmount,
    DownPgs,
    UncleanPgs,
    InactivePgs,
    AllowCrimson,
    OsdMetadataSize,
    OsdNumDaemonVersions,
    IpCollision,
    DeviceHealthWearout,
}

impl ClusterHealthIndicatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterHealthIndicatorType::ClusterStatus => "CLUSTER_STATUS",
            ClusterHealthIndicatorType::Quorum => "QUORUM",
            ClusterHealthIndicatorType::MonDown => "MON_DOWN",
            ClusterHealthIndicatorType::MgrDown => "MGR_DOWN",
            ClusterHealthIndicatorType::MdsDown => "MDS_DOWN",
            ClusterHealthIndicatorType::OsdDown => "OSD_DOWN",
            ClusterHealthIndicatorType::OsdOut => "OSD_OUT",
            ClusterHealthIndicatorType::MutesAmount => "MUTES_AMOUNT",
            ClusterHealthIndicatorType::DownPgs => "DOWN_PGS",
            ClusterHealthIndicatorType::UncleanPgs => "UNCLEAN_PGS",
            ClusterHealthIndicatorType::InactivePgs => "INACTIVE_PGS",
            ClusterHealthIndicatorType::AllowCrimson => "ALLOW_CRIMSON",
            ClusterHealthIndicatorType::OsdMetadataSize => "OSD_METADATA_SIZE",
            ClusterHealthIndicatorType::OsdNumDaemonVersions => {
                "OSD_NUM_DAEMON_VERSIONS"
            }
            ClusterHealthIndicatorType::IpCollision => "IP_COLLISION",
            ClusterHealthIndicatorType::DeviceHealthWearout => {
                "DEVICE_HEALTH_WEAROUT"
            }
        }
    }
}

impl fmt::Display for ClusterHealthIndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterHealthIndicatorStatus {
    Good,
    AtRisk,
    Dangerous,
    Unknown,
}

impl ClusterHealthIndicatorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterHealthIndicatorStatus::Good => "GOOD",
            ClusterHealthIndicatorStatus::AtRisk => "AT_RISK",
            ClusterHealthIndicatorStatus::Dangerous => "DANGEROUS",
            ClusterHealthIndicatorStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ClusterHealthIndicatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pass through the formatter so that callers can pad the status.
        f.pad(self.as_str())
    }
}

/// The outcome of a single health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterHealthIndicator {
    pub indicator: ClusterHealthIndicatorType,
    pub current_value: String,
    pub status: ClusterHealthIndicatorStatus,
}

impl ClusterHealthIndicator {
    pub fn new(
        indicator: ClusterHealthIndicatorType,
        current_value: impl Into<String>,
        status: ClusterHealthIndicatorStatus,
    ) -> Self {
        Self { indicator, current_value: current_value.into(), status }
    }
}
