// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized summaries of the cluster state.
//!
//! These are derived from the much larger payloads in [`crate::raw`] and carry
//! only what the health checks consume.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// Overall health as reported by the monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClusterStatusHealth {
    Ok,
    Warn,
    Err,
    Unknown,
}

impl ClusterStatusHealth {
    /// Maps a raw `HEALTH_*` string; anything unrecognized is `Unknown`.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "HEALTH_OK" => ClusterStatusHealth::Ok,
            "HEALTH_WARN" => ClusterStatusHealth::Warn,
            "HEALTH_ERR" => ClusterStatusHealth::Err,
            _ => ClusterStatusHealth::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterStatusHealth::Ok => "HEALTH_OK",
            ClusterStatusHealth::Warn => "HEALTH_WARN",
            ClusterStatusHealth::Err => "HEALTH_ERR",
            ClusterStatusHealth::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ClusterStatusHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterStatusCheck {
    pub code: String,
    pub severity: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterStatusMutedCheck {
    pub code: String,
    pub summary: String,
}

/// A single OSD daemon, as described by its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsdDaemon {
    pub id: u16,
    pub hostname: String,
    pub architecture: String,
    pub front_ip: IpAddr,
    pub back_ip: IpAddr,
    pub mem_total_kb: u64,
    pub mem_swap_kb: u64,
    pub rotational: bool,
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceLocation {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub dev: String,
    #[serde(default)]
    pub path: String,
}

/// A physical device, as listed by `ceph device ls`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Device {
    #[serde(rename = "devid")]
    pub dev_id: String,
    #[serde(default, rename = "location")]
    pub locations: Vec<DeviceLocation>,
    #[serde(default)]
    pub daemons: Vec<String>,
    /// Fraction of the media worn out, when the device reports it.
    #[serde(default)]
    pub wear_level: Option<f64>,
}

/// Summary of `ceph report`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    pub health_status: ClusterStatusHealth,
    pub checks: Vec<ClusterStatusCheck>,
    pub muted_checks: Vec<ClusterStatusMutedCheck>,

    pub stretch_mode: bool,
    pub num_mons: u8,
    pub num_mons_in_quorum: u8,

    pub num_pools: u16,

    pub allow_crimson: bool,
    pub nearfull_ratio: f32,
    pub backfillfull_ratio: f32,
    pub full_ratio: f32,
    pub require_min_compat_client: String,

    pub num_osds: u16,
    pub num_osds_up: u16,
    pub num_osds_in: u16,
    pub num_osds_without_cluster_address: u16,
    pub num_osds_by_release: BTreeMap<String, u16>,
    pub num_osds_by_version: BTreeMap<String, u16>,
    pub num_osds_by_device_type: BTreeMap<String, u16>,
    pub osd_daemons: Vec<OsdDaemon>,

    pub total_osd_capacity_kb: u64,
    pub total_osd_used_capacity_kb: u64,
    pub total_osd_used_data_kb: u64,
    pub total_osd_used_omap_kb: u64,
    pub total_osd_used_meta_kb: u64,
    pub total_osd_available_kb: u64,

    pub num_pgs: u32,
    pub num_pgs_by_state: BTreeMap<String, u32>,

    /// Attached after normalization, from a separate device listing.
    pub devices: Vec<Device>,
}

impl ClusterReport {
    /// Number of PGs carrying `state` among their labels (0 if none).
    pub fn num_pgs_in_state(&self, state: &str) -> u32 {
        self.num_pgs_by_state.get(state).copied().unwrap_or(0)
    }
}

/// Summary of `ceph status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterStatus {
    pub health_status: ClusterStatusHealth,
    pub checks: Vec<ClusterStatusCheck>,
    pub muted_checks: Vec<ClusterStatusMutedCheck>,

    pub num_mons: u32,
    pub num_mons_in_quorum: u32,
    pub num_mons_down: u32,
    pub num_mgrs_down: u32,
    pub num_mds_down: u32,

    pub num_osds: u32,
    pub num_osds_down: u32,

    pub num_pgs: u32,
    pub num_pgs_unclean: u32,
    pub num_pgs_inactive: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_from_raw() {
        assert_eq!(
            ClusterStatusHealth::from_raw("HEALTH_OK"),
            ClusterStatusHealth::Ok
        );
        assert_eq!(
            ClusterStatusHealth::from_raw("HEALTH_WARN"),
            ClusterStatusHealth::Warn
        );
        assert_eq!(
            ClusterStatusHealth::from_raw("HEALTH_ERR"),
            ClusterStatusHealth::Err
        );
        assert_eq!(
            ClusterStatusHealth::from_raw("health_ok"),
            ClusterStatusHealth::Unknown
        );
        assert_eq!(
            ClusterStatusHealth::from_raw(""),
            ClusterStatusHealth::Unknown
        );
    }

    #[test]
    fn test_device_decoding() {
        let devices: Vec<Device> = serde_json::from_str(
            r#"[
                {
                    "devid": "SAMSUNG_MZ7LH960_S45NNE0M000001",
                    "location": [
                        {"host": "node1", "dev": "sda", "path": "/dev/disk/by-path/pci-0000:00:1f.2-ata-1"}
                    ],
                    "daemons": ["osd.0"],
                    "wear_level": 0.12
                },
                {
                    "devid": "QEMU_HARDDISK_QM00003",
                    "location": [],
                    "daemons": []
                }
            ]"#,
        )
        .unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].locations[0].dev, "sda");
        assert_eq!(devices[0].wear_level, Some(0.12));
        assert_eq!(devices[1].wear_level, None);
        assert!(devices[1].daemons.is_empty());
    }
}
