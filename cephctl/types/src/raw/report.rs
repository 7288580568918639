// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::count_pgs;
use super::narrow;
use super::NormalizeError;
use super::RawHealth;
use crate::report::ClusterReport;
use crate::report::OsdDaemon;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// The subset of `ceph report --format=json` consumed by `cephctl`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReport {
    pub health: RawHealth,
    pub monmap: RawMonMap,
    pub quorum: Vec<u64>,
    pub osdmap: RawOsdMap,
    pub osd_metadata: Vec<RawOsdMetadata>,
    pub osd_sum: RawOsdSum,
    pub num_pg_by_state: Vec<RawPgsByState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMonMap {
    pub stretch_mode: bool,
    /// Only counted.
    pub mons: Vec<IgnoredAny>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawOsdMap {
    pub full_ratio: f32,
    pub backfillfull_ratio: f32,
    pub nearfull_ratio: f32,
    pub require_min_compat_client: String,
    pub allow_crimson: bool,
    /// Only counted.
    pub pools: Vec<IgnoredAny>,
    pub osds: Vec<RawOsdMapOsd>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawOsdMapOsd {
    pub osd: u64,
    pub up: u32,
    #[serde(rename = "in")]
    pub in_cluster: u32,
    pub cluster_addrs: RawAddrVec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAddrVec {
    pub addrvec: Vec<RawAddr>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAddr {
    #[serde(rename = "type")]
    pub kind: String,
    pub addr: String,
    pub nonce: u64,
}

/// Per-OSD metadata. The daemons publish every value as a string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawOsdMetadata {
    pub id: u64,
    pub arch: String,
    pub back_addr: String,
    pub front_addr: String,
    pub hostname: String,
    pub mem_total_kb: String,
    pub mem_swap_kb: String,
    pub rotational: String,
    pub devices: String,
    pub ceph_release: String,
    pub ceph_version_short: String,
    pub bluestore_bdev_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawOsdSum {
    pub kb: u64,
    pub kb_used: u64,
    pub kb_used_data: u64,
    pub kb_used_omap: u64,
    pub kb_used_meta: u64,
    pub kb_avail: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPgsByState {
    pub state: String,
    pub num: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to parse address {input:?}: {reason}")]
pub struct AddressParseError {
    pub input: String,
    pub reason: String,
}

/// Extracts the IP of the first endpoint of a Ceph address vector such as
/// `[v2:192.168.2.232:6802/3097,v1:192.168.2.232:6803/3097]`.
///
/// Exactly two endpoints are expected, each of the form
/// `type:ip:port/nonce`. IPv6 addresses may be bracketed.
pub fn parse_ceph_ip_address(
    input: &str,
) -> Result<IpAddr, AddressParseError> {
    let err = |reason: &str| AddressParseError {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let inner = input.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    let endpoints: Vec<&str> = inner.split(',').collect();
    if endpoints.len() != 2 {
        return Err(err(&format!(
            "expected 2 endpoints, found {}",
            endpoints.len()
        )));
    }

    // `type:ip:port/nonce`; the IP itself may contain colons.
    let (_kind, rest) =
        endpoints[0].split_once(':').ok_or_else(|| err("missing type"))?;
    let (ip, _port) = rest.rsplit_once(':').ok_or_else(|| err("missing port"))?;
    let ip = ip
        .strip_prefix('[')
        .and_then(|ip| ip.strip_suffix(']'))
        .unwrap_or(ip);

    ip.parse().map_err(|e| err(&format!("invalid IP {ip:?}: {e}")))
}

/// Parses the boolean literals the Ceph daemons publish.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

impl RawOsdMetadata {
    fn to_daemon(&self) -> Result<OsdDaemon, NormalizeError> {
        let id = narrow("OSD ids", self.id)?;

        let front_ip = parse_ceph_ip_address(&self.front_addr).map_err(
            |err| NormalizeError::MalformedAddress {
                osd: id,
                field: "front_addr",
                err,
            },
        )?;
        let back_ip = parse_ceph_ip_address(&self.back_addr).map_err(
            |err| NormalizeError::MalformedAddress {
                osd: id,
                field: "back_addr",
                err,
            },
        )?;

        let parse_kb = |field: &'static str, value: &str| {
            value.parse::<u64>().map_err(|err| NormalizeError::InvalidNumber {
                osd: id,
                field,
                value: value.to_string(),
                err,
            })
        };
        let mem_total_kb = parse_kb("mem_total_kb", &self.mem_total_kb)?;
        let mem_swap_kb = parse_kb("mem_swap_kb", &self.mem_swap_kb)?;

        let rotational = parse_bool(&self.rotational).ok_or_else(|| {
            NormalizeError::InvalidBool {
                osd: id,
                field: "rotational",
                value: self.rotational.clone(),
            }
        })?;

        let devices = self
            .devices
            .split(',')
            .filter(|dev| !dev.is_empty())
            .map(str::to_string)
            .collect();

        Ok(OsdDaemon {
            id,
            hostname: self.hostname.clone(),
            architecture: self.arch.clone(),
            front_ip,
            back_ip,
            mem_total_kb,
            mem_swap_kb,
            rotational,
            devices,
        })
    }
}

fn bump(counters: &mut BTreeMap<String, u64>, key: &str) {
    *counters.entry(key.to_string()).or_default() += 1;
}

fn narrow_counters(
    what: &'static str,
    counters: BTreeMap<String, u64>,
) -> Result<BTreeMap<String, u16>, NormalizeError> {
    counters
        .into_iter()
        .map(|(key, count)| Ok((key, narrow(what, count)?)))
        .collect()
}

impl RawReport {
    /// Derives a [`ClusterReport`].
    ///
    /// Any malformed or overflowing value fails the whole normalization. The
    /// returned report has no devices attached.
    pub fn normalize(&self) -> Result<ClusterReport, NormalizeError> {
        let num_mons = narrow("monitors", self.monmap.mons.len() as u64)?;
        let num_mons_in_quorum =
            narrow("monitors in quorum", self.quorum.len() as u64)?;
        let num_pools = narrow("pools", self.osdmap.pools.len() as u64)?;

        // Single pass over the OSD map.
        let (mut total, mut up, mut inside, mut without_addr) =
            (0u64, 0u64, 0u64, 0u64);
        for osd in &self.osdmap.osds {
            total += 1;
            if osd.up == 1 {
                up += 1;
            }
            if osd.in_cluster == 1 {
                inside += 1;
            }
            if osd.cluster_addrs.addrvec.is_empty() {
                without_addr += 1;
            }
        }

        let mut by_release = BTreeMap::new();
        let mut by_version = BTreeMap::new();
        let mut by_device_type = BTreeMap::new();
        let mut osd_daemons = Vec::with_capacity(self.osd_metadata.len());
        for metadata in &self.osd_metadata {
            bump(&mut by_release, &metadata.ceph_release);
            bump(&mut by_version, &metadata.ceph_version_short);
            bump(&mut by_device_type, &metadata.bluestore_bdev_type);
            osd_daemons.push(metadata.to_daemon()?);
        }

        let (num_pgs, num_pgs_by_state) = count_pgs(
            self.num_pg_by_state
                .iter()
                .map(|pgs| (pgs.state.as_str(), pgs.num)),
        )?;

        Ok(ClusterReport {
            health_status: self.health.status(),
            checks: self.health.checks(),
            muted_checks: self.health.muted_checks(),
            stretch_mode: self.monmap.stretch_mode,
            num_mons,
            num_mons_in_quorum,
            num_pools,
            allow_crimson: self.osdmap.allow_crimson,
            nearfull_ratio: self.osdmap.nearfull_ratio,
            backfillfull_ratio: self.osdmap.backfillfull_ratio,
            full_ratio: self.osdmap.full_ratio,
            require_min_compat_client: self
                .osdmap
                .require_min_compat_client
                .clone(),
            num_osds: narrow("OSDs", total)?,
            num_osds_up: narrow("OSDs up", up)?,
            num_osds_in: narrow("OSDs in", inside)?,
            num_osds_without_cluster_address: narrow(
                "OSDs without cluster address",
                without_addr,
            )?,
            num_osds_by_release: narrow_counters(
                "OSDs by release",
                by_release,
            )?,
            num_osds_by_version: narrow_counters(
                "OSDs by version",
                by_version,
            )?,
            num_osds_by_device_type: narrow_counters(
                "OSDs by device type",
                by_device_type,
            )?,
            osd_daemons,
            total_osd_capacity_kb: self.osd_sum.kb,
            total_osd_used_capacity_kb: self.osd_sum.kb_used,
            total_osd_used_data_kb: self.osd_sum.kb_used_data,
            total_osd_used_omap_kb: self.osd_sum.kb_used_omap,
            total_osd_used_meta_kb: self.osd_sum.kb_used_meta,
            total_osd_available_kb: self.osd_sum.kb_avail,
            num_pgs,
            num_pgs_by_state,
            devices: Vec::new(),
        })
    }
}
