// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::count_pgs;
use super::narrow;
use super::remainder;
use super::NormalizeError;
use super::RawHealth;
use crate::report::ClusterStatus;
use serde::Deserialize;

/// The subset of `ceph status --format=json` consumed by `cephctl`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStatus {
    pub health: RawHealth,
    pub quorum_names: Vec<String>,
    pub monmap: RawStatusMonMap,
    pub osdmap: RawStatusOsdMap,
    pub pgmap: RawStatusPgMap,
    pub fsmap: RawStatusFsMap,
    pub mgrmap: RawStatusMgrMap,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStatusMonMap {
    pub num_mons: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStatusOsdMap {
    pub num_osds: u32,
    pub num_up_osds: u32,
    pub num_in_osds: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStatusPgMap {
    pub pgs_by_state: Vec<RawStatusPgState>,
    pub num_pgs: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStatusPgState {
    pub state_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStatusFsMap {
    pub up: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStatusMgrMap {
    pub available: bool,
}

impl RawStatus {
    pub fn normalize(&self) -> Result<ClusterStatus, NormalizeError> {
        let num_mons = self.monmap.num_mons;
        let num_mons_in_quorum =
            narrow("monitors in quorum", self.quorum_names.len() as u64)?;
        let num_mons_down =
            remainder("monitor count", num_mons, num_mons_in_quorum)?;

        let num_osds = self.osdmap.num_osds;
        let num_osds_down =
            remainder("OSD count", num_osds, self.osdmap.num_up_osds)?;

        let num_mds_down =
            remainder("MDS count", self.fsmap.max, self.fsmap.up)?;

        let num_pgs = self.pgmap.num_pgs;
        let (_, by_state) = count_pgs(
            self.pgmap
                .pgs_by_state
                .iter()
                .map(|pgs| (pgs.state_name.as_str(), pgs.count)),
        )?;
        let in_state = |state: &str| by_state.get(state).copied().unwrap_or(0);
        let num_pgs_unclean =
            remainder("PG count", num_pgs, in_state("clean"))?;
        let num_pgs_inactive =
            remainder("PG count", num_pgs, in_state("active"))?;

        Ok(ClusterStatus {
            health_status: self.health.status(),
            checks: self.health.checks(),
            muted_checks: self.health.muted_checks(),
            num_mons,
            num_mons_in_quorum,
            num_mons_down,
            num_mgrs_down: if self.mgrmap.available { 0 } else { 1 },
            num_mds_down,
            num_osds,
            num_osds_down,
            num_pgs,
            num_pgs_unclean,
            num_pgs_inactive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ClusterStatusHealth;
    use assert_matches::assert_matches;

    const STATUS: &str = r#"{
        "fsid": "9f3e6a6c-0f39-11ef-a9a6-5254005d3b7f",
        "health": {
            "status": "HEALTH_WARN",
            "checks": {
                "OSD_DOWN": {
                    "severity": "HEALTH_WARN",
                    "summary": {"message": "1 osds down", "count": 1},
                    "muted": false
                }
            },
            "mutes": []
        },
        "election_epoch": 14,
        "quorum": [0, 1],
        "quorum_names": ["a", "b"],
        "quorum_age": 1204,
        "monmap": {"epoch": 3, "min_mon_release_name": "reef", "num_mons": 3},
        "osdmap": {
            "epoch": 112,
            "num_osds": 6,
            "num_up_osds": 5,
            "osd_up_since": 1715000000,
            "num_in_osds": 6,
            "osd_in_since": 1715000000,
            "num_remapped_pgs": 0
        },
        "pgmap": {
            "pgs_by_state": [
                {"state_name": "active+clean", "count": 90},
                {"state_name": "active+undersized+degraded", "count": 7},
                {"state_name": "peering", "count": 3}
            ],
            "num_pgs": 100,
            "num_pools": 3
        },
        "fsmap": {"epoch": 5, "id": 1, "up": 1, "in": 1, "max": 2, "by_rank": []},
        "mgrmap": {"available": true, "num_standbys": 1, "modules": []}
    }"#;

    #[test]
    fn test_normalize_status() {
        let raw: RawStatus = serde_json::from_str(STATUS).unwrap();
        let status = raw.normalize().unwrap();
        assert_eq!(status.health_status, ClusterStatusHealth::Warn);
        assert_eq!(status.checks.len(), 1);
        assert_eq!(status.checks[0].code, "OSD_DOWN");
        assert!(status.muted_checks.is_empty());
        assert_eq!(status.num_mons, 3);
        assert_eq!(status.num_mons_in_quorum, 2);
        assert_eq!(status.num_mons_down, 1);
        assert_eq!(status.num_mgrs_down, 0);
        assert_eq!(status.num_mds_down, 1);
        assert_eq!(status.num_osds, 6);
        assert_eq!(status.num_osds_down, 1);
        assert_eq!(status.num_pgs, 100);
        assert_eq!(status.num_pgs_unclean, 10);
        assert_eq!(status.num_pgs_inactive, 3);
    }

    #[test]
    fn test_normalize_status_inconsistent() {
        let mut raw: RawStatus = serde_json::from_str(STATUS).unwrap();
        raw.osdmap.num_up_osds = 7;
        assert_matches!(
            raw.normalize(),
            Err(NormalizeError::Inconsistent {
                what: "OSD count",
                part: 7,
                total: 6,
            })
        );

        let mut raw: RawStatus = serde_json::from_str(STATUS).unwrap();
        raw.quorum_names.push("c".to_string());
        raw.quorum_names.push("d".to_string());
        assert_matches!(
            raw.normalize(),
            Err(NormalizeError::Inconsistent { what: "monitor count", .. })
        );
    }

    #[test]
    fn test_normalize_status_pg_total() {
        // The PG map total wins over the sum of the per-state counts.
        let mut raw: RawStatus = serde_json::from_str(STATUS).unwrap();
        raw.pgmap.num_pgs = 128;
        let status = raw.normalize().unwrap();
        assert_eq!(status.num_pgs, 128);
        assert_eq!(status.num_pgs_unclean, 38);
        assert_eq!(status.num_pgs_inactive, 31);

        let mut raw: RawStatus = serde_json::from_str(STATUS).unwrap();
        raw.pgmap.num_pgs = 50;
        assert_matches!(
            raw.normalize(),
            Err(NormalizeError::Inconsistent {
                what: "PG count",
                part: 90,
                total: 50,
            })
        );
    }

    #[test]
    fn test_normalize_status_mgr_unavailable() {
        let mut raw: RawStatus = serde_json::from_str(STATUS).unwrap();
        raw.mgrmap.available = false;
        assert_eq!(raw.normalize().unwrap().num_mgrs_down, 1);
    }
}
