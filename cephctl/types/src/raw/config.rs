// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::CephConfig;
use crate::config::CephOsdConfig;
use serde::Deserialize;

/// One entry of `ceph config dump --format=json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfigOption {
    pub section: String,
    pub name: String,
    pub value: String,
    pub mask: String,
}

impl RawConfigOption {
    /// The target this option is set on, as accepted by `ceph config set`:
    /// either the bare section or `section/mask`.
    pub fn target(&self) -> String {
        if self.mask.is_empty() {
            self.section.clone()
        } else {
            format!("{}/{}", self.section, self.mask)
        }
    }

    /// Folds a configuration dump into a [`CephConfig`].
    pub fn collect(options: Vec<RawConfigOption>) -> CephConfig {
        let mut config = CephConfig::new();
        for option in options {
            config
                .entry(option.target())
                .or_default()
                .insert(option.name, option.value);
        }
        config
    }
}

/// The subset of `ceph osd dump --format=json` that makes up a
/// [`CephOsdConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawOsdDump {
    pub full_ratio: f32,
    pub backfillfull_ratio: f32,
    pub nearfull_ratio: f32,
    pub require_min_compat_client: String,
    pub allow_crimson: bool,
}

impl From<RawOsdDump> for CephOsdConfig {
    fn from(dump: RawOsdDump) -> Self {
        CephOsdConfig {
            allow_crimson: dump.allow_crimson,
            nearfull_ratio: dump.nearfull_ratio,
            backfillfull_ratio: dump.backfillfull_ratio,
            full_ratio: dump.full_ratio,
            require_min_compat_client: dump.require_min_compat_client,
        }
    }
}
