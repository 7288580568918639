// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Desired and current cluster configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form cluster configuration: section name -> option name -> value.
///
/// This mirrors the centralized configuration database of the cluster
/// (`ceph config dump`), where a "section" is a daemon type, a daemon name, or
/// a masked target such as `osd/class:ssd`.
pub type CephConfig = BTreeMap<String, BTreeMap<String, String>>;

/// A single operation required to turn one [`CephConfig`] into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CephConfigDifference {
    Add { section: String, key: String, value: String },
    Change { section: String, key: String, old_value: String, value: String },
    Remove { section: String, key: String },
}

impl CephConfigDifference {
    pub fn section(&self) -> &str {
        match self {
            CephConfigDifference::Add { section, .. }
            | CephConfigDifference::Change { section, .. }
            | CephConfigDifference::Remove { section, .. } => section,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            CephConfigDifference::Add { key, .. }
            | CephConfigDifference::Change { key, .. }
            | CephConfigDifference::Remove { key, .. } => key,
        }
    }
}

/// A scalar value of one of the [`CephOsdConfig`] fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Float(f32),
    String(String),
}

impl ScalarValue {
    /// Returns the value in the form the `ceph` CLI accepts as an argument.
    ///
    /// Unlike [`fmt::Display`], floats keep their full precision here.
    pub fn to_cli_arg(&self) -> String {
        match self {
            ScalarValue::Bool(v) => v.to_string(),
            ScalarValue::Float(v) => v.to_string(),
            ScalarValue::String(v) => v.clone(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => write!(f, "{v:.2}"),
            ScalarValue::String(v) => f.write_str(v),
        }
    }
}

/// OSD map settings that are not part of the configuration database and are
/// instead changed through dedicated `ceph osd ...` commands.
///
/// Fields missing from a specification document take the cluster defaults
/// below.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CephOsdConfig {
    pub allow_crimson: bool,
    pub nearfull_ratio: f32,
    pub backfillfull_ratio: f32,
    pub full_ratio: f32,
    pub require_min_compat_client: String,
}

impl Default for CephOsdConfig {
    fn default() -> Self {
        Self {
            allow_crimson: false,
            nearfull_ratio: 0.85,
            backfillfull_ratio: 0.9,
            full_ratio: 0.95,
            require_min_compat_client: "reef".to_string(),
        }
    }
}

impl CephOsdConfig {
    pub const ALLOW_CRIMSON: &'static str = "allow_crimson";
    pub const NEARFULL_RATIO: &'static str = "nearfull_ratio";
    pub const BACKFILLFULL_RATIO: &'static str = "backfillfull_ratio";
    pub const FULL_RATIO: &'static str = "full_ratio";
    pub const REQUIRE_MIN_COMPAT_CLIENT: &'static str =
        "require_min_compat_client";

    /// Returns every field with its name, in a fixed order.
    ///
    /// The order is the one in which differences are reported and applied.
    pub fn fields(&self) -> [(&'static str, ScalarValue); 5] {
        let Self {
            allow_crimson,
            nearfull_ratio,
            backfillfull_ratio,
            full_ratio,
            require_min_compat_client,
        } = self;
        [
            (Self::ALLOW_CRIMSON, ScalarValue::Bool(*allow_crimson)),
            (Self::NEARFULL_RATIO, ScalarValue::Float(*nearfull_ratio)),
            (
                Self::BACKFILLFULL_RATIO,
                ScalarValue::Float(*backfillfull_ratio),
            ),
            (Self::FULL_RATIO, ScalarValue::Float(*full_ratio)),
            (
                Self::REQUIRE_MIN_COMPAT_CLIENT,
                ScalarValue::String(require_min_compat_client.clone()),
            ),
        ]
    }
}

/// A changed [`CephOsdConfig`] field.
///
/// Fields can only change: the schema is closed, so nothing is ever added or
/// removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CephOsdConfigDifference {
    pub key: &'static str,
    pub old_value: ScalarValue,
    pub value: ScalarValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(ScalarValue::Bool(true).to_string(), "true");
        assert_eq!(ScalarValue::Float(0.9).to_string(), "0.90");
        assert_eq!(ScalarValue::Float(0.85).to_string(), "0.85");
        assert_eq!(ScalarValue::String("reef".into()).to_string(), "reef");

        // The CLI form must not round.
        assert_eq!(ScalarValue::Float(0.855).to_cli_arg(), "0.855");
    }

    #[test]
    fn test_osd_config_defaults() {
        let config: CephOsdConfig =
            serde_json::from_str("{}").expect("empty spec decodes");
        assert_eq!(config, CephOsdConfig::default());

        let config: CephOsdConfig = serde_json::from_str(
            r#"{
                "allow_crimson": true,
                "nearfull_ratio": 0.75,
                "backfillfull_ratio": 0.8,
                "full_ratio": 0.85,
                "require_min_compat_client": "squid"
            }"#,
        )
        .expect("full spec decodes");
        assert_eq!(
            config,
            CephOsdConfig {
                allow_crimson: true,
                nearfull_ratio: 0.75,
                backfillfull_ratio: 0.8,
                full_ratio: 0.85,
                require_min_compat_client: "squid".to_string(),
            }
        );
    }

    #[test]
    fn test_osd_config_rejects_unknown_fields() {
        serde_json::from_str::<CephOsdConfig>(r#"{"full_ration": 0.9}"#)
            .expect_err("typo in field name must not be silently ignored");
    }
}
