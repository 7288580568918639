// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded `ceph ... --format=json` output.
//!
//! Only the fields consumed by `cephctl` are typed; everything else in the
//! payload is ignored. Missing fields take their zero value, as the shape of
//! these payloads varies between Ceph releases.

mod config;
mod report;
mod status;

pub use config::RawConfigOption;
pub use config::RawOsdDump;
pub use report::parse_ceph_ip_address;
pub use report::AddressParseError;
pub use report::RawOsdMap;
pub use report::RawOsdMapOsd;
pub use report::RawOsdMetadata;
pub use report::RawOsdSum;
pub use report::RawPgsByState;
pub use report::RawReport;
pub use status::RawStatus;

use crate::report::ClusterStatusCheck;
use crate::report::ClusterStatusHealth;
use crate::report::ClusterStatusMutedCheck;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::ParseIntError;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("too many {what} ({count}) to fit in a {bits}-bit counter")]
    Overflow { what: &'static str, count: u64, bits: u32 },

    #[error("malformed {field} of osd.{osd}")]
    MalformedAddress {
        osd: u16,
        field: &'static str,
        #[source]
        err: AddressParseError,
    },

    #[error("invalid {field} of osd.{osd}: {value:?}")]
    InvalidNumber {
        osd: u16,
        field: &'static str,
        value: String,
        #[source]
        err: ParseIntError,
    },

    #[error("invalid {field} of osd.{osd}: {value:?} is not a boolean")]
    InvalidBool { osd: u16, field: &'static str, value: String },

    #[error("inconsistent {what}: {part} exceeds the total of {total}")]
    Inconsistent { what: &'static str, part: u64, total: u64 },
}

/// Narrows a count, failing instead of truncating.
fn narrow<T>(what: &'static str, count: u64) -> Result<T, NormalizeError>
where
    T: TryFrom<u64>,
{
    T::try_from(count).map_err(|_| NormalizeError::Overflow {
        what,
        count,
        bits: (std::mem::size_of::<T>() * 8) as u32,
    })
}

/// `total - part`, failing if the payload claims more parts than the whole.
fn remainder(
    what: &'static str,
    total: u32,
    part: u32,
) -> Result<u32, NormalizeError> {
    total.checked_sub(part).ok_or(NormalizeError::Inconsistent {
        what,
        part: part.into(),
        total: total.into(),
    })
}

/// Adds `num` to the total once, and to the count of every `+`-separated label
/// of `state`: `active+clean` counts towards both `active` and `clean`.
fn count_pgs<'a, I>(
    entries: I,
) -> Result<(u32, BTreeMap<String, u32>), NormalizeError>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut total: u64 = 0;
    let mut by_state: BTreeMap<String, u64> = BTreeMap::new();
    for (state, num) in entries {
        total = total.saturating_add(num);
        for label in state.split('+') {
            let count = by_state.entry(label.to_string()).or_default();
            *count = count.saturating_add(num);
        }
    }

    let total = narrow("placement groups", total)?;
    let by_state = by_state
        .into_iter()
        .map(|(state, num)| Ok((state, narrow("placement groups", num)?)))
        .collect::<Result<_, NormalizeError>>()?;
    Ok((total, by_state))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHealth {
    pub status: String,
    pub checks: BTreeMap<String, RawHealthCheck>,
    pub mutes: Vec<RawHealthMute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHealthCheck {
    pub severity: String,
    pub summary: RawHealthSummary,
    pub muted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHealthSummary {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHealthMute {
    pub code: String,
    pub summary: String,
    pub sticky: bool,
    pub count: u64,
}

impl RawHealth {
    fn status(&self) -> ClusterStatusHealth {
        ClusterStatusHealth::from_raw(&self.status)
    }

    /// Checks sorted by code.
    fn checks(&self) -> Vec<ClusterStatusCheck> {
        // `checks` is a BTreeMap, so this is already in code order.
        self.checks
            .iter()
            .map(|(code, check)| ClusterStatusCheck {
                code: code.clone(),
                severity: check.severity.clone(),
                summary: check.summary.message.clone(),
            })
            .collect()
    }

    /// Muted checks, in the order the cluster reports them.
    fn muted_checks(&self) -> Vec<ClusterStatusMutedCheck> {
        self.mutes
            .iter()
            .map(|mute| ClusterStatusMutedCheck {
                code: mute.code.clone(),
                summary: mute.summary.clone(),
            })
            .collect()
    }
}
