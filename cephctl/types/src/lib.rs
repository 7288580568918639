// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Types shared between the `cephctl` reconciliation engine, its `ceph` CLI
//! wrapper, and its health checks.
//!
//! The [`raw`] module holds the decoded (and only partially typed) JSON
//! payloads emitted by the `ceph` CLI, along with the normalization that turns
//! them into the compact summaries defined in [`report`].

pub mod config;
pub mod health;
pub mod raw;
pub mod report;

pub use config::CephConfig;
pub use config::CephConfigDifference;
pub use config::CephOsdConfig;
pub use config::CephOsdConfigDifference;
pub use config::ScalarValue;
pub use health::ClusterHealthIndicator;
pub use health::ClusterHealthIndicatorStatus;
pub use health::ClusterHealthIndicatorType;
pub use report::ClusterReport;
pub use report::ClusterStatus;
pub use report::ClusterStatusCheck;
pub use report::ClusterStatusHealth;
pub use report::ClusterStatusMutedCheck;
pub use report::Device;
pub use report::DeviceLocation;
pub use report::OsdDaemon;
